mod alarm;
mod base;
mod floodlight;
mod setting;
mod state;
#[cfg(test)]
pub(crate) mod testing;

pub use alarm::AlarmSwitch;
pub use base::CredentialResolution;
pub use floodlight::FloodlightSwitch;
pub use setting::{Setting, SettingChoice, SettingKind};
pub use state::{AlarmConfig, FloodlightConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::client::ProtocolError;
use crate::storage::StorageError;

pub const CAMERA_KEY: &str = "camera";
pub const IP_KEY: &str = "ip";
pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const CREDENTIAL_KEYS: [&str; 3] = [IP_KEY, USERNAME_KEY, PASSWORD_KEY];

pub const BRIGHTNESS_MODE_KEY: &str = "brightnessRegulateMode";
pub const MANUAL_BRIGHTNESS_KEY: &str = "manualBrightness";
pub const AUDIO_ALARM_TYPE_KEY: &str = "audioAlarmType";
pub const AUDIO_ALARM_VOLUME_KEY: &str = "audioAlarmVolume";

#[derive(Error, Debug)]
pub enum SwitchError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid value for setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Unknown device {0}")]
    UnknownDevice(String),
}

impl SwitchError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        SwitchError::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    Floodlight,
    AudioAlarm,
}

impl SwitchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchKind::Floodlight => "floodlight",
            SwitchKind::AudioAlarm => "audio_alarm",
        }
    }

    /// Name used by the device creation settings.
    pub fn display_name(&self) -> &'static str {
        match self {
            SwitchKind::Floodlight => "Floodlight",
            SwitchKind::AudioAlarm => "Audio Alarm",
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            SwitchKind::Floodlight => "floodlight-switch-",
            SwitchKind::AudioAlarm => "audio-alarm-",
        }
    }

    pub fn from_display_name(name: &str) -> Option<Self> {
        [SwitchKind::Floodlight, SwitchKind::AudioAlarm]
            .into_iter()
            .find(|kind| kind.display_name() == name)
    }

    pub fn from_native_id(native_id: &str) -> Option<Self> {
        [SwitchKind::Floodlight, SwitchKind::AudioAlarm]
            .into_iter()
            .find(|kind| native_id.starts_with(kind.id_prefix()))
    }
}

/// On/off device backed by a camera.
#[async_trait]
pub trait VirtualSwitch: Send + Sync {
    fn native_id(&self) -> &str;

    fn kind(&self) -> SwitchKind;

    fn is_on(&self) -> bool;

    async fn turn_on(&self) -> Result<(), SwitchError>;

    async fn turn_off(&self) -> Result<(), SwitchError>;

    /// Current settings. Camera errors while building them are logged, never returned.
    async fn get_settings(&self) -> Vec<Setting>;

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), SwitchError>;

    /// Markdown description shown to the user.
    fn readme(&self) -> &'static str;
}
