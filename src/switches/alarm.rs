use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::peers::PeerDirectory;
use crate::protocol::capabilities::{AudioChoice, DEFAULT_VOLUME_RANGE};
use crate::protocol::client::CameraApi;
use crate::protocol::payloads::AudioAlarmConfig;
use crate::storage::DeviceStorage;
use crate::switches::base::SwitchBase;
use crate::switches::state::{ALARM_TIMES, parse_volume};
use crate::switches::{
    AUDIO_ALARM_TYPE_KEY, AUDIO_ALARM_VOLUME_KEY, AlarmConfig, CAMERA_KEY, Setting, SettingChoice,
    SettingKind, SwitchError, SwitchKind, VirtualSwitch,
};

const README: &str = r#"
## Alarm Switch

This switch triggers the camera's alarm by triggering the alarm input.
When the switch is created the camera is configured to enable the
linkage actions for the audio alarm and white light (strobe or normally on).
"#;

/// What the camera last reported it can play.
#[derive(Debug, Clone)]
struct AudioCapabilities {
    choices: Vec<AudioChoice>,
    volume_range: (i64, i64),
}

impl Default for AudioCapabilities {
    fn default() -> Self {
        Self {
            choices: vec![],
            volume_range: DEFAULT_VOLUME_RANGE,
        }
    }
}

/// Switch tripping the alarm input of a camera.
pub struct AlarmSwitch<C: CameraApi> {
    base: SwitchBase<C>,
    on: AtomicBool,
    capabilities: RwLock<AudioCapabilities>,
}

impl<C: CameraApi> AlarmSwitch<C> {
    pub fn new(client: C, storage: DeviceStorage, peers: Arc<dyn PeerDirectory>) -> Self {
        Self {
            base: SwitchBase::new(client, storage, peers),
            on: AtomicBool::new(false),
            capabilities: RwLock::new(AudioCapabilities::default()),
        }
    }

    pub fn config(&self) -> AlarmConfig {
        AlarmConfig::from(&self.base.storage)
    }

    /// Sound choices known from the last successful capability query.
    pub fn audio_choices(&self) -> Vec<AudioChoice> {
        self.capabilities.read().choices.clone()
    }

    /// Arms the input linkage actions on the camera. Failures are only logged.
    async fn arm_linkage(&self) {
        let Some(credentials) = self.base.credentials() else {
            warn!(
                "{}: cannot arm alarm linkage, camera credentials incomplete",
                self.base.native_id
            );
            return;
        };
        match self.base.client.set_alarm_trigger_config(&credentials).await {
            Ok(()) => info!("{}: alarm linkage armed on {}", self.base.native_id, credentials.ip),
            Err(e) => error!(
                "{}: Error setting alarm trigger configuration: {e}",
                self.base.native_id
            ),
        }
    }

    /// Refreshes the capability cache. On failure the previous one stays.
    async fn refresh_capabilities(&self) {
        let Some(credentials) = self.base.credentials() else {
            debug!("{}: no credentials, skipping capability query", self.base.native_id);
            return;
        };
        match self.base.client.get_audio_alarm_capabilities(&credentials).await {
            Ok(capabilities) => {
                let mut current = self.capabilities.write();
                current.choices = capabilities.audio_choices();
                current.volume_range = capabilities.volume_range().unwrap_or(DEFAULT_VOLUME_RANGE);
                debug!(
                    "{}: {} alarm sounds available",
                    self.base.native_id,
                    current.choices.len()
                );
            }
            Err(e) => error!(
                "{}: Error fetching alarm capabilities: {e}",
                self.base.native_id
            ),
        }
    }

    /// Stored sound, or the first one the camera offers, which then becomes the stored one.
    async fn selected_audio_type(&self, stored: String) -> String {
        if !stored.is_empty() {
            return stored;
        }
        if self.capabilities.read().choices.is_empty() {
            self.refresh_capabilities().await;
        }
        let Some(first) = self.capabilities.read().choices.first().cloned() else {
            return stored;
        };
        info!(
            "{}: no alarm sound selected, using {} ({})",
            self.base.native_id, first.description, first.id
        );
        if let Err(e) = self.base.storage.set_item(AUDIO_ALARM_TYPE_KEY, &first.id) {
            error!("{}: Error storing alarm sound: {e}", self.base.native_id);
        }
        first.id
    }

    /// Sends the stored sound and volume to the camera. Failures are only logged.
    async fn push_audio_config(&self) {
        let Some(credentials) = self.base.credentials() else {
            warn!(
                "{}: Cannot update alarm configuration due to missing camera credentials.",
                self.base.native_id
            );
            return;
        };
        let mut config = self.config();
        config.audio_type = self.selected_audio_type(config.audio_type).await;
        let audio_config = match AudioAlarmConfig::parse(
            &config.audio_type,
            &config.audio_volume.to_string(),
            &ALARM_TIMES.to_string(),
        ) {
            Ok(audio_config) => audio_config,
            Err(e) => {
                warn!(
                    "{}: alarm configuration not sent to the camera: {e}",
                    self.base.native_id
                );
                return;
            }
        };
        if let Err(e) = self
            .base
            .client
            .set_audio_alarm_config(&credentials, &audio_config)
            .await
        {
            error!(
                "{}: Error updating alarm configuration: {e}",
                self.base.native_id
            );
        }
    }
}

#[async_trait]
impl<C: CameraApi> VirtualSwitch for AlarmSwitch<C> {
    fn native_id(&self) -> &str {
        &self.base.native_id
    }

    fn kind(&self) -> SwitchKind {
        SwitchKind::AudioAlarm
    }

    fn is_on(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }

    async fn turn_on(&self) -> Result<(), SwitchError> {
        let credentials = self.base.require_credentials()?;
        if let Err(e) = self.base.client.trigger_alarm_input(&credentials, true).await {
            error!("{}: Error triggering alarm input: {e}", self.base.native_id);
            return Err(e.into());
        }
        self.on.store(true, Ordering::Release);
        info!("{}: alarm tripped", self.base.native_id);
        Ok(())
    }

    async fn turn_off(&self) -> Result<(), SwitchError> {
        match self.base.credentials() {
            None => debug!("{}: no camera bound, nothing to reset", self.base.native_id),
            Some(credentials) => {
                if let Err(e) = self.base.client.trigger_alarm_input(&credentials, false).await {
                    error!("{}: Error resetting alarm input: {e}", self.base.native_id);
                }
            }
        }
        self.on.store(false, Ordering::Release);
        Ok(())
    }

    async fn get_settings(&self) -> Vec<Setting> {
        self.refresh_capabilities().await;
        let config = self.config();
        let capabilities = self.capabilities.read().clone();

        let mut audio_type = config.audio_type;
        if audio_type.is_empty()
            && let Some(first) = capabilities.choices.first()
        {
            audio_type = first.id.clone();
        }
        let choices = capabilities
            .choices
            .iter()
            .map(|choice| SettingChoice {
                title: choice.description.clone(),
                value: choice.id.clone(),
            })
            .collect();
        let (min, max) = capabilities.volume_range;

        vec![
            self.base
                .camera_setting("Select the device to use for alarm control."),
            Setting::new(
                AUDIO_ALARM_TYPE_KEY,
                "Alarm Type",
                "Select the audio alarm sound type.",
                SettingKind::String,
            )
            .with_value(audio_type)
            .with_choices(choices),
            Setting::new(
                AUDIO_ALARM_VOLUME_KEY,
                "Alarm Volume (1-100)",
                "Volume level for the audio alarm.",
                SettingKind::Number,
            )
            .with_value(config.audio_volume.to_string())
            .with_range(min, max),
        ]
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), SwitchError> {
        match key {
            CAMERA_KEY => {
                let resolution = self.base.select_camera(value).await?;
                if resolution.ip {
                    self.arm_linkage().await;
                }
            }
            AUDIO_ALARM_TYPE_KEY => {
                self.base.storage.set_item(key, value.trim())?;
                self.push_audio_config().await;
            }
            AUDIO_ALARM_VOLUME_KEY => {
                let range = self.capabilities.read().volume_range;
                let volume = parse_volume(value, range).map_err(|e| SwitchError::invalid(key, e))?;
                self.base.storage.set_item(key, &volume.to_string())?;
                self.push_audio_config().await;
            }
            _ => {
                warn!("{}: unknown setting {key}", self.base.native_id);
                return Err(SwitchError::invalid(key, "unknown setting"));
            }
        }
        Ok(())
    }

    fn readme(&self) -> &'static str {
        README
    }
}
