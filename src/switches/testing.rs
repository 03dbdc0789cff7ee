use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::peers::{CameraDirectory, PeerDirectory};
use crate::protocol::capabilities::AudioAlarmCapabilities;
use crate::protocol::client::{CameraApi, CameraCredentials, ProtocolError};
use crate::protocol::payloads::{AudioAlarmConfig, BrightnessMode};
use crate::settings::CameraEntry;

#[derive(Debug, Clone, PartialEq)]
pub enum CameraCall {
    GetLightState,
    SetLight {
        enabled: bool,
        mode: BrightnessMode,
        manual_brightness: Option<u8>,
    },
    GetCapabilities,
    SetAudioAlarm(AudioAlarmConfig),
    SetAlarmTrigger,
    TriggerInput(bool),
}

#[derive(Clone, Default)]
pub struct FakeCameraApi {
    pub calls: Arc<RwLock<Vec<(String, CameraCall)>>>,
    pub should_fail: Arc<AtomicBool>,
    pub light_on: Arc<AtomicBool>,
    pub capabilities: Arc<RwLock<Option<AudioAlarmCapabilities>>>,
}

#[allow(dead_code)]
impl FakeCameraApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let fake = Self::default();
        fake.set_failing(true);
        fake
    }

    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }

    pub fn with_capabilities(self, json: &str) -> Self {
        *self.capabilities.write() = serde_json::from_str(json).ok();
        self
    }

    pub fn calls(&self) -> Vec<CameraCall> {
        self.calls.read().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn calls_to(&self) -> Vec<String> {
        self.calls.read().iter().map(|(ip, _)| ip.clone()).collect()
    }

    fn record(&self, credentials: &CameraCredentials, call: CameraCall) -> Result<(), ProtocolError> {
        self.calls.write().push((credentials.ip.clone(), call));
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(ProtocolError {
                status: Some(500),
                message: "Fake error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CameraApi for FakeCameraApi {
    async fn get_supplemental_light_state(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<bool, ProtocolError> {
        self.record(credentials, CameraCall::GetLightState)?;
        tokio::task::yield_now().await;
        Ok(self.light_on.load(Ordering::Relaxed))
    }

    async fn set_supplemental_light(
        &self,
        credentials: &CameraCredentials,
        enabled: bool,
        mode: BrightnessMode,
        manual_brightness: Option<u8>,
    ) -> Result<(), ProtocolError> {
        self.record(
            credentials,
            CameraCall::SetLight {
                enabled,
                mode,
                manual_brightness,
            },
        )?;
        self.light_on.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    async fn get_audio_alarm_capabilities(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<AudioAlarmCapabilities, ProtocolError> {
        self.record(credentials, CameraCall::GetCapabilities)?;
        Ok(self.capabilities.read().clone().unwrap_or_default())
    }

    async fn set_audio_alarm_config(
        &self,
        credentials: &CameraCredentials,
        config: &AudioAlarmConfig,
    ) -> Result<(), ProtocolError> {
        self.record(credentials, CameraCall::SetAudioAlarm(*config))
    }

    async fn set_alarm_trigger_config(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<(), ProtocolError> {
        self.record(credentials, CameraCall::SetAlarmTrigger)
    }

    async fn trigger_alarm_input(
        &self,
        credentials: &CameraCredentials,
        is_on: bool,
    ) -> Result<(), ProtocolError> {
        self.record(credentials, CameraCall::TriggerInput(is_on))
    }
}

/// Peer directory holding the given cameras and their declared settings.
pub fn peers_with(cameras: &[(&str, &[(&str, &str)])]) -> Arc<dyn PeerDirectory> {
    Arc::new(CameraDirectory::new(cameras.iter().map(|(id, settings)| {
        CameraEntry {
            id: id.to_string(),
            name: Some(format!("Camera {id}")),
            settings: Some(
                settings
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    })))
}

pub const FULL_CREDENTIALS: &[(&str, &str)] =
    &[("ip", "10.0.0.5"), ("username", "admin"), ("password", "pw")];
