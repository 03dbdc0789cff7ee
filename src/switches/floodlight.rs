use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::peers::PeerDirectory;
use crate::protocol::client::CameraApi;
use crate::protocol::payloads::BrightnessMode;
use crate::storage::DeviceStorage;
use crate::switches::base::SwitchBase;
use crate::switches::state::parse_brightness;
use crate::switches::{
    BRIGHTNESS_MODE_KEY, CAMERA_KEY, FloodlightConfig, MANUAL_BRIGHTNESS_KEY, Setting,
    SettingChoice, SettingKind, SwitchError, SwitchKind, VirtualSwitch,
};

const README: &str = r#"
## Floodlight Switch

This switch controls the supplemental light on equipped Hikvision cameras.

TIP: The supplemental light will not turn on if the camera is in day mode.
"#;

/// Switch driving the supplemental white light of a camera.
pub struct FloodlightSwitch<C: CameraApi> {
    base: SwitchBase<C>,
    on: AtomicBool,
}

impl<C: CameraApi> FloodlightSwitch<C> {
    /// Creates the switch in the `off` state without contacting the camera.
    pub fn new(client: C, storage: DeviceStorage, peers: Arc<dyn PeerDirectory>) -> Self {
        Self {
            base: SwitchBase::new(client, storage, peers),
            on: AtomicBool::new(false),
        }
    }

    /// Creates the switch and reads the light state from the camera once.
    pub async fn connect(client: C, storage: DeviceStorage, peers: Arc<dyn PeerDirectory>) -> Self {
        let switch = Self::new(client, storage, peers);
        switch.check_initial_status().await;
        switch
    }

    /// A failed query leaves the switch off.
    pub async fn check_initial_status(&self) {
        let Some(credentials) = self.base.credentials() else {
            debug!("{}: no camera credentials yet", self.base.native_id);
            return;
        };
        match self.base.client.get_supplemental_light_state(&credentials).await {
            Ok(status) => {
                info!("{}: initial light state {}", self.base.native_id, status);
                self.on.store(status, Ordering::Release);
            }
            Err(e) => error!("{}: Error checking initial status: {e}", self.base.native_id),
        }
    }

    pub fn config(&self) -> FloodlightConfig {
        FloodlightConfig::from(&self.base.storage)
    }

    async fn set_floodlight(&self, enable: bool) -> Result<(), SwitchError> {
        let credentials = self.base.require_credentials()?;
        let config = self.config();
        self.base
            .client
            .set_supplemental_light(
                &credentials,
                enable,
                config.brightness_mode,
                Some(config.manual_brightness),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<C: CameraApi> VirtualSwitch for FloodlightSwitch<C> {
    fn native_id(&self) -> &str {
        &self.base.native_id
    }

    fn kind(&self) -> SwitchKind {
        SwitchKind::Floodlight
    }

    fn is_on(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }

    async fn turn_on(&self) -> Result<(), SwitchError> {
        self.set_floodlight(true).await?;
        self.on.store(true, Ordering::Release);
        info!("{}: floodlight on", self.base.native_id);
        Ok(())
    }

    async fn turn_off(&self) -> Result<(), SwitchError> {
        // the switch reports off even when the camera could not be reached
        if let Err(e) = self.set_floodlight(false).await {
            error!("{}: Error turning floodlight off: {e}", self.base.native_id);
        }
        self.on.store(false, Ordering::Release);
        info!("{}: floodlight off", self.base.native_id);
        Ok(())
    }

    async fn get_settings(&self) -> Vec<Setting> {
        let config = self.config();
        let mode = Setting::new(
            BRIGHTNESS_MODE_KEY,
            "Brightness Mode",
            r#"Choose "auto" for automatic brightness control or "manual" for custom brightness."#,
            SettingKind::String,
        )
        .with_value(config.brightness_mode.as_str())
        .with_choices(vec![
            SettingChoice::plain(BrightnessMode::Auto.as_str()),
            SettingChoice::plain(BrightnessMode::Manual.as_str()),
        ]);

        let brightness = Setting::new(
            MANUAL_BRIGHTNESS_KEY,
            "Manual Brightness",
            "Set brightness when in manual mode (0 to 100).",
            SettingKind::Number,
        );
        let brightness = match config.brightness_mode {
            BrightnessMode::Manual => brightness
                .with_value(config.manual_brightness.to_string())
                .with_range(0, 100),
            BrightnessMode::Auto => brightness.hide(),
        };

        vec![
            self.base
                .camera_setting("Select the device to use for floodlight control."),
            mode,
            brightness,
        ]
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), SwitchError> {
        match key {
            CAMERA_KEY => {
                self.base.select_camera(value).await?;
            }
            BRIGHTNESS_MODE_KEY => {
                let mode = value
                    .parse::<BrightnessMode>()
                    .map_err(|e| SwitchError::invalid(key, e))?;
                self.base.storage.set_item(key, mode.as_str())?;
            }
            MANUAL_BRIGHTNESS_KEY => {
                let brightness = parse_brightness(value).map_err(|e| SwitchError::invalid(key, e))?;
                self.base.storage.set_item(key, &brightness.to_string())?;
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
