//! Creation and lookup of the virtual switches.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::peers::PeerDirectory;
use crate::protocol::client::CameraApi;
use crate::storage::{DeviceStorage, StorageError, StoreBackend};
use crate::switches::{
    AlarmSwitch, CAMERA_KEY, FloodlightSwitch, Setting, SettingChoice, SettingKind, SwitchError,
    SwitchKind, VirtualSwitch,
};

pub const DEVICE_TYPE_KEY: &str = "deviceType";
const REGISTRY_ID: &str = "provider";
const DEVICES_KEY: &str = "devices";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub native_id: String,
    pub name: String,
    pub kind: SwitchKind,
    pub camera: String,
}

pub struct DeviceProvider<C: CameraApi + Clone + 'static> {
    client: C,
    backend: Arc<dyn StoreBackend>,
    peers: Arc<dyn PeerDirectory>,
    registry: DeviceStorage,
    devices: DashMap<String, Arc<dyn VirtualSwitch>>,
}

impl<C: CameraApi + Clone + 'static> DeviceProvider<C> {
    pub fn new(client: C, backend: Arc<dyn StoreBackend>, peers: Arc<dyn PeerDirectory>) -> Self {
        Self {
            client,
            registry: DeviceStorage::new(REGISTRY_ID, backend.clone()),
            backend,
            peers,
            devices: DashMap::new(),
        }
    }

    /// Settings asked to the user before creating a device.
    pub fn create_device_settings(&self) -> Vec<Setting> {
        vec![
            Setting::new(
                DEVICE_TYPE_KEY,
                "Device Type",
                "Choose the type of device to add.",
                SettingKind::String,
            )
            .with_value(SwitchKind::Floodlight.display_name())
            .with_choices(vec![
                SettingChoice::plain(SwitchKind::Floodlight.display_name()),
                SettingChoice::plain(SwitchKind::AudioAlarm.display_name()),
            ]),
            Setting::new(
                CAMERA_KEY,
                "Camera",
                "Select a camera or doorbell that supports supplemental floodlight control.",
                SettingKind::Device,
            ),
        ]
    }

    /// Recorded devices. An unreadable registry is an error, never an empty list.
    pub fn list_devices(&self) -> Result<Vec<DeviceRecord>, SwitchError> {
        let Some(content) = self.registry.get_item(DEVICES_KEY) else {
            return Ok(vec![]);
        };
        serde_json::from_str(&content).map_err(|source| {
            warn!("Device registry is unreadable: {source}");
            SwitchError::Storage(StorageError::Json {
                path: REGISTRY_ID.to_string(),
                source,
            })
        })
    }

    fn save_devices(&self, devices: &[DeviceRecord]) -> Result<(), SwitchError> {
        let content = serde_json::to_string(devices).map_err(|source| StorageError::Json {
            path: REGISTRY_ID.to_string(),
            source,
        })?;
        self.registry.set_item(DEVICES_KEY, &content)?;
        Ok(())
    }

    /// Registers a new switch bound to `camera_id` and returns its native id.
    pub async fn create_device(
        &self,
        device_type: &str,
        camera_id: &str,
    ) -> Result<String, SwitchError> {
        if device_type.is_empty() || camera_id.is_empty() {
            return Err(SwitchError::Configuration(
                "Missing device type or camera selection.".to_string(),
            ));
        }
        let kind = SwitchKind::from_display_name(device_type).ok_or_else(|| {
            SwitchError::invalid(DEVICE_TYPE_KEY, format!("unknown device type {device_type}"))
        })?;

        let native_id = generate_native_id(kind);
        let name_base = self
            .peers
            .device_name(camera_id)
            .unwrap_or_else(|| kind.display_name().to_string());
        let name = format!("{name_base} {} Switch", kind.display_name());

        let mut devices = self.list_devices()?;
        devices.push(DeviceRecord {
            native_id: native_id.clone(),
            name: name.clone(),
            kind,
            camera: camera_id.to_string(),
        });
        self.save_devices(&devices)?;
        info!("Created {} '{name}' ({native_id})", kind.as_str());

        let device = self.get_device(&native_id).await?;
        device.put_setting(CAMERA_KEY, camera_id).await?;
        Ok(native_id)
    }

    /// Returns the live instance of a switch, creating it on first access.
    pub async fn get_device(&self, native_id: &str) -> Result<Arc<dyn VirtualSwitch>, SwitchError> {
        if let Some(device) = self.devices.get(native_id) {
            return Ok(device.clone());
        }

        let kind = self
            .list_devices()?
            .into_iter()
            .find(|record| record.native_id == native_id)
            .map(|record| record.kind)
            .or_else(|| SwitchKind::from_native_id(native_id))
            .ok_or_else(|| SwitchError::UnknownDevice(native_id.to_string()))?;

        let storage = DeviceStorage::new(native_id, self.backend.clone());
        let device: Arc<dyn VirtualSwitch> = match kind {
            SwitchKind::Floodlight => Arc::new(
                FloodlightSwitch::connect(self.client.clone(), storage, self.peers.clone()).await,
            ),
            SwitchKind::AudioAlarm => Arc::new(AlarmSwitch::new(
                self.client.clone(),
                storage,
                self.peers.clone(),
            )),
        };
        // a concurrent lookup may have built one meanwhile; the first one stored wins
        let device = self
            .devices
            .entry(native_id.to_string())
            .or_insert(device)
            .value()
            .clone();
        Ok(device)
    }
}

fn generate_native_id(kind: SwitchKind) -> String {
    let bytes: [u8; 4] = rand::random();
    let suffix: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("{}{suffix}", kind.id_prefix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::switches::testing::{CameraCall, FULL_CREDENTIALS, FakeCameraApi, peers_with};

    fn provider(client: FakeCameraApi) -> DeviceProvider<FakeCameraApi> {
        DeviceProvider::new(
            client,
            Arc::new(MemoryStore::new()),
            peers_with(&[("42", FULL_CREDENTIALS)]),
        )
    }

    #[test]
    fn test_native_id_format() {
        let id = generate_native_id(SwitchKind::AudioAlarm);
        assert!(id.starts_with("audio-alarm-"));
        let suffix = &id["audio-alarm-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_create_alarm_binds_camera() {
        let client = FakeCameraApi::new();
        let provider = provider(client.clone());

        let id = provider.create_device("Audio Alarm", "42").await.unwrap();
        assert!(id.starts_with("audio-alarm-"));
        assert_eq!(client.calls(), vec![CameraCall::SetAlarmTrigger]);

        let devices = provider.list_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Camera 42 Audio Alarm Switch");
        assert_eq!(devices[0].kind, SwitchKind::AudioAlarm);

        let device = provider.get_device(&id).await.unwrap();
        assert_eq!(device.kind(), SwitchKind::AudioAlarm);
        device.turn_on().await.unwrap();
        // same instance is handed out again
        assert!(provider.get_device(&id).await.unwrap().is_on());
    }

    #[tokio::test]
    async fn test_create_floodlight_for_unknown_camera() {
        let provider = provider(FakeCameraApi::new());
        let id = provider.create_device("Floodlight", "99").await.unwrap();
        assert!(id.starts_with("floodlight-switch-"));
        assert_eq!(provider.list_devices().unwrap()[0].name, "Floodlight Floodlight Switch");
    }

    #[tokio::test]
    async fn test_create_requires_type_and_camera() {
        let provider = provider(FakeCameraApi::new());
        assert!(matches!(
            provider.create_device("", "42").await,
            Err(SwitchError::Configuration(_))
        ));
        assert!(matches!(
            provider.create_device("Floodlight", "").await,
            Err(SwitchError::Configuration(_))
        ));
        assert!(matches!(
            provider.create_device("Siren", "42").await,
            Err(SwitchError::InvalidSetting { .. })
        ));
        assert!(provider.list_devices().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_registry_is_not_overwritten() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(REGISTRY_ID, DEVICES_KEY, "[{\"native_id\":").unwrap();
        let provider = DeviceProvider::new(
            FakeCameraApi::new(),
            backend.clone(),
            peers_with(&[("42", FULL_CREDENTIALS)]),
        );

        assert!(matches!(
            provider.list_devices(),
            Err(SwitchError::Storage(StorageError::Json { .. }))
        ));
        assert!(matches!(
            provider.create_device("Floodlight", "42").await,
            Err(SwitchError::Storage(_))
        ));
        assert_eq!(
            backend.get(REGISTRY_ID, DEVICES_KEY).as_deref(),
            Some("[{\"native_id\":")
        );
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_instance() {
        let backend = Arc::new(MemoryStore::new());
        for (key, value) in FULL_CREDENTIALS {
            backend.set("floodlight-switch-0001", key, value).unwrap();
        }
        let client = FakeCameraApi::new();
        let provider = DeviceProvider::new(
            client.clone(),
            backend,
            peers_with(&[("42", FULL_CREDENTIALS)]),
        );

        let (first, second) = tokio::join!(
            provider.get_device("floodlight-switch-0001"),
            provider.get_device("floodlight-switch-0001"),
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        // both lookups built a switch before either was stored
        assert_eq!(client.calls(), vec![CameraCall::GetLightState; 2]);
        assert!(Arc::ptr_eq(&first, &second));

        first.turn_on().await.unwrap();
        assert!(provider.get_device("floodlight-switch-0001").await.unwrap().is_on());
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let provider = provider(FakeCameraApi::new());
        assert!(matches!(
            provider.get_device("thermostat-1").await,
            Err(SwitchError::UnknownDevice(_))
        ));
    }
}
