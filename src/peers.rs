use std::collections::HashMap;

use async_trait::async_trait;

use crate::settings::CameraEntry;

/// Read access to the declared configuration of other managed devices.
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    /// Value of `key` in the settings of `device_id`. `None` when the device is
    /// unknown, exposes no settings, or the value is missing or empty.
    async fn get_setting(&self, device_id: &str, key: &str) -> Option<String>;

    fn device_name(&self, device_id: &str) -> Option<String>;
}

/// Directory of the cameras declared in the configuration file.
#[derive(Debug, Default, Clone)]
pub struct CameraDirectory {
    cameras: HashMap<String, CameraEntry>,
}

impl CameraDirectory {
    pub fn new(cameras: impl IntoIterator<Item = CameraEntry>) -> Self {
        Self {
            cameras: cameras
                .into_iter()
                .map(|camera| (camera.id.clone(), camera))
                .collect(),
        }
    }

    pub fn cameras(&self) -> impl Iterator<Item = &CameraEntry> {
        self.cameras.values()
    }
}

#[async_trait]
impl PeerDirectory for CameraDirectory {
    async fn get_setting(&self, device_id: &str, key: &str) -> Option<String> {
        self.cameras
            .get(device_id)?
            .settings
            .as_ref()?
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn device_name(&self, device_id: &str) -> Option<String> {
        self.cameras.get(device_id)?.name.clone()
    }
}
