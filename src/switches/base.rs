use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::peers::PeerDirectory;
use crate::protocol::client::{CameraApi, CameraCredentials};
use crate::storage::DeviceStorage;
use crate::switches::{
    CAMERA_KEY, CREDENTIAL_KEYS, IP_KEY, PASSWORD_KEY, Setting, SettingKind, SwitchError,
    USERNAME_KEY,
};

/// Which credential fields were found on the selected camera and cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialResolution {
    pub ip: bool,
    pub username: bool,
    pub password: bool,
}

impl CredentialResolution {
    fn mark(&mut self, key: &str) {
        match key {
            IP_KEY => self.ip = true,
            USERNAME_KEY => self.username = true,
            PASSWORD_KEY => self.password = true,
            _ => {}
        }
    }
}

/// State shared by both switch variants: identity, camera client, own storage
/// and access to the peer camera settings.
pub(crate) struct SwitchBase<C: CameraApi> {
    pub(crate) native_id: String,
    pub(crate) client: C,
    pub(crate) storage: DeviceStorage,
    peers: Arc<dyn PeerDirectory>,
}

impl<C: CameraApi> SwitchBase<C> {
    pub(crate) fn new(client: C, storage: DeviceStorage, peers: Arc<dyn PeerDirectory>) -> Self {
        Self {
            native_id: storage.device_id().to_string(),
            client,
            storage,
            peers,
        }
    }

    /// Cached credentials, only when all three parts are present.
    pub(crate) fn credentials(&self) -> Option<CameraCredentials> {
        CameraCredentials::from_parts(
            self.storage.get_item(IP_KEY),
            self.storage.get_item(USERNAME_KEY),
            self.storage.get_item(PASSWORD_KEY),
        )
    }

    pub(crate) fn require_credentials(&self) -> Result<CameraCredentials, SwitchError> {
        self.credentials().ok_or_else(|| {
            SwitchError::Configuration(format!(
                "{}: Missing camera IP, username, or password.",
                self.native_id
            ))
        })
    }

    /// Copies `ip`, `username` and `password` from the camera settings into the
    /// switch storage. Fields the camera does not provide keep their cached value.
    pub(crate) async fn resolve_and_cache(&self, camera_id: &str) -> CredentialResolution {
        let mut resolution = CredentialResolution::default();
        for key in CREDENTIAL_KEYS {
            let Some(value) = self.peers.get_setting(camera_id, key).await else {
                debug!(
                    "Camera {camera_id} has no {key} for {}, keeping cached value",
                    self.native_id
                );
                continue;
            };
            match self.storage.set_item(key, &value) {
                Ok(()) => resolution.mark(key),
                Err(e) => error!("{}: cannot cache {key}: {e}", self.native_id),
            }
        }
        info!(
            "{} resolved credentials from camera {camera_id}: {resolution:?}",
            self.native_id
        );
        resolution
    }

    /// Stores the camera selection and resolves its credentials.
    pub(crate) async fn select_camera(
        &self,
        camera_id: &str,
    ) -> Result<CredentialResolution, SwitchError> {
        self.storage.set_item(CAMERA_KEY, camera_id)?;
        if camera_id.is_empty() {
            warn!("{}: camera selection cleared", self.native_id);
            return Ok(CredentialResolution::default());
        }
        Ok(self.resolve_and_cache(camera_id).await)
    }

    pub(crate) fn camera_setting(&self, description: &str) -> Setting {
        Setting::new(CAMERA_KEY, "Camera", description, SettingKind::Device)
            .with_value(self.storage.get_item(CAMERA_KEY).unwrap_or_default())
    }
}
