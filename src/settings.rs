use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::protocol::client::{IsapiClientOptions, IsapiClientOptionsBuilderError};

/// A camera managed by the host, as seen by the switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraEntry {
    pub id: String,
    pub name: Option<String>,
    /// Declared configuration of the camera (`ip`, `username`, `password`, ...).
    /// Absent when the device does not expose settings at all.
    pub settings: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub cameras: Vec<CameraEntry>,
    pub store_path: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub scheme: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cameras: vec![],
            store_path: Some(String::from("hikvision-switch.json")),
            request_timeout_secs: None,
            scheme: Some(String::from("http")),
        }
    }
}

impl Settings {
    /// Reads the settings file, falling back to defaults when it cannot be read.
    pub fn load(path: Option<&Path>) -> serde_json::Result<Self> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content),
            Err(e) => {
                warn!(
                    "Failed to read settings file {}: {e}, using default settings",
                    path.display()
                );
                Ok(Settings::default())
            }
        }
    }

    pub fn client_options(&self) -> Result<IsapiClientOptions, IsapiClientOptionsBuilderError> {
        let mut builder = IsapiClientOptions::builder();
        if let Some(scheme) = &self.scheme {
            builder.scheme(scheme.as_str());
        }
        if let Some(secs) = self.request_timeout_secs {
            builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}
