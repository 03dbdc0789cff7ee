use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use hikvision_switch_rs::{
    CameraDirectory, DeviceProvider, IsapiClient, JsonFileStore, Settings, SwitchKind,
};

use crate::Params;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum KindArg {
    Floodlight,
    Alarm,
}

impl From<KindArg> for SwitchKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Floodlight => SwitchKind::Floodlight,
            KindArg::Alarm => SwitchKind::AudioAlarm,
        }
    }
}

pub fn create_provider(params: &Params) -> Result<DeviceProvider<IsapiClient>> {
    let settings = Settings::load(params.config.as_deref().map(Path::new))
        .context("Settings file is not valid JSON")?;
    let store_path = params
        .store
        .clone()
        .or_else(|| settings.store_path.clone())
        .unwrap_or_else(|| Settings::default().store_path.unwrap_or_default());
    let store = JsonFileStore::open(&store_path)
        .with_context(|| format!("Cannot open device store {store_path}"))?;
    let options = settings
        .client_options()
        .context("Invalid camera client options")?;
    let client = IsapiClient::new(options).context("Cannot create camera client")?;
    let peers = CameraDirectory::new(settings.cameras);
    Ok(DeviceProvider::new(client, Arc::new(store), Arc::new(peers)))
}
