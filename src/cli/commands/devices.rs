use anyhow::Result;
use hikvision_switch_rs::SwitchKind;

use crate::Params;
use crate::utils::{KindArg, create_provider};

pub fn list_devices(params: &Params) -> Result<()> {
    let provider = create_provider(params)?;
    let devices = provider.list_devices()?;
    if devices.is_empty() {
        println!("No switches created yet");
    }
    for device in devices {
        println!(
            "{} '{}' ({}) camera {}",
            device.native_id,
            device.name,
            device.kind.as_str(),
            device.camera
        );
    }
    Ok(())
}

pub async fn create_device(params: &Params, kind: KindArg, camera: &str) -> Result<()> {
    let provider = create_provider(params)?;
    let kind = SwitchKind::from(kind);
    let id = provider.create_device(kind.display_name(), camera).await?;
    println!("Created {id}");
    Ok(())
}
