use anyhow::Result;

use crate::Params;
use crate::utils::create_provider;

pub async fn turn_on(params: &Params, id: &str) -> Result<()> {
    let device = create_provider(params)?.get_device(id).await?;
    device.turn_on().await?;
    println!("{id} is on");
    Ok(())
}

pub async fn turn_off(params: &Params, id: &str) -> Result<()> {
    let device = create_provider(params)?.get_device(id).await?;
    device.turn_off().await?;
    println!("{id} is off");
    Ok(())
}

/// Only a floodlight reads its state back from the camera, an alarm always starts off.
pub async fn status(params: &Params, id: &str) -> Result<()> {
    let device = create_provider(params)?.get_device(id).await?;
    println!("{id}: {}", if device.is_on() { "on" } else { "off" });
    Ok(())
}
