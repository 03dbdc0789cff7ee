use anyhow::Result;

use crate::Params;
use crate::utils::create_provider;

pub async fn show_settings(params: &Params, id: &str) -> Result<()> {
    let device = create_provider(params)?.get_device(id).await?;
    let settings = device.get_settings().await;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub async fn put_setting(params: &Params, id: &str, key: &str, value: &str) -> Result<()> {
    let device = create_provider(params)?.get_device(id).await?;
    device.put_setting(key, value).await?;
    println!("{id}: {key} = {value}");
    Ok(())
}

pub async fn readme(params: &Params, id: &str) -> Result<()> {
    let device = create_provider(params)?.get_device(id).await?;
    println!("{}", device.readme());
    Ok(())
}
