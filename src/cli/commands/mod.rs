mod devices;
mod power;
mod settings;

pub use devices::{create_device, list_devices};
pub use power::{status, turn_off, turn_on};
pub use settings::{put_setting, readme, show_settings};
