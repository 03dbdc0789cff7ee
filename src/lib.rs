pub mod logging;
pub mod peers;
pub mod protocol;
pub mod provider;
pub mod settings;
pub mod storage;
pub mod switches;

pub use peers::{CameraDirectory, PeerDirectory};
pub use protocol::capabilities::{AudioAlarmCapabilities, AudioChoice};
pub use protocol::client::{
    CameraApi, CameraCredentials, IsapiClient, IsapiClientOptions, ProtocolError,
};
pub use protocol::payloads::{AudioAlarmConfig, BrightnessMode};
pub use provider::{DeviceProvider, DeviceRecord};
pub use settings::{CameraEntry, Settings};
pub use storage::{DeviceStorage, JsonFileStore, MemoryStore, StorageError, StoreBackend};
pub use switches::{
    AlarmConfig, AlarmSwitch, FloodlightConfig, FloodlightSwitch, Setting, SwitchError,
    SwitchKind, VirtualSwitch,
};
