pub mod capabilities;
pub mod client;
pub mod payloads;
