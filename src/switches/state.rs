use crate::protocol::payloads::{BrightnessMode, FULL_BRIGHTNESS};
use crate::storage::DeviceStorage;
use crate::switches::{
    AUDIO_ALARM_TYPE_KEY, AUDIO_ALARM_VOLUME_KEY, BRIGHTNESS_MODE_KEY, MANUAL_BRIGHTNESS_KEY,
};

pub(crate) const DEFAULT_BRIGHTNESS_MODE: BrightnessMode = BrightnessMode::Manual;
pub(crate) const DEFAULT_ALARM_VOLUME: u32 = 20;
pub(crate) const ALARM_TIMES: u32 = 1;

/// Light settings of a floodlight switch, read from its storage.
///
/// The manual brightness is kept while the mode is `auto` so it can be reused
/// when switching back to `manual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodlightConfig {
    pub brightness_mode: BrightnessMode,
    pub manual_brightness: u8,
}

impl Default for FloodlightConfig {
    fn default() -> Self {
        Self {
            brightness_mode: DEFAULT_BRIGHTNESS_MODE,
            manual_brightness: FULL_BRIGHTNESS,
        }
    }
}

impl From<&DeviceStorage> for FloodlightConfig {
    fn from(storage: &DeviceStorage) -> Self {
        let defaults = FloodlightConfig::default();
        let brightness_mode = storage
            .get_item(BRIGHTNESS_MODE_KEY)
            .and_then(|mode| mode.parse().ok())
            .unwrap_or(defaults.brightness_mode);
        let manual_brightness = storage
            .get_item(MANUAL_BRIGHTNESS_KEY)
            .and_then(|value| parse_brightness(&value).ok())
            .unwrap_or(defaults.manual_brightness);
        Self {
            brightness_mode,
            manual_brightness,
        }
    }
}

pub(crate) fn parse_brightness(value: &str) -> Result<u8, String> {
    match value.trim().parse::<u8>() {
        Ok(brightness) if brightness <= FULL_BRIGHTNESS => Ok(brightness),
        Ok(brightness) => Err(format!("brightness {brightness} is outside 0-100")),
        Err(e) => Err(format!("'{value}' is not a brightness: {e}")),
    }
}

/// Audio alarm settings of an alarm switch, read from its storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmConfig {
    /// Camera defined sound id, empty until chosen.
    pub audio_type: String,
    pub audio_volume: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            audio_type: String::new(),
            audio_volume: DEFAULT_ALARM_VOLUME,
        }
    }
}

impl From<&DeviceStorage> for AlarmConfig {
    fn from(storage: &DeviceStorage) -> Self {
        let defaults = AlarmConfig::default();
        Self {
            audio_type: storage
                .get_item(AUDIO_ALARM_TYPE_KEY)
                .unwrap_or(defaults.audio_type),
            audio_volume: storage
                .get_item(AUDIO_ALARM_VOLUME_KEY)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.audio_volume),
        }
    }
}

pub(crate) fn parse_volume(value: &str, range: (i64, i64)) -> Result<u32, String> {
    let (min, max) = range;
    match value.trim().parse::<i64>() {
        Ok(volume) if (min..=max).contains(&volume) => u32::try_from(volume)
            .map_err(|_| format!("volume {volume} is outside {min}-{max}")),
        Ok(volume) => Err(format!("volume {volume} is outside {min}-{max}")),
        Err(e) => Err(format!("'{value}' is not a volume: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn storage() -> DeviceStorage {
        DeviceStorage::new("test-1", Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_floodlight_defaults() {
        let config = FloodlightConfig::from(&storage());
        assert_eq!(config.brightness_mode, BrightnessMode::Manual);
        assert_eq!(config.manual_brightness, 100);
    }

    #[test]
    fn test_floodlight_keeps_brightness_in_auto_mode() {
        let storage = storage();
        storage.set_item(BRIGHTNESS_MODE_KEY, "auto").unwrap();
        storage.set_item(MANUAL_BRIGHTNESS_KEY, "37").unwrap();
        let config = FloodlightConfig::from(&storage);
        assert_eq!(config.brightness_mode, BrightnessMode::Auto);
        assert_eq!(config.manual_brightness, 37);
    }

    #[test]
    fn test_parse_brightness() {
        assert_eq!(parse_brightness("0"), Ok(0));
        assert_eq!(parse_brightness(" 100 "), Ok(100));
        assert!(parse_brightness("101").is_err());
        assert!(parse_brightness("-1").is_err());
        assert!(parse_brightness("bright").is_err());
    }

    #[test]
    fn test_alarm_defaults() {
        let config = AlarmConfig::from(&storage());
        assert_eq!(config.audio_type, "");
        assert_eq!(config.audio_volume, 20);
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume("1", (1, 100)), Ok(1));
        assert_eq!(parse_volume("100", (1, 100)), Ok(100));
        assert!(parse_volume("0", (1, 100)).is_err());
        assert!(parse_volume("101", (1, 100)).is_err());
        assert!(parse_volume("11", (1, 10)).is_err());
        assert!(parse_volume("loud", (1, 100)).is_err());
    }
}
