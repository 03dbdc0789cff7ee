use serde::Deserialize;

pub const DEFAULT_VOLUME_RANGE: (i64, i64) = (1, 100);

/// Audio alarm capability document returned by the camera.
///
/// Only the parts used to build the sound and volume settings are modeled,
/// everything else in the document is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioAlarmCapabilities {
    #[serde(rename = "AudioAlarmCap", default)]
    pub audio_alarm_cap: Option<AudioAlarmCap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAlarmCap {
    #[serde(default)]
    pub audio_type_list_cap: Vec<AudioTypeCap>,
    #[serde(default)]
    pub audio_volume: Option<VolumeRange>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTypeCap {
    #[serde(rename = "audioID")]
    pub audio_id: AudioId,
    #[serde(default)]
    pub audio_description: String,
}

/// Firmwares disagree on whether sound ids are numbers or strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AudioId {
    Number(i64),
    Text(String),
}

impl AudioId {
    pub fn as_string(&self) -> String {
        match self {
            AudioId::Number(n) => n.to_string(),
            AudioId::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VolumeRange {
    pub min: i64,
    pub max: i64,
}

/// One selectable alarm sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChoice {
    pub id: String,
    pub description: String,
}

impl AudioAlarmCapabilities {
    pub fn audio_choices(&self) -> Vec<AudioChoice> {
        self.audio_alarm_cap
            .as_ref()
            .map(|cap| {
                cap.audio_type_list_cap
                    .iter()
                    .map(|item| AudioChoice {
                        id: item.audio_id.as_string(),
                        description: item.audio_description.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn volume_range(&self) -> Option<(i64, i64)> {
        self.audio_alarm_cap
            .as_ref()
            .and_then(|cap| cap.audio_volume)
            .filter(|range| range.min <= range.max)
            .map(|range| (range.min, range.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPABILITIES: &str = r#"{
        "AudioAlarmCap": {
            "audioTypeListCap": [
                {"audioID": 1, "audioDescription": "Siren"},
                {"audioID": 2, "audioDescription": "Warning, this is a restricted area"},
                {"audioID": "14", "audioDescription": "Custom"}
            ],
            "audioVolume": {"min": 1, "max": 100},
            "alarmTimes": {"min": 1, "max": 50}
        }
    }"#;

    #[test]
    fn test_parse_choices_in_camera_order() {
        let caps: AudioAlarmCapabilities = serde_json::from_str(CAPABILITIES).unwrap();
        let choices = caps.audio_choices();
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0].id, "1");
        assert_eq!(choices[0].description, "Siren");
        assert_eq!(choices[2].id, "14");
        assert_eq!(caps.volume_range(), Some((1, 100)));
    }

    #[test]
    fn test_missing_sections_yield_empty_choices() {
        let caps: AudioAlarmCapabilities = serde_json::from_str("{}").unwrap();
        assert!(caps.audio_choices().is_empty());
        assert_eq!(caps.volume_range(), None);

        let caps: AudioAlarmCapabilities =
            serde_json::from_str(r#"{"AudioAlarmCap": {"audioVolume": {"min": 9, "max": 2}}}"#)
                .unwrap();
        assert!(caps.audio_choices().is_empty());
        assert_eq!(caps.volume_range(), None);
    }
}
