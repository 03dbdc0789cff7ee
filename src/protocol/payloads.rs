use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const SUPPLEMENT_LIGHT_MODE: &str = "colorVuWhiteLight";
pub const FULL_BRIGHTNESS: u8 = 100;

static WHITE_LIGHT_BRIGHTNESS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"<whiteLightBrightness>(\d+)</whiteLightBrightness>").ok()
});

/// How the camera regulates the white light brightness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrightnessMode {
    #[default]
    Auto,
    Manual,
}

impl BrightnessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrightnessMode::Auto => "auto",
            BrightnessMode::Manual => "manual",
        }
    }
}

impl Display for BrightnessMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrightnessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(BrightnessMode::Auto),
            "manual" => Ok(BrightnessMode::Manual),
            _ => Err(format!(
                "Invalid brightness mode '{s}'. Valid options: auto, manual"
            )),
        }
    }
}

/// Brightness written to the camera for a light request.
///
/// Disabling always writes 0. Enabling writes the manual brightness only when the
/// mode is manual and a value is known, otherwise full brightness.
pub fn target_brightness(enabled: bool, mode: BrightnessMode, manual_brightness: Option<u8>) -> u8 {
    match (enabled, mode, manual_brightness) {
        (false, _, _) => 0,
        (true, BrightnessMode::Manual, Some(brightness)) => brightness,
        (true, _, _) => FULL_BRIGHTNESS,
    }
}

pub fn supplement_light_xml(mode: BrightnessMode, brightness: u8) -> String {
    format!(
        r#"<SupplementLight>
    <supplementLightMode>{SUPPLEMENT_LIGHT_MODE}</supplementLightMode>
    <mixedLightBrightnessRegulatMode>{mode}</mixedLightBrightnessRegulatMode>
    <whiteLightBrightness>{brightness}</whiteLightBrightness>
</SupplementLight>"#
    )
}

/// Reads the white light brightness out of a supplement light document.
/// A missing or unreadable tag counts as 0 (light off).
pub fn parse_white_light_brightness(body: &str) -> u32 {
    WHITE_LIGHT_BRIGHTNESS
        .as_ref()
        .and_then(|re| re.captures(body))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

pub fn io_input_xml(is_on: bool) -> String {
    let (enabled, triggering) = if is_on {
        ("true", "low")
    } else {
        ("false", "high")
    };
    format!(
        r#"<IOPortData>
    <enabled>{enabled}</enabled>
    <triggering>{triggering}</triggering>
</IOPortData>"#
    )
}

/// Linkage of input channel 1: beep, alarm center notification and the white
/// light strobe with no hold time.
pub const IO_TRIGGER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<EventTrigger version="2.0" xmlns="http://www.std-cgi.com/ver20/XMLSchema">
  <id>IO-1</id>
  <eventType>IO</eventType>
  <eventDescription>IO Event trigger Information</eventDescription>
  <inputIOPortID>1</inputIOPortID>
  <videoInputChannelID>1</videoInputChannelID>
  <dynVideoInputChannelID>1</dynVideoInputChannelID>
  <EventTriggerNotificationList>
    <EventTriggerNotification>
        <id>beep</id>
        <notificationMethod>beep</notificationMethod>
        <notificationRecurrence>beginning</notificationRecurrence>
    </EventTriggerNotification>
    <EventTriggerNotification>
        <id>center</id>
        <notificationMethod>center</notificationMethod>
        <notificationRecurrence>beginning</notificationRecurrence>
    </EventTriggerNotification>
    <EventTriggerNotification>
        <id>whiteLight</id>
        <notificationMethod>whiteLight</notificationMethod>
        <notificationRecurrence>beginning</notificationRecurrence>
        <WhiteLightAction>
            <whiteLightDurationTime>0</whiteLightDurationTime>
        </WhiteLightAction>
    </EventTriggerNotification>
  </EventTriggerNotificationList>
</EventTrigger>"#;

/// Sound and volume pushed to the camera audio alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioAlarmConfig {
    pub audio_id: u32,
    pub audio_volume: u32,
    pub alarm_times: u32,
}

impl AudioAlarmConfig {
    /// Builds a config from the string form kept in device storage.
    pub fn parse(audio_id: &str, audio_volume: &str, alarm_times: &str) -> Result<Self, String> {
        let number = |name: &str, value: &str| {
            value
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("{name} '{value}' is not a number: {e}"))
        };
        Ok(Self {
            audio_id: number("audioID", audio_id)?,
            audio_volume: number("audioVolume", audio_volume)?,
            alarm_times: number("alarmTimes", alarm_times)?,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&AudioAlarmBody::from(self))
    }
}

const CUSTOM_AUDIO_ID: u32 = 1;
const ALERT_AUDIO_CLASS: &str = "alertAudio";

#[derive(Serialize)]
struct AudioAlarmBody {
    #[serde(rename = "AudioAlarm")]
    audio_alarm: AudioAlarmPayload,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioAlarmPayload {
    #[serde(rename = "audioID")]
    audio_id: u32,
    audio_volume: u32,
    alarm_times: u32,
    #[serde(rename = "TimeRangeList")]
    time_range_list: Vec<WeekSchedule>,
    audio_class: &'static str,
    #[serde(rename = "alertAudioID")]
    alert_audio_id: u32,
    #[serde(rename = "customAudioID")]
    custom_audio_id: u32,
}

#[derive(Serialize)]
struct WeekSchedule {
    week: u8,
    #[serde(rename = "TimeRange")]
    time_range: Vec<TimeRange>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeRange {
    id: u8,
    begin_time: &'static str,
    end_time: &'static str,
}

impl From<&AudioAlarmConfig> for AudioAlarmBody {
    fn from(config: &AudioAlarmConfig) -> Self {
        // the firmware keeps the alarm silent outside the schedule, so it always
        // covers the whole week
        let time_range_list = (1..=7)
            .map(|week| WeekSchedule {
                week,
                time_range: vec![TimeRange {
                    id: 1,
                    begin_time: "00:00",
                    end_time: "24:00",
                }],
            })
            .collect();

        AudioAlarmBody {
            audio_alarm: AudioAlarmPayload {
                audio_id: config.audio_id,
                audio_volume: config.audio_volume,
                alarm_times: config.alarm_times,
                time_range_list,
                audio_class: ALERT_AUDIO_CLASS,
                alert_audio_id: config.audio_id,
                custom_audio_id: CUSTOM_AUDIO_ID,
            },
        }
    }
}
