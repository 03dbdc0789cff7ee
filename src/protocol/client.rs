use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_builder::Builder;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::protocol::capabilities::AudioAlarmCapabilities;
use crate::protocol::payloads::{
    AudioAlarmConfig, BrightnessMode, IO_TRIGGER_XML, io_input_xml, parse_white_light_brightness,
    supplement_light_xml, target_brightness,
};

pub const SUPPLEMENT_LIGHT_PATH: &str = "/ISAPI/Image/channels/1/supplementLight";
pub const AUDIO_ALARM_CAPABILITIES_PATH: &str =
    "/ISAPI/Event/triggers/notifications/AudioAlarm/capabilities?format=json";
pub const AUDIO_ALARM_PATH: &str = "/ISAPI/Event/triggers/notifications/AudioAlarm?format=json";
pub const IO_TRIGGER_PATH: &str = "/ISAPI/Event/triggers/IO-1";
pub const IO_INPUT_PATH: &str = "/ISAPI/System/IO/inputs/1";

const XML: &str = "application/xml";
const JSON: &str = "application/json";

#[derive(Error, Debug)]
#[error("{message}")]
pub struct ProtocolError {
    /// HTTP status of the camera reply, `None` when no valid reply was received.
    pub status: Option<u16>,
    pub message: String,
}

impl ProtocolError {
    pub fn http(status: StatusCode, context: &str) -> Self {
        Self {
            status: Some(status.as_u16()),
            message: format!("HTTP error {context}! status: {}", status.as_u16()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn malformed(context: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            message: format!("Malformed response {context}: {reason}"),
        }
    }
}

impl From<reqwest::Error> for ProtocolError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: format!("Request failed: {e}"),
        }
    }
}

/// Address and basic credentials of a camera.
#[derive(Clone, PartialEq, Eq)]
pub struct CameraCredentials {
    pub ip: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CameraCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCredentials")
            .field("ip", &self.ip)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl CameraCredentials {
    /// Returns credentials only when every part is present and non empty.
    pub fn from_parts(
        ip: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Some(Self {
            ip: non_empty(ip)?,
            username: non_empty(username)?,
            password: non_empty(password)?,
        })
    }

    pub fn authorization_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }

    pub fn url(&self, scheme: &str, path: &str) -> String {
        format!("{scheme}://{}{path}", self.ip)
    }
}

/// Camera control operations used by the switches.
///
/// Every call is a single self-contained HTTP exchange. Nothing is retried and
/// nothing is cached.
#[async_trait]
pub trait CameraApi: Send + Sync {
    /// `true` when the white light brightness reported by the camera is above 0.
    async fn get_supplemental_light_state(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<bool, ProtocolError>;

    async fn set_supplemental_light(
        &self,
        credentials: &CameraCredentials,
        enabled: bool,
        mode: BrightnessMode,
        manual_brightness: Option<u8>,
    ) -> Result<(), ProtocolError>;

    async fn get_audio_alarm_capabilities(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<AudioAlarmCapabilities, ProtocolError>;

    async fn set_audio_alarm_config(
        &self,
        credentials: &CameraCredentials,
        config: &AudioAlarmConfig,
    ) -> Result<(), ProtocolError>;

    /// Arms the fixed linkage of input channel 1.
    async fn set_alarm_trigger_config(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<(), ProtocolError>;

    /// Trips (`true`) or resets (`false`) the digital input.
    async fn trigger_alarm_input(
        &self,
        credentials: &CameraCredentials,
        is_on: bool,
    ) -> Result<(), ProtocolError>;
}

#[derive(Builder, Clone, Debug)]
pub struct IsapiClientOptions {
    #[builder(default = "String::from(\"http\")", setter(into))]
    pub scheme: String,
    /// No timeout unless set, the transport defaults apply.
    #[builder(default, setter(strip_option))]
    pub timeout: Option<Duration>,
}

impl IsapiClientOptions {
    pub fn builder() -> IsapiClientOptionsBuilder {
        IsapiClientOptionsBuilder::default()
    }
}

/// HTTP implementation of [`CameraApi`].
#[derive(Clone)]
pub struct IsapiClient {
    http: reqwest::Client,
    scheme: String,
}

impl IsapiClient {
    pub fn new(options: IsapiClientOptions) -> Result<Self, ProtocolError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            scheme: options.scheme,
        })
    }

    /// Issues the request and rejects any non-2xx status.
    async fn execute(
        &self,
        method: Method,
        credentials: &CameraCredentials,
        path: &str,
        content_type: &str,
        body: Option<String>,
        context: &str,
    ) -> Result<Response, ProtocolError> {
        let url = credentials.url(&self.scheme, path);
        debug!("{method} {url}");
        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, content_type)
            .header(AUTHORIZATION, credentials.authorization_header());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProtocolError::http(status, context));
        }
        Ok(response)
    }

    async fn send(
        &self,
        method: Method,
        credentials: &CameraCredentials,
        path: &str,
        content_type: &str,
        body: Option<String>,
        context: &str,
    ) -> Result<String, ProtocolError> {
        let response = self
            .execute(method, credentials, path, content_type, body, context)
            .await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CameraApi for IsapiClient {
    async fn get_supplemental_light_state(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<bool, ProtocolError> {
        let body = self
            .send(
                Method::GET,
                credentials,
                SUPPLEMENT_LIGHT_PATH,
                XML,
                None,
                "reading supplement light",
            )
            .await?;
        let brightness = parse_white_light_brightness(&body);
        debug!("Supplement light brightness on {}: {brightness}", credentials.ip);
        Ok(brightness > 0)
    }

    async fn set_supplemental_light(
        &self,
        credentials: &CameraCredentials,
        enabled: bool,
        mode: BrightnessMode,
        manual_brightness: Option<u8>,
    ) -> Result<(), ProtocolError> {
        let brightness = target_brightness(enabled, mode, manual_brightness);
        self.send(
            Method::PUT,
            credentials,
            SUPPLEMENT_LIGHT_PATH,
            XML,
            Some(supplement_light_xml(mode, brightness)),
            "setting supplement light",
        )
        .await?;
        Ok(())
    }

    async fn get_audio_alarm_capabilities(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<AudioAlarmCapabilities, ProtocolError> {
        let context = "fetching audio alarm capabilities";
        self.execute(
            Method::GET,
            credentials,
            AUDIO_ALARM_CAPABILITIES_PATH,
            JSON,
            None,
            context,
        )
        .await?
        .json::<AudioAlarmCapabilities>()
        .await
        .map_err(|e| ProtocolError::malformed(context, e))
    }

    async fn set_audio_alarm_config(
        &self,
        credentials: &CameraCredentials,
        config: &AudioAlarmConfig,
    ) -> Result<(), ProtocolError> {
        let context = "setting audio alarm config";
        let payload = config
            .to_json()
            .map_err(|e| ProtocolError::transport(format!("Cannot encode {context}: {e}")))?;
        self.send(
            Method::PUT,
            credentials,
            AUDIO_ALARM_PATH,
            JSON,
            Some(payload),
            context,
        )
        .await?;
        Ok(())
    }

    async fn set_alarm_trigger_config(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<(), ProtocolError> {
        self.send(
            Method::PUT,
            credentials,
            IO_TRIGGER_PATH,
            XML,
            Some(IO_TRIGGER_XML.to_string()),
            "setting alarm trigger config",
        )
        .await?;
        Ok(())
    }

    async fn trigger_alarm_input(
        &self,
        credentials: &CameraCredentials,
        is_on: bool,
    ) -> Result<(), ProtocolError> {
        self.send(
            Method::PUT,
            credentials,
            IO_INPUT_PATH,
            XML,
            Some(io_input_xml(is_on)),
            "triggering alarm input",
        )
        .await?;
        Ok(())
    }
}
