#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use hikvision_switch_rs::CameraCredentials;
use parking_lot::Mutex;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// In-process camera answering every ISAPI path and recording the requests.
#[derive(Clone)]
pub struct MockCamera {
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    pub status: Arc<AtomicU16>,
    pub light_body: Arc<Mutex<String>>,
    pub capabilities_body: Arc<Mutex<String>>,
    pub addr: SocketAddr,
}

impl MockCamera {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let camera = MockCamera {
            requests: Arc::new(Mutex::new(vec![])),
            status: Arc::new(AtomicU16::new(200)),
            light_body: Arc::new(Mutex::new(String::new())),
            capabilities_body: Arc::new(Mutex::new("{}".to_string())),
            addr,
        };
        let app = Router::new().fallback(handle).with_state(camera.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        camera
    }

    pub fn credentials(&self) -> CameraCredentials {
        CameraCredentials {
            ip: self.addr.to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        }
    }

    pub fn respond_with(&self, status: u16) {
        self.status.store(status, Ordering::Relaxed);
    }

    pub fn set_light_body(&self, body: &str) {
        *self.light_body.lock() = body.to_string();
    }

    pub fn set_capabilities(&self, body: &str) {
        *self.capabilities_body.lock() = body.to_string();
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

async fn handle(
    State(camera): State<MockCamera>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    camera.requests.lock().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body,
    });

    let status = StatusCode::from_u16(camera.status.load(Ordering::Relaxed))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let reply = match (method, uri.path()) {
        (Method::GET, "/ISAPI/Image/channels/1/supplementLight") => camera.light_body.lock().clone(),
        (Method::GET, "/ISAPI/Event/triggers/notifications/AudioAlarm/capabilities") => {
            camera.capabilities_body.lock().clone()
        }
        _ => String::new(),
    };
    (status, reply)
}
