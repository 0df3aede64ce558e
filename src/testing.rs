//! In-memory fakes for exercising the session core without a network

#![allow(clippy::unwrap_used)]

use crate::auth::refresh::{RefreshResponse, Refresher};
use crate::client::{ApiResponse, ProtectedRequest, Transport};
use crate::error::{PortalError, Result};
use crate::session::Role;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Refresh grant for user `u1` with `token`
pub fn grant(token: &str) -> RefreshResponse {
    RefreshResponse {
        uuid: "u1".to_string(),
        name: "A".to_string(),
        email: "a@x.com".to_string(),
        role: Role::Sponsor,
        access_token: token.to_string(),
    }
}

/// Refresher replaying scripted outcomes in order
pub struct ScriptedRefresher {
    outcomes: Mutex<VecDeque<Result<RefreshResponse>>>,
    calls: AtomicUsize,
    yield_first: bool,
}

impl ScriptedRefresher {
    pub fn new(outcomes: impl IntoIterator<Item = Result<RefreshResponse>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: AtomicUsize::new(0),
            yield_first: false,
        }
    }

    /// Refresher that fails if it is ever called
    pub fn empty() -> Self {
        Self::new(Vec::<Result<RefreshResponse>>::new())
    }

    /// Suspend once before answering so concurrent callers can interleave
    pub fn yielding(mut self) -> Self {
        self.yield_first = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Refresher for ScriptedRefresher {
    async fn fetch(&self) -> Result<RefreshResponse> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.yield_first {
            tokio::task::yield_now().await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortalError::Internal("refresh script exhausted".to_string())))
    }
}

type Responder = dyn Fn(&ProtectedRequest) -> Result<ApiResponse> + Send + Sync;

/// Transport answering through a closure and recording every request it saw
pub struct ScriptedTransport {
    respond: Box<Responder>,
    seen: Mutex<Vec<ProtectedRequest>>,
}

impl ScriptedTransport {
    pub fn new(respond: impl Fn(&ProtectedRequest) -> Result<ApiResponse> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Replay responses in order, regardless of the request
    pub fn replay(responses: impl IntoIterator<Item = ApiResponse>) -> Self {
        let queue = Mutex::new(responses.into_iter().collect::<VecDeque<_>>());
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| PortalError::Internal("transport script exhausted".to_string()))
        })
    }

    /// 200 when the bearer token equals `valid`, 401 otherwise
    pub fn accepting(valid: &str) -> Self {
        let expected = format!("Bearer {valid}");
        Self::new(move |request| {
            let authorized = request
                .headers()
                .get(AUTHORIZATION)
                .is_some_and(|value| value == expected.as_str());
            Ok(if authorized {
                ok("{}")
            } else {
                status(StatusCode::UNAUTHORIZED)
            })
        })
    }

    pub fn seen(&self) -> Vec<ProtectedRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// `Authorization` values of every request seen, in order
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.seen()
            .iter()
            .map(|request| {
                request
                    .headers()
                    .get(AUTHORIZATION)
                    .map(|value| value.to_str().unwrap().to_string())
            })
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ProtectedRequest) -> Result<ApiResponse> {
        self.seen.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}

pub fn ok(body: &str) -> ApiResponse {
    ApiResponse::new(StatusCode::OK, body)
}

pub fn status(code: StatusCode) -> ApiResponse {
    ApiResponse::new(code, "")
}

/// Raw HTTP/1.1 response with `headers` and a JSON content type
pub fn http_response(status_line: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
        body.len()
    );
    for (name, value) in headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(body);
    response
}

/// Serve `responses` on a local port, one connection each, in order.
///
/// Returns the base URL and a handle yielding the raw requests received.
pub async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut received = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            received.push(read_request(&mut socket).await);
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
        received
    });

    (base_url, handle)
}

/// Read one request: headers, then `content-length` bytes of body
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
