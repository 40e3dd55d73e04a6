//! Minimal HTTP/1.1 server with ETag / If-None-Match support for integration tests.
//!
//! Serves one mutable body. Answers GET with 200 and the current ETag, or
//! 304 when `If-None-Match` matches and conditional requests are honored.
//! Body, ETag, and status can be changed while the server runs.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
struct State {
    body: Vec<u8>,
    /// Unquoted strong ETag; served as `"<etag>"`.
    etag: Option<String>,
    /// Status for every GET; 200 serves the body.
    status: u16,
    honor_conditional: bool,
    last_if_none_match: Option<String>,
}

/// Handle to a running server. Clones share state.
#[derive(Clone)]
pub struct EtagServer {
    base: String,
    state: Arc<Mutex<State>>,
    requests: Arc<AtomicUsize>,
    not_modified: Arc<AtomicUsize>,
}

impl EtagServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start(body: &[u8], etag: Option<&str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let server = EtagServer {
            base: format!("http://127.0.0.1:{}/", port),
            state: Arc::new(Mutex::new(State {
                body: body.to_vec(),
                etag: etag.map(String::from),
                status: 200,
                honor_conditional: true,
                last_if_none_match: None,
            })),
            requests: Arc::new(AtomicUsize::new(0)),
            not_modified: Arc::new(AtomicUsize::new(0)),
        };
        let srv = server.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let srv = srv.clone();
                thread::spawn(move || srv.handle(stream));
            }
        });
        server
    }

    /// URL of the served file.
    pub fn url(&self) -> String {
        format!("{}payload.bin", self.base)
    }

    pub fn set_body(&self, body: &[u8]) {
        self.state.lock().unwrap().body = body.to_vec();
    }

    pub fn set_etag(&self, etag: Option<&str>) {
        self.state.lock().unwrap().etag = etag.map(String::from);
    }

    pub fn set_status(&self, status: u16) {
        self.state.lock().unwrap().status = status;
    }

    pub fn set_honor_conditional(&self, honor: bool) {
        self.state.lock().unwrap().honor_conditional = honor;
    }

    /// Total GET requests served.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of 304 answers sent.
    pub fn not_modified(&self) -> usize {
        self.not_modified.load(Ordering::SeqCst)
    }

    /// `If-None-Match` header of the most recent request, verbatim.
    pub fn last_if_none_match(&self) -> Option<String> {
        self.state.lock().unwrap().last_if_none_match.clone()
    }

    fn handle(&self, mut stream: std::net::TcpStream) {
        let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
        let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
        let Some(request) = read_request(&mut stream) else {
            return;
        };
        let (method, if_none_match) = parse_request(&request);
        if !method.eq_ignore_ascii_case("GET") {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            return;
        }
        self.requests.fetch_add(1, Ordering::SeqCst);

        let state = {
            let mut st = self.state.lock().unwrap();
            st.last_if_none_match = if_none_match.clone();
            st.clone()
        };

        if state.status != 200 {
            let response = format!(
                "HTTP/1.1 {} Error\r\nContent-Length: 5\r\nConnection: close\r\n\r\nerror",
                state.status
            );
            let _ = stream.write_all(response.as_bytes());
            return;
        }

        let quoted = state.etag.as_ref().map(|e| format!("\"{}\"", e));
        if state.honor_conditional {
            if let (Some(q), Some(inm)) = (&quoted, &if_none_match) {
                if inm.split(',').any(|t| t.trim() == q.as_str() || t.trim() == "*") {
                    self.not_modified.fetch_add(1, Ordering::SeqCst);
                    let response = format!(
                        "HTTP/1.1 304 Not Modified\r\nETag: {}\r\nConnection: close\r\n\r\n",
                        q
                    );
                    let _ = stream.write_all(response.as_bytes());
                    return;
                }
            }
        }

        let etag_header = quoted
            .map(|q| format!("ETag: {}\r\n", q))
            .unwrap_or_default();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            state.body.len(),
            etag_header
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(&state.body);
    }
}

/// Reads until the end of the request headers.
fn read_request(stream: &mut std::net::TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
            Err(_) => return None,
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

/// Returns (method, optional If-None-Match value).
fn parse_request(request: &str) -> (String, Option<String>) {
    let mut method = String::new();
    let mut if_none_match = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("").to_string();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("if-none-match") {
                if_none_match = Some(value.trim().to_string());
            }
        }
    }
    (method, if_none_match)
}

/// A URL on localhost where nothing listens (connection refused).
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/payload.bin", port)
}
