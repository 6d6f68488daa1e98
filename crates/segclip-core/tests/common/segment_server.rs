//! Minimal HTTP/1.1 server standing in for the segment CDN.
//!
//! Every GET is answered with a body derived from the request path
//! (`<path>`), so concatenated output shows exactly which resources were
//! fetched and in which order. Paths can be made to fail with a fixed status.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Channel prefix path under the server root.
pub const PREFIX_PATH: &str = "live/";

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// `(path suffix, status)`: matching requests get this status and no body.
    pub fail: Vec<(String, u16)>,
}

impl ServerOptions {
    pub fn failing(suffix: &str, status: u16) -> Self {
        Self {
            fail: vec![(suffix.to_string(), status)],
        }
    }
}

pub struct SegmentServer {
    base: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl SegmentServer {
    /// Channel prefix to put in the catalog, ending with `/`.
    pub fn prefix(&self) -> String {
        format!("{}{}", self.base, PREFIX_PATH)
    }

    /// Request paths seen so far, in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

/// Body served for `path`.
pub fn body_for(path: &str) -> Vec<u8> {
    format!("<{}>", path).into_bytes()
}

pub fn start() -> SegmentServer {
    start_with_options(ServerOptions::default())
}

/// Runs until the test process exits.
pub fn start_with_options(opts: ServerOptions) -> SegmentServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(Mutex::new(Vec::new()));
    let opts = Arc::new(opts);
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = Arc::clone(&opts);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &opts, &hits));
        }
    });
    SegmentServer {
        base: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

fn handle(mut stream: TcpStream, opts: &ServerOptions, hits: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/").to_string();
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    hits.lock().unwrap().push(path.clone());

    if let Some((_, status)) = opts.fail.iter().find(|(suffix, _)| path.ends_with(suffix.as_str())) {
        let response = format!(
            "HTTP/1.1 {} Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let body = body_for(&path);
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: video/iso.segment\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
}
