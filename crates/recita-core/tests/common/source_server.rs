//! Minimal HTTP/1.1 server that serves numbered source recordings for integration tests.
//!
//! `GET /<anything>/<n>.<ext>` returns [`body_for(n)`](body_for). Individual
//! indices can be made to 404 or return an empty body, and the first few
//! requests overall can be answered with 503.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct SourceServerOptions {
    /// Answer the first N requests (of any index) with 503.
    pub unavailable_first: usize,
    /// Indices that return 404.
    pub missing: HashSet<u32>,
    /// Indices that return 200 with no body.
    pub empty: HashSet<u32>,
}

pub struct SourceServer {
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:12345/audio`.
    pub base_url: String,
    requests: Arc<AtomicUsize>,
}

impl SourceServer {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Deterministic body for index `n`.
pub fn body_for(n: u32) -> Vec<u8> {
    format!("source-recording-{n};").repeat(64).into_bytes()
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(opts: SourceServerOptions) -> SourceServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(AtomicUsize::new(0));
    let opts = Arc::new(opts);
    {
        let requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let requests = Arc::clone(&requests);
                let opts = Arc::clone(&opts);
                thread::spawn(move || handle(stream, &opts, &requests));
            }
        });
    }
    SourceServer {
        base_url: format!("http://127.0.0.1:{}/audio", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, opts: &SourceServerOptions, requests: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let seq = requests.fetch_add(1, Ordering::SeqCst);

    let (method, index) = parse_request(request);
    if !method.eq_ignore_ascii_case("GET") {
        respond(&mut stream, "405 Method Not Allowed", b"");
        return;
    }
    if seq < opts.unavailable_first {
        respond(&mut stream, "503 Service Unavailable", b"");
        return;
    }
    match index {
        None => respond(&mut stream, "404 Not Found", b""),
        Some(i) if opts.missing.contains(&i) => respond(&mut stream, "404 Not Found", b""),
        Some(i) if opts.empty.contains(&i) => respond(&mut stream, "200 OK", b""),
        Some(i) => respond(&mut stream, "200 OK", &body_for(i)),
    }
}

fn respond(stream: &mut TcpStream, status: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: audio/mpeg\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Returns (method, index parsed from the last path segment's stem).
fn parse_request(request: &str) -> (&str, Option<u32>) {
    let Some(line) = request.lines().next() else {
        return ("", None);
    };
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let index = parts
        .next()
        .and_then(|path| path.rsplit('/').next())
        .and_then(|file| file.split('.').next())
        .and_then(|stem| stem.parse().ok());
    (method, index)
}
