//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed table of routes (vendor page, package bodies, redirects)
//! and counts how often each path was requested.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub status: &'static str,
    pub body: Vec<u8>,
    /// If false, omit `Content-Length` and close the connection after the body.
    pub send_length: bool,
    /// Announced `Content-Length` instead of the body's real size.
    pub announced_length: Option<u64>,
    pub extra_headers: Vec<String>,
}

impl Route {
    pub fn ok(path: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.to_string(),
            status: "200 OK",
            body: body.into(),
            send_length: true,
            announced_length: None,
            extra_headers: Vec::new(),
        }
    }

    pub fn status(mut self, status: &'static str) -> Self {
        self.status = status;
        self
    }

    pub fn without_length(mut self) -> Self {
        self.send_length = false;
        self
    }

    /// Announce `len` bytes but send only the real body, then close.
    pub fn announce_length(mut self, len: u64) -> Self {
        self.announced_length = Some(len);
        self
    }

    pub fn redirect(path: &str, location: &str) -> Self {
        Self {
            path: path.to_string(),
            status: "302 Found",
            body: Vec::new(),
            send_length: true,
            announced_length: None,
            extra_headers: vec![format!("Location: {location}")],
        }
    }
}

pub struct VendorServer {
    /// Base URL with trailing slash, e.g. "http://127.0.0.1:12345/".
    pub base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl VendorServer {
    /// Starts the server in a background thread. It runs until the process exits.
    /// `routes` receives the base URL so pages can link back to the server.
    pub fn start(routes: impl FnOnce(&str) -> Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let base = format!("http://127.0.0.1:{}/", port);
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes(&base)
                .into_iter()
                .map(|r| (r.path.clone(), r))
                .collect(),
        );
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let hits_srv = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&hits_srv);
                thread::spawn(move || handle(stream, &routes, &hits));
            }
        });
        Self { base, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, hits: &Mutex<HashMap<String, usize>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let route = match routes.get(&path) {
        Some(r) => r,
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
            );
            return;
        }
    };

    let mut head = format!("HTTP/1.1 {}\r\nConnection: close\r\n", route.status);
    if route.send_length {
        let len = route.announced_length.unwrap_or(route.body.len() as u64);
        head.push_str(&format!("Content-Length: {}\r\n", len));
    }
    for h in &route.extra_headers {
        head.push_str(h);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&route.body);
    let _ = stream.flush();
}
