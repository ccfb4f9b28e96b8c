//! Minimal HTTP/1.1 server for integration tests.
//!
//! Each path is mapped to a canned response (status, body, optional header
//! overrides). Unknown paths get 404. Every request path is recorded so tests
//! can assert the order in which mirrors were tried.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Content-Length sent instead of the real body length (short-body tests).
    pub declared_len: Option<usize>,
    /// Send no Content-Length and close the connection after the body.
    pub omit_length: bool,
    /// `Location` header for redirects.
    pub location: Option<String>,
    /// Send the body in this many pieces, sleeping before each one.
    pub pace: Option<(usize, Duration)>,
}

impl Route {
    pub fn ok(body: Vec<u8>) -> Self {
        Route {
            status: 200,
            body,
            declared_len: None,
            omit_length: false,
            location: None,
            pace: None,
        }
    }

    /// 200 whose body trickles out in `chunks` pieces `delay` apart.
    pub fn paced(body: Vec<u8>, chunks: usize, delay: Duration) -> Self {
        Route {
            pace: Some((chunks.max(1), delay)),
            ..Route::ok(body)
        }
    }

    pub fn status(status: u16) -> Self {
        Route {
            status,
            body: format!("error {}", status).into_bytes(),
            ..Route::ok(Vec::new())
        }
    }

    pub fn redirect(location: &str) -> Self {
        Route {
            status: 302,
            location: Some(location.to_string()),
            ..Route::ok(Vec::new())
        }
    }
}

pub struct MirrorServer {
    pub base: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl MirrorServer {
    /// `http://127.0.0.1:<port><path>`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Paths requested so far, in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

/// Serve `routes` on an ephemeral port from a background thread until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> MirrorServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> =
        Arc::new(routes.into_iter().map(|(p, r)| (p.to_string(), r)).collect());
    let hits = Arc::new(Mutex::new(Vec::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    MirrorServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, hits: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    hits.lock().unwrap().push(path.clone());

    let route = routes.get(&path).cloned().unwrap_or_else(|| Route::status(404));
    let mut head = format!("HTTP/1.1 {} {}\r\n", route.status, reason(route.status));
    if let Some(loc) = &route.location {
        head.push_str(&format!("Location: {}\r\n", loc));
    }
    if !route.omit_length {
        let len = route.declared_len.unwrap_or(route.body.len());
        head.push_str(&format!("Content-Length: {}\r\n", len));
    }
    head.push_str("Connection: close\r\n\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.flush();
    match route.pace {
        None => {
            let _ = stream.write_all(&route.body);
        }
        Some((chunks, delay)) => {
            let size = route.body.len().div_ceil(chunks).max(1);
            for piece in route.body.chunks(size) {
                thread::sleep(delay);
                if stream.write_all(piece).and_then(|_| stream.flush()).is_err() {
                    return;
                }
            }
        }
    }
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
