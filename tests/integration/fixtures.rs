//! Shared test fixtures: task builders and a one-shot loopback HTTP stub.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use chrono::NaiveDate;
use triage::core::task::{ScoredTask, Task};

pub fn task(id: &str, deps: &[&str]) -> Task {
    Task {
        id: id.to_string(),
        title: id.to_string(),
        due_date: None,
        estimated_hours: 1.0,
        importance: 5,
        dependencies: deps.iter().map(|d| d.to_string()).collect(),
    }
}

pub fn scored(
    id: &str,
    due_date: Option<NaiveDate>,
    importance: i64,
    score: f64,
    deps: &[&str],
) -> ScoredTask {
    ScoredTask {
        task: Task {
            id: id.to_string(),
            title: id.to_string(),
            due_date,
            estimated_hours: 1.0,
            importance,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        },
        score,
        reason: format!("score {:.2} for {}", score, id),
    }
}

/// A single-request HTTP stub bound to a loopback port. Serves one canned
/// response, then hands the raw request head back to the test.
pub struct StubServer {
    pub endpoint: String,
    handle: thread::JoinHandle<String>,
}

impl StubServer {
    pub fn spawn(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let endpoint = format!("http://{}", listener.local_addr().expect("local addr"));

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = read_request(&mut stream);

            let reason = match status {
                200 => "OK",
                400 => "Bad Request",
                500 => "Internal Server Error",
                _ => "Status",
            };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).expect("write response");
            request
        });

        Self { endpoint, handle }
    }

    /// Wait for the stub to serve its request and return what it received.
    pub fn finish(self) -> String {
        self.handle.join().expect("stub thread")
    }
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).expect("read request");
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(header_end) = find_header_end(&data) {
            let head = String::from_utf8_lossy(&data[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| l.to_lowercase().strip_prefix("content-length:").map(str::to_string))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

/// An endpoint with nothing listening: binds a port, drops the listener,
/// and returns the now-dead address.
pub fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let endpoint = format!("http://{}", listener.local_addr().expect("local addr"));
    drop(listener);
    endpoint
}
