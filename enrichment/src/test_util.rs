//! Loopback http server for exercising the reqwest backed sources.
//!
//! Routes are matched on the path alone; anything unrouted gets a 404. Every
//! request head is recorded so tests can check what was actually sent.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

const MAX_HEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct StubResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
    delay: Option<Duration>,
}

impl StubResponse {
    pub fn ok(body: impl Into<String>) -> StubResponse {
        StubResponse::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> StubResponse {
        StubResponse {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: None,
        }
    }

    pub fn redirect(location: &str) -> StubResponse {
        StubResponse::status(302, "").header("location", location)
    }

    pub fn header(mut self, name: &str, value: &str) -> StubResponse {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Hold the response back for `delay` after the request arrives.
    pub fn delayed(mut self, delay: Duration) -> StubResponse {
        self.delay = Some(delay);
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\ncontent-length: {}\r\nconnection: close\r\n",
            self.status,
            reason(self.status),
            self.body.len()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");
        let mut out = head.into_bytes();
        out.extend_from_slice(self.body.as_bytes());
        out
    }
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

/// Request line and headers of one request the server received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string, as sent.
    pub target: String,
    headers: Vec<(String, String)>,
}

impl RecordedRequest {
    fn parse(head: &str) -> Option<RecordedRequest> {
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next()?.split_whitespace();
        let method = request_line.next()?.to_owned();
        let target = request_line.next()?.to_owned();
        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_lowercase(), value.trim().to_owned()))
            .collect();
        Some(RecordedRequest {
            method,
            target,
            headers,
        })
    }

    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Decoded query parameters, in the order they were sent.
    pub fn query(&self) -> Vec<(String, String)> {
        match self.target.split_once('?') {
            Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query()
            .into_iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find_map(|(k, v)| (*k == name).then_some(v.as_str()))
    }
}

type Routes = Arc<HashMap<String, StubResponse>>;
type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

pub struct StubServer {
    addr: SocketAddr,
    requests: Recorded,
    accept: JoinHandle<()>,
}

impl StubServer {
    /// Bind to an ephemeral loopback port and start serving `routes`.
    pub async fn start<'a>(
        routes: impl IntoIterator<Item = (&'a str, StubResponse)>,
    ) -> std::io::Result<StubServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let routes: Routes = Arc::new(
            routes
                .into_iter()
                .map(|(path, resp)| (path.to_owned(), resp))
                .collect(),
        );
        let requests = Recorded::default();

        let accept = tokio::spawn({
            let requests = requests.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, routes.clone(), requests.clone()));
                }
            }
        });

        Ok(StubServer {
            addr,
            requests,
            accept,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.accept.abort();
    }
}

async fn read_head(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") && buf.len() < MAX_HEAD_BYTES {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn serve(mut stream: TcpStream, routes: Routes, requests: Recorded) {
    let head = match read_head(&mut stream).await {
        Ok(head) => head,
        Err(e) => {
            log::debug!("stub server read failed: {}", e);
            return;
        }
    };
    let Some(request) = RecordedRequest::parse(&head) else {
        return;
    };

    let response = routes
        .get(request.path())
        .cloned()
        .unwrap_or_else(|| StubResponse::status(404, "not found"));
    if let Ok(mut recorded) = requests.lock() {
        recorded.push(request);
    }

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }
    if let Err(e) = stream.write_all(&response.encode()).await {
        log::debug!("stub server write failed: {}", e);
    }
    let _ = stream.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_head() {
        let req = RecordedRequest::parse(
            "GET /api/appdetails?appids=292030&l=en HTTP/1.1\r\nHost: x\r\nUser-Agent: Test\r\n\r\n",
        )
        .unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path(), "/api/appdetails");
        assert_eq!(req.query_param("appids").as_deref(), Some("292030"));
        assert_eq!(req.query_param("cc"), None);
        assert_eq!(req.header("user-agent"), Some("Test"));
        assert_eq!(req.header("USER-AGENT"), Some("Test"));
    }

    #[test]
    fn encodes_status_headers_and_body() {
        let raw = StubResponse::redirect("/new").encode();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.starts_with("HTTP/1.1 302 Found\r\n"));
        assert!(text.contains("location: /new\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
