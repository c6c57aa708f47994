//! HTTP request parsing
//!
//! Reads one HTTP/1.1 request from a buffered stream: request line,
//! headers, query string, and a Content-Length-delimited body. Line and
//! header counts are bounded; the body bound comes from the upload cap.

use std::collections::HashMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::ProtocolError;

const MAX_LINE_LENGTH: usize = 8192;
const MAX_HEADERS: usize = 100;

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
    Other,
}

impl Method {
    fn parse(raw: &str) -> Self {
        match raw {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "OPTIONS" => Method::Options,
            _ => Method::Other,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Options => "OPTIONS",
            Method::Other => "OTHER",
        };
        write!(f, "{}", name)
    }
}

/// One parsed HTTP request
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// Query parameter by name
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|v| v.as_str())
    }
}

/// Reads one request from the stream
pub async fn read_request<R>(reader: &mut R, max_body_bytes: u64) -> Result<Request, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let request_line = read_line_bounded(reader).await?;
    let mut parts = request_line.split_whitespace();

    let method = Method::parse(parts.next().unwrap_or(""));
    let target = parts
        .next()
        .ok_or_else(|| ProtocolError::MalformedRequest("missing request target".into()))?;

    let (raw_path, raw_query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let path = percent_decode(raw_path);
    let query = raw_query.map(parse_query).unwrap_or_default();

    let mut headers = HashMap::new();
    loop {
        let line = read_line_bounded(reader).await?;
        if line.is_empty() {
            break;
        }
        if headers.len() >= MAX_HEADERS {
            return Err(ProtocolError::MalformedRequest("too many headers".into()));
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let content_length: u64 = headers
        .get("content-length")
        .map(|v| {
            v.parse()
                .map_err(|_| ProtocolError::MalformedRequest("bad Content-Length".into()))
        })
        .transpose()?
        .unwrap_or(0);

    if content_length > max_body_bytes {
        return Err(ProtocolError::BodyTooLarge(max_body_bytes / (1024 * 1024)));
    }

    let mut body = vec![0u8; content_length as usize];
    if content_length > 0 {
        reader
            .read_exact(&mut body)
            .await
            .map_err(|e| ProtocolError::MalformedRequest(format!("short body: {}", e)))?;
    }

    Ok(Request {
        method,
        path,
        query,
        headers,
        body,
    })
}

/// Read one CRLF-terminated line, enforcing the length bound
async fn read_line_bounded<R>(reader: &mut R) -> Result<String, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .await
        .map_err(|e| ProtocolError::MalformedRequest(format!("read failed: {}", e)))?;

    if n == 0 {
        return Err(ProtocolError::MalformedRequest("connection closed".into()));
    }
    if line.len() > MAX_LINE_LENGTH {
        return Err(ProtocolError::MalformedRequest("line too long".into()));
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Parse a query string into decoded key/value pairs
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(
            percent_decode(&key.replace('+', " ")),
            percent_decode(&value.replace('+', " ")),
        );
    }
    params
}

/// Decode %XX escapes; malformed escapes pass through verbatim
pub fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(byte) = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn parses_request_line_and_query() {
        let raw = b"GET /api/list?path=LibraryFolder%2Fsub HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let mut reader = BufReader::new(&raw[..]);

        let request = read_request(&mut reader, 1024).await.unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/api/list");
        assert_eq!(request.query_param("path"), Some("LibraryFolder/sub"));
        assert_eq!(request.header("host"), Some("localhost"));
    }

    #[tokio::test]
    async fn reads_body_by_content_length() {
        let raw = b"POST /api/delete HTTP/1.1\r\nContent-Length: 8\r\n\r\n{\"a\":1}x";
        let mut reader = BufReader::new(&raw[..]);

        let request = read_request(&mut reader, 1024).await.unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, b"{\"a\":1}x");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_up_front() {
        let raw = b"POST /api/upload HTTP/1.1\r\nContent-Length: 99999999\r\n\r\n";
        let mut reader = BufReader::new(&raw[..]);

        let result = read_request(&mut reader, 1024).await;
        assert!(matches!(result, Err(ProtocolError::BodyTooLarge(_))));
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("50%"), "50%");
    }

    #[test]
    fn query_plus_means_space() {
        let params = parse_query("path=My+Notes%2Ftodo.txt");
        assert_eq!(params.get("path").map(String::as_str), Some("My Notes/todo.txt"));
    }
}
