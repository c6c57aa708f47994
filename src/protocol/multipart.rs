//! Multipart form parsing
//!
//! Minimal multipart/form-data reader for the upload endpoint: splits the
//! body on the boundary, reads each part's Content-Disposition, and keeps
//! text fields plus at most one uploaded file.

use std::collections::HashMap;

use crate::error::ProtocolError;

/// The uploaded file of a multipart form
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parsed multipart form: text fields plus the file part, if any
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

/// Extract the boundary token from a multipart Content-Type header
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    if !content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return None;
    }

    content_type.split(';').find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        if key.eq_ignore_ascii_case("boundary") {
            Some(value.trim_matches('"').to_string())
        } else {
            None
        }
    })
}

/// Parse a multipart/form-data body
pub fn parse_multipart(body: &[u8], boundary: &str) -> Result<MultipartForm, ProtocolError> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut form = MultipartForm::default();

    let mut pos = find(body, &delimiter, 0)
        .ok_or_else(|| ProtocolError::MalformedMultipart("boundary not found".into()))?
        + delimiter.len();

    loop {
        if body[pos..].starts_with(b"--") {
            break; // closing delimiter
        }
        if body[pos..].starts_with(b"\r\n") {
            pos += 2;
        }

        let header_end = find(body, b"\r\n\r\n", pos)
            .ok_or_else(|| ProtocolError::MalformedMultipart("part headers unterminated".into()))?;
        let headers = String::from_utf8_lossy(&body[pos..header_end]).to_string();

        let content_start = header_end + 4;
        let next_delimiter = find(body, &delimiter, content_start)
            .ok_or_else(|| ProtocolError::MalformedMultipart("part unterminated".into()))?;

        // Content ends before the CRLF that precedes the next delimiter
        let content_end = next_delimiter.saturating_sub(2).max(content_start);
        let content = &body[content_start..content_end];

        let (name, filename) = parse_content_disposition(&headers);

        match (name, filename) {
            (Some(_), Some(filename)) => {
                form.file = Some(UploadedFile {
                    filename,
                    data: content.to_vec(),
                });
            }
            (Some(name), None) => {
                form.fields
                    .insert(name, String::from_utf8_lossy(content).to_string());
            }
            _ => {}
        }

        pos = next_delimiter + delimiter.len();
    }

    Ok(form)
}

/// Pull name= and filename= out of a part's Content-Disposition header
fn parse_content_disposition(headers: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut filename = None;

    for line in headers.lines() {
        let Some((header, value)) = line.split_once(':') else {
            continue;
        };
        if !header.trim().eq_ignore_ascii_case("content-disposition") {
            continue;
        }
        for param in value.split(';') {
            let Some((key, raw)) = param.trim().split_once('=') else {
                continue;
            };
            let unquoted = raw.trim().trim_matches('"').to_string();
            match key.trim() {
                "name" => name = Some(unquoted),
                "filename" => filename = Some(unquoted),
                _ => {}
            }
        }
    }

    (name, filename)
}

/// First occurrence of `needle` in `haystack` at or after `from`
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form(boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\n\
                 Content-Disposition: form-data; name=\"path\"\r\n\r\n\
                 LibraryFolder/uploads\r\n\
                 --{b}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"scan.pdf\"\r\n\
                 Content-Type: application/pdf\r\n\r\n",
                b = boundary
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"%PDF-1.4\x00\x01binary");
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        body
    }

    #[test]
    fn boundary_extraction() {
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=----xyz"),
            Some("----xyz".to_string())
        );
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=\"quoted\""),
            Some("quoted".to_string())
        );
        assert_eq!(boundary_from_content_type("application/json"), None);
    }

    #[test]
    fn parses_fields_and_file() {
        let body = sample_form("XBOUND");
        let form = parse_multipart(&body, "XBOUND").unwrap();

        assert_eq!(
            form.fields.get("path").map(String::as_str),
            Some("LibraryFolder/uploads")
        );
        let file = form.file.unwrap();
        assert_eq!(file.filename, "scan.pdf");
        assert_eq!(file.data, b"%PDF-1.4\x00\x01binary");
    }

    #[test]
    fn form_without_file_part() {
        let body = b"--B\r\nContent-Disposition: form-data; name=\"path\"\r\n\r\nx\r\n--B--\r\n";
        let form = parse_multipart(body, "B").unwrap();
        assert!(form.file.is_none());
        assert_eq!(form.fields.get("path").map(String::as_str), Some("x"));
    }

    #[test]
    fn garbage_body_is_an_error() {
        let result = parse_multipart(b"no delimiters here", "B");
        assert!(result.is_err());
    }
}
