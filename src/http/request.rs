//! Request-line and Host header parsing.
//!
//! # Responsibilities
//! - Validate the `GET <uri> HTTP/1.1` request line
//! - Extract the Host header value
//! - Extract the last header line for diagnostics
//!
//! # Design Decisions
//! - Only the framed head is parsed; body bytes are never inspected
//! - Over-long fields are rejected rather than truncated
//! - Header names are matched at line starts only

use crate::http::buffer::find_subsequence;
use crate::http::headers::{find_header, trim_ows, CRLF, HEAD_TERMINATOR};
use crate::proxy::ProxyError;

/// Longest accepted request URI, in bytes.
pub const MAX_URI_LEN: usize = 1023;

/// Longest accepted Host header value, in bytes.
pub const MAX_HOST_LEN: usize = 255;

/// Longest request tail reported in diagnostics, in bytes.
pub const MAX_TAIL_LEN: usize = 1023;

/// The parts of a request line and headers needed to route a request.
///
/// Both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub uri: String,
    pub host: String,
}

/// Parse the request line and Host header out of a framed request head.
pub fn parse_request(head: &[u8]) -> Result<ParsedRequest, ProxyError> {
    let line_end = find_subsequence(head, CRLF)
        .ok_or(ProxyError::InvalidRequestLine("no line ending"))?;
    let uri = parse_request_line(&head[..line_end])?;

    let value = find_header(head, b"Host:").ok_or(ProxyError::MissingHostHeader)?;
    let value = trim_ows(value);
    if value.is_empty() {
        return Err(ProxyError::MissingHostHeader);
    }
    if value.len() > MAX_HOST_LEN {
        return Err(ProxyError::InvalidHostHeader("longer than 255 bytes"));
    }
    let host = std::str::from_utf8(value)
        .map_err(|_| ProxyError::InvalidHostHeader("not valid UTF-8"))?
        .to_string();

    Ok(ParsedRequest { uri, host })
}

fn parse_request_line(line: &[u8]) -> Result<String, ProxyError> {
    let rest = line
        .strip_prefix(b"GET ")
        .ok_or(ProxyError::InvalidRequestLine("method is not GET"))?;
    let rest = rest
        .strip_suffix(b" HTTP/1.1")
        .ok_or(ProxyError::InvalidRequestLine("version is not HTTP/1.1"))?;

    if rest.is_empty() {
        return Err(ProxyError::InvalidRequestLine("empty request URI"));
    }
    if rest.iter().any(u8::is_ascii_whitespace) {
        return Err(ProxyError::InvalidRequestLine("request URI contains whitespace"));
    }
    if rest.len() > MAX_URI_LEN {
        return Err(ProxyError::InvalidRequestLine("request URI longer than 1023 bytes"));
    }

    std::str::from_utf8(rest)
        .map(str::to_string)
        .map_err(|_| ProxyError::InvalidRequestLine("request URI is not valid UTF-8"))
}

/// Raw bytes of the last line before the blank line, without its CRLF.
///
/// On a head with no header lines this is the request line itself.
pub fn request_tail_raw(head: &[u8]) -> Option<&[u8]> {
    let end = find_subsequence(head, HEAD_TERMINATOR)?;
    let body = &head[..end];
    let start = body
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |idx| idx + 1);
    let line = &body[start..];
    (!line.is_empty()).then_some(line)
}

/// The last header line, trailing whitespace trimmed, for diagnostics.
pub fn request_tail(head: &[u8]) -> Option<String> {
    let raw = request_tail_raw(head)?;
    let trimmed_len = raw
        .iter()
        .rposition(|&b| !matches!(b, b'\r' | b' ' | b'\t'))
        .map_or(0, |idx| idx + 1);
    let trimmed = &raw[..trimmed_len.min(MAX_TAIL_LEN)];
    Some(String::from_utf8_lossy(trimmed).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_origin_form() {
        let parsed = parse_request(b"GET /path HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
        assert_eq!(parsed.uri, "/path");
        assert_eq!(parsed.host, "example.com");
    }

    #[test]
    fn host_value_is_trimmed_and_case_insensitive() {
        let head = b"GET / HTTP/1.1\r\nAccept: */*\r\nhost:\t a.test:8080 \t\r\n\r\n";
        let parsed = parse_request(head).unwrap();
        assert_eq!(parsed.host, "a.test:8080");
    }

    #[test]
    fn rejects_other_methods_and_versions() {
        for head in [
            &b"POST / HTTP/1.1\r\nHost: a\r\n\r\n"[..],
            b"GET / HTTP/1.0\r\nHost: a\r\n\r\n",
            b"GET  HTTP/1.1\r\nHost: a\r\n\r\n",
            b"GET /a b HTTP/1.1\r\nHost: a\r\n\r\n",
            b"get / HTTP/1.1\r\nHost: a\r\n\r\n",
        ] {
            let err = parse_request(head).unwrap_err();
            assert!(
                matches!(err, ProxyError::InvalidRequestLine(_)),
                "{:?} gave {err:?}",
                String::from_utf8_lossy(head)
            );
        }
    }

    #[test]
    fn rejects_head_without_crlf() {
        let err = parse_request(b"GET / HTTP/1.1\n\n").unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequestLine("no line ending")));
    }

    #[test]
    fn uri_length_limit() {
        let ok = format!("GET /{} HTTP/1.1\r\nHost: a\r\n\r\n", "a".repeat(MAX_URI_LEN - 1));
        assert_eq!(parse_request(ok.as_bytes()).unwrap().uri.len(), MAX_URI_LEN);

        let long = format!("GET /{} HTTP/1.1\r\nHost: a\r\n\r\n", "a".repeat(MAX_URI_LEN));
        assert!(matches!(
            parse_request(long.as_bytes()),
            Err(ProxyError::InvalidRequestLine(_))
        ));
    }

    #[test]
    fn missing_or_empty_host() {
        let err = parse_request(b"GET / HTTP/1.1\r\nAccept: */*\r\n\r\n").unwrap_err();
        assert!(matches!(err, ProxyError::MissingHostHeader));

        let err = parse_request(b"GET / HTTP/1.1\r\nHost:  \r\n\r\n").unwrap_err();
        assert!(matches!(err, ProxyError::MissingHostHeader));
    }

    #[test]
    fn host_token_inside_other_header_is_not_host() {
        let err = parse_request(b"GET / HTTP/1.1\r\nX-Original-Host: a.test\r\n\r\n").unwrap_err();
        assert!(matches!(err, ProxyError::MissingHostHeader));
    }

    #[test]
    fn over_long_host_is_rejected() {
        let head = format!("GET / HTTP/1.1\r\nHost: {}\r\n\r\n", "h".repeat(MAX_HOST_LEN + 1));
        assert!(matches!(
            parse_request(head.as_bytes()),
            Err(ProxyError::InvalidHostHeader(_))
        ));
    }

    #[test]
    fn tail_is_last_header_line() {
        let head = b"GET /index.html HTTP/1.1\r\nHost: a.test\r\nUser-Agent: t \t\r\n\r\n";
        assert_eq!(request_tail(head).as_deref(), Some("User-Agent: t"));
        assert_eq!(request_tail_raw(head), Some(&b"User-Agent: t \t"[..]));
    }

    #[test]
    fn tail_of_head_without_headers_is_request_line() {
        assert_eq!(request_tail(b"GET / HTTP/1.1\r\n\r\n").as_deref(), Some("GET / HTTP/1.1"));
    }
}
