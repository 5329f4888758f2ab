//! Header-line lookup over a raw HTTP head.

/// Header-block terminator.
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// CRLF line terminator.
pub const CRLF: &[u8] = b"\r\n";

/// Find the value of the first header line starting with `name`
/// (including its colon, e.g. `b"Host:"`), compared case-insensitively.
///
/// `head` is searched from the line after the start line. Matching is
/// anchored to line starts, so `X-Forwarded-Host:` never matches `Host:`.
/// The returned value is the raw text after the colon, untrimmed, without
/// the line terminator.
pub fn find_header<'a>(head: &'a [u8], name: &[u8]) -> Option<&'a [u8]> {
    header_lines(head).find_map(|line| {
        if line.len() >= name.len() && line[..name.len()].eq_ignore_ascii_case(name) {
            Some(&line[name.len()..])
        } else {
            None
        }
    })
}

/// Header lines after the start line, stopping at the blank line.
/// Each item has its `\r\n` (or bare `\n`) stripped.
pub fn header_lines(head: &[u8]) -> impl Iterator<Item = &[u8]> {
    head.split(|&b| b == b'\n')
        .skip(1)
        .map(strip_cr)
        .take_while(|line| !line.is_empty())
}

/// Strip leading and trailing spaces and tabs.
pub fn trim_ows(value: &[u8]) -> &[u8] {
    let start = value
        .iter()
        .position(|b| !is_ows(*b))
        .unwrap_or(value.len());
    let end = value
        .iter()
        .rposition(|b| !is_ows(*b))
        .map_or(start, |idx| idx + 1);
    &value[start..end]
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_ows(b: u8) -> bool {
    b == b' ' || b == b'\t'
}
