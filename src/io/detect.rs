//! Input shape detection.
//!
//! Location-history exports come in three shapes:
//! - NDJSON: one JSON object per line
//! - a single top-level JSON array of objects
//! - a single JSON object with the record array under a named key
//!
//! The sniff is a first-character (or first-key) decision made once per run
//! and is irrevocable: the input stream is not assumed seekable, so there is
//! no mid-stream reparse on a wrong guess. Bytes consumed while sniffing are
//! handed to the reader (`prefix`, `line_offset`) so nothing is lost.

use crate::error::{Result, SiftError};
use std::io::BufRead;

/// The detected input shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// One JSON object per line.
    Ndjson,
    /// Top-level JSON array; the stream is positioned just inside the `[`.
    Array,
    /// Array nested under a named key; the stream is positioned just inside
    /// that array's `[`.
    KeyedArray,
}

/// A stream that has been sniffed, plus the state the reader needs to pick
/// up exactly where detection left off.
#[derive(Debug)]
pub struct DetectedInput<R> {
    pub shape: InputShape,
    pub(crate) inner: R,
    /// Bytes consumed during the sniff that belong to the first record
    /// (the `{` opener in NDJSON mode).
    pub(crate) prefix: Vec<u8>,
    /// Newlines consumed during the sniff; line numbers reported by the
    /// reader start after these.
    pub(crate) line_offset: u64,
}

/// Sniff the input shape.
///
/// With a `records_key`, scans forward over a sliding window until the
/// quoted key text is found, then to the next `[`. Otherwise the first
/// non-whitespace character decides: `[` means array mode, `{` means NDJSON.
///
/// # Errors
/// [`SiftError::Format`] on an empty input, an unrecognized leading
/// character, or end-of-stream before the records key (or its array) is
/// found.
pub fn detect<R: BufRead>(mut inner: R, records_key: Option<&str>) -> Result<DetectedInput<R>> {
    if let Some(key) = records_key {
        seek_keyed_array(&mut inner, key)?;
        return Ok(DetectedInput {
            shape: InputShape::KeyedArray,
            inner,
            prefix: Vec::new(),
            line_offset: 0,
        });
    }

    let mut line_offset = 0u64;
    loop {
        let Some(b) = next_byte(&mut inner)? else {
            return Err(SiftError::Format("empty input".into()));
        };
        if b == b'\n' {
            line_offset += 1;
            continue;
        }
        if b.is_ascii_whitespace() {
            continue;
        }
        return match b {
            b'[' => Ok(DetectedInput {
                shape: InputShape::Array,
                inner,
                prefix: Vec::new(),
                line_offset,
            }),
            b'{' => Ok(DetectedInput {
                shape: InputShape::Ndjson,
                inner,
                prefix: vec![b'{'],
                line_offset,
            }),
            other => Err(SiftError::Format(format!(
                "expected NDJSON, a top-level array, or a records key; input starts with {:?}",
                other as char
            ))),
        };
    }
}

/// Scan forward to the array under `"key"`, leaving the stream just inside
/// its `[`.
fn seek_keyed_array<R: BufRead>(inner: &mut R, key: &str) -> Result<()> {
    let needle = format!("\"{key}\"").into_bytes();
    let cap = needle.len().max(1024);
    let mut window: Vec<u8> = Vec::with_capacity(cap);

    loop {
        let Some(b) = next_byte(inner)? else {
            return Err(SiftError::Format(format!(
                "records key \"{key}\" not found in input"
            )));
        };
        window.push(b);
        if window.len() > cap {
            window.drain(..window.len() - cap);
        }
        if window.len() >= needle.len() && window[window.len() - needle.len()..] == needle[..] {
            break;
        }
    }

    loop {
        match next_byte(inner)? {
            Some(b'[') => return Ok(()),
            Some(_) => continue,
            None => {
                return Err(SiftError::Format(format!(
                    "found records key \"{key}\" but no '[' starting its array"
                )))
            }
        }
    }
}

pub(crate) fn next_byte<R: BufRead>(inner: &mut R) -> std::io::Result<Option<u8>> {
    let buf = inner.fill_buf()?;
    if buf.is_empty() {
        return Ok(None);
    }
    let b = buf[0];
    inner.consume(1);
    Ok(Some(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn array_input_detected() {
        let d = detect(Cursor::new(b"  [ {\"a\":1} ]".to_vec()), None).unwrap();
        assert_eq!(d.shape, InputShape::Array);
    }

    #[test]
    fn ndjson_input_detected_with_prefix() {
        let d = detect(Cursor::new(b"{\"a\":1}\n".to_vec()), None).unwrap();
        assert_eq!(d.shape, InputShape::Ndjson);
        assert_eq!(d.prefix, b"{");
    }

    #[test]
    fn leading_blank_lines_counted() {
        let d = detect(Cursor::new(b"\n\n{\"a\":1}\n".to_vec()), None).unwrap();
        assert_eq!(d.line_offset, 2);
    }

    #[test]
    fn scalar_input_rejected() {
        let err = detect(Cursor::new(b"42".to_vec()), None).unwrap_err();
        assert!(matches!(err, SiftError::Format(_)));
    }

    #[test]
    fn empty_input_rejected() {
        let err = detect(Cursor::new(Vec::new()), None).unwrap_err();
        assert!(matches!(err, SiftError::Format(_)));
    }

    #[test]
    fn keyed_array_positions_inside_bracket() {
        let mut d = detect(
            Cursor::new(b"{\"meta\":1,\"items\": [{\"a\":1}]}".to_vec()),
            Some("items"),
        )
        .unwrap();
        assert_eq!(d.shape, InputShape::KeyedArray);
        // next non-space byte is the first record's opening brace
        assert_eq!(next_byte(&mut d.inner).unwrap(), Some(b'{'));
    }

    #[test]
    fn missing_records_key_is_format_error() {
        let err = detect(Cursor::new(b"{\"other\":[]}".to_vec()), Some("items")).unwrap_err();
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn key_without_array_is_format_error() {
        let err = detect(Cursor::new(b"{\"items\": 3}".to_vec()), Some("items")).unwrap_err();
        assert!(matches!(err, SiftError::Format(_)));
    }
}
