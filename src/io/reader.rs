//! Streaming record reader.
//!
//! [`RecordReader`] yields one decoded record at a time from a detected
//! input, keeping memory bounded by the largest single record rather than
//! the file size. The sequence is lazy, finite, forward-only, and
//! non-restartable; a consumer may stop pulling early (e.g. to honor a
//! kept-count limit) and the underlying stream is released by scope.
//!
//! Array mode walks the bytes with an explicit state machine
//! {outside-object, in-object(depth), in-string(escaped?)} so that braces
//! and commas inside string literals are never miscounted. This is
//! deliberately not a regex splitter.

use crate::error::{Result, SiftError};
use crate::io::detect::{next_byte, DetectedInput, InputShape};
use serde_json::Value;
use std::io::BufRead;

/// One decoded location-history entry: an order-preserving field map.
/// Decoded once, never mutated, re-emitted verbatim if kept.
pub type Record = serde_json::Map<String, Value>;

enum Mode {
    Ndjson {
        /// Bytes of the first line already consumed by detection.
        pending: Vec<u8>,
        /// 1-based number of the most recently read line.
        line: u64,
        /// Whether any non-blank line has decoded yet. A decode failure on
        /// the very first content line means the input is one big
        /// pretty-printed object, not NDJSON, and is reported as a format
        /// error pointing at the records key instead of a parse error.
        decoded_any: bool,
    },
    /// Inside an array (top-level or keyed); positioned between elements.
    Array,
}

/// Pull-based record iterator over a sniffed input stream.
pub struct RecordReader<R> {
    inner: R,
    mode: Mode,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a detected input.
    pub fn new(detected: DetectedInput<R>) -> Self {
        let DetectedInput {
            shape,
            inner,
            prefix,
            line_offset,
        } = detected;
        let mode = match shape {
            InputShape::Ndjson => Mode::Ndjson {
                pending: prefix,
                line: line_offset,
                decoded_any: false,
            },
            InputShape::Array | InputShape::KeyedArray => Mode::Array,
        };
        Self {
            inner,
            mode,
            done: false,
        }
    }

    fn next_ndjson(&mut self) -> Result<Option<Record>> {
        loop {
            let (pending, line, decoded_any) = match &mut self.mode {
                Mode::Ndjson {
                    pending,
                    line,
                    decoded_any,
                } => (pending, line, decoded_any),
                Mode::Array => unreachable!("ndjson reader in array mode"),
            };
            let mut buf = std::mem::take(pending);
            let had_prefix = !buf.is_empty();
            let n = self.inner.read_until(b'\n', &mut buf)?;
            if n == 0 && !had_prefix {
                return Ok(None);
            }
            *line += 1;
            let lineno = *line;

            let text = String::from_utf8_lossy(&buf);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let value: Value = match serde_json::from_str(text) {
                Ok(v) => v,
                Err(_) if !*decoded_any => {
                    return Err(SiftError::Format(
                        "input starts with '{' but is not valid NDJSON; if the records \
                         are nested under a key, provide that records key"
                            .into(),
                    ));
                }
                Err(e) => return Err(SiftError::parse_at(lineno, e.to_string())),
            };
            *decoded_any = true;
            match value {
                Value::Object(map) => return Ok(Some(map)),
                // Some NDJSON variants carry arrays or scalars per line;
                // those are not records.
                _ => continue,
            }
        }
    }

    fn next_array(&mut self) -> Result<Option<Record>> {
        loop {
            let Some(b) = next_byte(&mut self.inner)? else {
                // EOF between elements ends the sequence.
                return Ok(None);
            };
            match b {
                b']' => return Ok(None),
                b'{' => return self.read_object().map(Some),
                b'"' => self.skip_string()?,
                // Whitespace, commas, and any scalar token bytes between
                // elements are skipped; non-object elements are not errors.
                _ => continue,
            }
        }
    }

    /// Accumulate one `{...}` element, honoring nested braces and strings,
    /// then decode it.
    fn read_object(&mut self) -> Result<Record> {
        let mut buf = vec![b'{'];
        let mut depth = 1u32;
        let mut in_str = false;
        let mut esc = false;

        while depth > 0 {
            let Some(b) = next_byte(&mut self.inner)? else {
                return Err(SiftError::parse("truncated record: unexpected end of stream inside an object"));
            };
            buf.push(b);

            if in_str {
                if esc {
                    esc = false;
                } else if b == b'\\' {
                    esc = true;
                } else if b == b'"' {
                    in_str = false;
                }
                continue;
            }
            match b {
                b'"' => in_str = true,
                b'{' => depth += 1,
                b'}' => depth -= 1,
                _ => {}
            }
        }

        serde_json::from_slice::<Record>(&buf).map_err(|e| SiftError::parse(e.to_string()))
    }

    /// Skip a string token sitting directly between array elements.
    fn skip_string(&mut self) -> Result<()> {
        let mut esc = false;
        loop {
            let Some(b) = next_byte(&mut self.inner)? else {
                return Err(SiftError::parse("truncated record: unterminated string"));
            };
            if esc {
                esc = false;
            } else if b == b'\\' {
                esc = true;
            } else if b == b'"' {
                return Ok(());
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = match self.mode {
            Mode::Ndjson { .. } => self.next_ndjson(),
            Mode::Array => self.next_array(),
        };
        match next {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                // An error is fatal; the sequence must not resume after it.
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::detect::detect;
    use std::io::Cursor;

    fn read_all(input: &str, records_key: Option<&str>) -> Result<Vec<Record>> {
        let detected = detect(Cursor::new(input.as_bytes().to_vec()), records_key)?;
        RecordReader::new(detected).collect()
    }

    #[test]
    fn array_records_in_order() {
        let recs = read_all(r#"[{"a":1},{"b":2},{"c":3}]"#, None).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0]["a"], 1);
        assert_eq!(recs[2]["c"], 3);
    }

    #[test]
    fn braces_inside_strings_not_counted() {
        let recs = read_all(r#"[{"note":"open { and } close","x":{"y":"}}"}}]"#, None).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0]["note"], "open { and } close");
        assert_eq!(recs[0]["x"]["y"], "}}");
    }

    #[test]
    fn escaped_quote_inside_string() {
        let recs = read_all(r#"[{"q":"she said \"hi\" {"}]"#, None).unwrap();
        assert_eq!(recs[0]["q"], "she said \"hi\" {");
    }

    #[test]
    fn non_object_elements_skipped() {
        let recs = read_all(r#"[1, "str, {with brace", null, {"a":1}, true]"#, None).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0]["a"], 1);
    }

    #[test]
    fn truncated_object_is_parse_error() {
        let err = read_all(r#"[{"a": {"b": 1}"#, None).unwrap_err();
        match err {
            SiftError::Parse { line, msg } => {
                assert_eq!(line, None);
                assert!(msg.contains("truncated"));
            }
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn ndjson_records_with_blank_lines() {
        let recs = read_all("{\"a\":1}\n\n{\"b\":2}\n", None).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1]["b"], 2);
    }

    #[test]
    fn ndjson_bad_line_names_line_number() {
        let err = read_all("{\"a\":1}\n{\"b\":2}\n{oops\n", None).unwrap_err();
        match err {
            SiftError::Parse { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn pretty_printed_object_is_format_error() {
        // A keyed export read without its records key: the first content
        // line is not a complete JSON document.
        let err = read_all("{\n  \"items\": [\n    {\"a\":1}\n  ]\n}\n", None).unwrap_err();
        assert!(matches!(err, SiftError::Format(_)));
    }

    #[test]
    fn ndjson_non_object_lines_skipped() {
        // The first line must be an object for NDJSON detection to trigger;
        // later scalar/array lines are skipped.
        let recs = read_all("{\"a\":1}\n[1,2]\n{\"b\":2}\n", None).unwrap();
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn keyed_array_yields_nested_records() {
        let recs = read_all(
            r#"{"meta":{"n":2},"items":[{"a":1},{"b":2}]}"#,
            Some("items"),
        )
        .unwrap();
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn field_order_preserved() {
        let recs = read_all(r#"[{"z":1,"a":2,"m":3}]"#, None).unwrap();
        let keys: Vec<&String> = recs[0].keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn reader_matches_whole_file_decode() {
        let input = r#"[{"a":1,"nested":{"x":[1,2,{"y":"}"}]}},{"b":"two"},{"c":null}]"#;
        let streamed = read_all(input, None).unwrap();
        let whole: Vec<Record> = serde_json::from_str(input).unwrap();
        assert_eq!(streamed, whole);
    }
}
