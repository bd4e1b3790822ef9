//! Incremental subset writer.
//!
//! Emits a syntactically valid JSON array one kept record at a time,
//! buffering at most one record. Output shape is always `[`, newline, kept
//! records separated by `,\n`, then `\n]\n` — regardless of the input shape.
//!
//! If a run fails after writing has begun, the partial output is left as-is
//! (no closing bracket); it is not silently repaired.

use crate::error::Result;
use crate::io::reader::Record;
use std::io::Write;

/// Streaming JSON-array writer for kept records.
pub struct SubsetWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> SubsetWriter<W> {
    /// Start the array: writes the opening `[`.
    ///
    /// # Errors
    /// Returns an error if the opener cannot be written.
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(b"[\n")?;
        Ok(Self { out, written: 0 })
    }

    /// Append one kept record, verbatim in canonical `serde_json` encoding.
    ///
    /// # Errors
    /// Returns an error if the separator or record cannot be written.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.written > 0 {
            self.out.write_all(b",\n")?;
        }
        serde_json::to_writer(&mut self.out, record).map_err(std::io::Error::from)?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Close the array and flush, returning the underlying writer.
    ///
    /// # Errors
    /// Returns an error if the closer cannot be written or the flush fails.
    pub fn finish(mut self) -> Result<W> {
        self.out.write_all(b"\n]\n")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> Record {
        match v {
            serde_json::Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn empty_subset_is_valid_array() {
        let w = SubsetWriter::new(Vec::new()).unwrap();
        let out = w.finish().unwrap();
        let parsed: Vec<Record> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn separators_only_between_records() {
        let mut w = SubsetWriter::new(Vec::new()).unwrap();
        w.write_record(&record(json!({"a":1}))).unwrap();
        w.write_record(&record(json!({"b":2}))).unwrap();
        assert_eq!(w.written(), 2);
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(out, "[\n{\"a\":1},\n{\"b\":2}\n]\n");
    }

    #[test]
    fn field_order_survives_round_trip() {
        let src = r#"{"z":1,"a":{"q":2,"b":3},"m":[1,2]}"#;
        let rec: Record = serde_json::from_str(src).unwrap();
        let mut w = SubsetWriter::new(Vec::new()).unwrap();
        w.write_record(&rec).unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert!(out.contains(src));
    }
}
