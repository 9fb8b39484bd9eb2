use serde_json::de::IoRead;
use serde_json::{StreamDeserializer, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to open application records: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed application JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Streams application documents from a JSON array, newline-delimited JSON, or
/// concatenated JSON values. Top-level arrays are flattened one level.
///
/// After the first syntax error the stream yields that error once and then ends.
pub struct RecordStream<R: Read> {
    values: StreamDeserializer<'static, IoRead<R>, Value>,
    pending: std::vec::IntoIter<Value>,
    failed: bool,
}

impl<R: Read> RecordStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            values: serde_json::Deserializer::from_reader(reader).into_iter::<Value>(),
            pending: Vec::new().into_iter(),
            failed: false,
        }
    }
}

impl RecordStream<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<Value, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.pending.next() {
                return Some(Ok(value));
            }
            if self.failed {
                return None;
            }

            match self.values.next()? {
                Ok(Value::Array(items)) => self.pending = items.into_iter(),
                Ok(value) => return Some(Ok(value)),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err.into()));
                }
            }
        }
    }
}

pub fn read_records<R: Read>(reader: R) -> RecordStream<R> {
    RecordStream::new(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_top_level_array() {
        let input = r#"[{"status": "Approved"}, {"status": "Declined"}]"#;
        let values: Vec<Value> = read_records(input.as_bytes())
            .collect::<Result<_, _>>()
            .expect("valid json");
        assert_eq!(values.len(), 2);
        assert_eq!(values[1]["status"], "Declined");
    }

    #[test]
    fn reads_newline_delimited_values() {
        let input = "{\"a\": 1}\n{\"a\": 2}\n\n\"loose\"\n";
        let values: Vec<Value> = read_records(input.as_bytes())
            .collect::<Result<_, _>>()
            .expect("valid json");
        assert_eq!(values.len(), 3);
        assert!(values[2].is_string());
    }

    #[test]
    fn stops_after_first_syntax_error() {
        let input = "{\"a\": 1}\n{\"a\": \n{\"a\": 3}\n";
        let results: Vec<Result<Value, SourceError>> = read_records(input.as_bytes()).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SourceError::Json(_))));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(read_records("  \n".as_bytes()).count(), 0);
    }
}
