//! Append-only JSON-lines submission log.
//!
//! Anonymized submission records land in a local file, one JSON object
//! per line. Writes are serialized through a mutex; records carry no
//! identity or free text (see [`crate::traits::SubmissionRecord`]).

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;

use docent_domain::error::{Error, Result};

use crate::traits::{SubmissionLog, SubmissionRecord};

pub struct JsonlSubmissionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlSubmissionLog {
    /// Open (or create) the log at `path`, creating parent directories.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(Error::Io)?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl SubmissionLog for JsonlSubmissionLog {
    async fn append(&self, record: SubmissionRecord) -> Result<String> {
        let line = serde_json::to_string(&record)?;

        let _guard = self.write_lock.lock();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(Error::Io)?;
        writeln!(file, "{line}").map_err(Error::Io)?;

        Ok("submission logged".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_one_line_per_record() {
        let dir = std::env::temp_dir().join(format!("docent-sub-{}", uuid::Uuid::new_v4()));
        let path = dir.join("submissions.jsonl");
        let log = JsonlSubmissionLog::new(&path).unwrap();

        log.append(SubmissionRecord::new("feedback", 120)).await.unwrap();
        log.append(SubmissionRecord::new("other", 48)).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: SubmissionRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.category, "feedback");
        assert_eq!(first.content_chars, 120);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn records_never_carry_free_text() {
        // Compile-time shape check made explicit: serializing a record
        // yields exactly the anonymized fields.
        let json = serde_json::to_value(SubmissionRecord::new("feedback", 10)).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["category", "content_chars", "received_at"]);
    }
}
