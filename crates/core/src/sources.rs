//! File sources: where a request reads code from and writes logs to.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Well-known file in the data folder consulted during dry runs.
pub const DRY_RUN_ANSWER_FILE: &str = "dry-run-answer.txt";

/// The input root and output/log directory for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSources {
    /// Root of the source tree the tools may read and edit.
    pub source_folder: PathBuf,

    /// Directory that receives transcripts (and holds the dry-run answer).
    pub data_folder: PathBuf,
}

impl FileSources {
    pub fn new(source_folder: impl Into<PathBuf>, data_folder: impl Into<PathBuf>) -> Self {
        Self {
            source_folder: source_folder.into(),
            data_folder: data_folder.into(),
        }
    }

    /// Path of the transcript for the given file stem.
    pub fn transcript_path(&self, name: &str) -> PathBuf {
        self.data_folder.join(format!("{name}.txt"))
    }

    pub fn dry_run_answer_path(&self) -> PathBuf {
        self.data_folder.join(DRY_RUN_ANSWER_FILE)
    }
}
