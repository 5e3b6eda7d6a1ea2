//! Transcript files: one plain-text record per invocation.

use scrivener_core::error::{Error, Result};
use scrivener_core::mode::AgentMode;
use scrivener_core::sources::FileSources;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Rule line separating transcript sections.
pub const RULE: &str =
    "____________________________________________________________________________________";

/// Everything one invocation records.
#[derive(Debug, Clone)]
pub struct Transcript<'a> {
    pub service: &'a str,
    pub mode: AgentMode,
    pub timestamp: i64,
    pub input_prompt: &'a str,
    pub answer: &'a str,
    pub system_prompt: &'a str,
    pub final_prompt: &'a str,
}

impl Transcript<'_> {
    pub fn render(&self) -> String {
        format!(
            "AI Model Used: {service}, Mode: {mode}, Timestamp: {ts}\n\
             {RULE}\n\
             Input Prompt: \n\
             {input}\n\
             {RULE}\n\
             LLM Output: \n\
             {answer}\n\
             {RULE}\n\
             System Prompt: \n\
             {system}\n\
             {RULE}\n\
             Final Prompt: \n\
             {final_prompt}\n",
            service = self.service,
            mode = self.mode,
            ts = self.timestamp,
            input = self.input_prompt,
            answer = self.answer,
            system = self.system_prompt,
            final_prompt = self.final_prompt,
        )
    }

    /// Write to `{data_folder}/{name}.txt`, or `{timestamp}.txt` when `name`
    /// is empty. Overwrites any existing file.
    pub async fn write(&self, sources: &FileSources, name: &str) -> Result<PathBuf> {
        check_output_name(name)?;
        let stem = if name.is_empty() {
            self.timestamp.to_string()
        } else {
            name.to_string()
        };
        let path = sources.transcript_path(&stem);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }
        tokio::fs::write(&path, self.render())
            .await
            .map_err(|e| Error::io(&path, e))?;

        info!(path = %path.display(), "Wrote log file");
        Ok(path)
    }
}

/// Reject transcript names that would land outside the data folder.
///
/// Subdirectories are allowed; `..`, absolute paths and drive prefixes are not.
pub fn check_output_name(name: &str) -> Result<()> {
    let escapes = Path::new(name)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::InvalidOutputName(name.to_string()));
    }
    Ok(())
}
