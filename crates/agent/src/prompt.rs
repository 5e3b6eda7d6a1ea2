//! System prompt assembly.
//!
//! The system prompt is a Markdown template read from disk, optionally
//! followed by a block of user-supplied general instructions.

use scrivener_core::error::{Error, Result};
use std::path::PathBuf;

/// Separator placed between the template and user instructions.
const GENERAL_INSTRUCTIONS_HEADER: &str = "\n----\nGeneral Instructions:\n";

/// Builds system prompts from a template file.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    template_path: PathBuf,
}

impl PromptAssembler {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    /// Read the template text. A missing or unreadable file is an error.
    pub async fn load_template(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.template_path)
            .await
            .map_err(|e| Error::Template {
                path: self.template_path.clone(),
                reason: e.to_string(),
            })
    }

    /// Template text, plus the user's own instructions when they gave any.
    pub async fn build_system_prompt(&self, user_system_prompt: &str) -> Result<String> {
        let mut prompt = self.load_template().await?;
        if !user_system_prompt.is_empty() {
            prompt.push_str(GENERAL_INSTRUCTIONS_HEADER);
            prompt.push_str(user_system_prompt);
        }
        Ok(prompt)
    }
}

/// Append a `<code>` block to `prompt` when `code` is non-empty.
pub fn attach_code(prompt: &str, code: &str) -> String {
    if code.is_empty() {
        return prompt.to_string();
    }
    format!("{prompt}\n<code>\n{code}\n</code>\n")
}

/// A short sentence naming the language of a file, keyed by extension
/// (with or without the leading dot). Unknown extensions yield `""`.
pub fn file_type_mention(ext: &str) -> String {
    let file_type = match ext.trim_start_matches('.') {
        "py" => "Python",
        "js" => "JavaScript",
        "html" => "HTML",
        "css" => "CSS",
        "json" => "JSON",
        "txt" => "Text",
        "md" => "Markdown",
        "java" => "Java",
        _ => return String::new(),
    };
    format!("\nI'm working in a {file_type} file. ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn template(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("agent_system_prompt.md");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[tokio::test]
    async fn system_prompt_is_template_when_user_text_empty() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = PromptAssembler::new(template(dir.path(), "You are a coder."));
        let prompt = assembler.build_system_prompt("").await.unwrap();
        assert_eq!(prompt, "You are a coder.");
    }

    #[tokio::test]
    async fn user_instructions_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = PromptAssembler::new(template(dir.path(), "T"));
        let prompt = assembler.build_system_prompt("Be terse.").await.unwrap();
        assert_eq!(prompt, "T\n----\nGeneral Instructions:\nBe terse.");
    }

    #[tokio::test]
    async fn missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = PromptAssembler::new(dir.path().join("absent.md"));
        let err = assembler.build_system_prompt("x").await.unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn code_block_attached() {
        assert_eq!(
            attach_code("Fix this", "let x = 1;"),
            "Fix this\n<code>\nlet x = 1;\n</code>\n"
        );
        assert_eq!(attach_code("Fix this", ""), "Fix this");
    }

    #[test]
    fn file_type_mentions() {
        assert_eq!(file_type_mention(".py"), "\nI'm working in a Python file. ");
        assert_eq!(file_type_mention("java"), "\nI'm working in a Java file. ");
        assert_eq!(file_type_mention(".rs"), "");
        assert_eq!(file_type_mention(""), "");
    }
}
