//! `scrivener run`: One-shot prompt.

use scrivener_agent::{RunRequest, file_type_mention};
use scrivener_core::AgentMode;
use std::path::PathBuf;

pub struct RunArgs {
    pub prompt: String,
    pub system: Option<String>,
    pub mode: Option<String>,
    pub output: Option<String>,
    pub code_file: Option<PathBuf>,
    pub dry_run: bool,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, orchestrator, model) = super::session(args.dry_run)?;

    let mode = match args.mode.as_deref() {
        Some(m) => m.parse::<AgentMode>()?,
        None => config.agent.default_mode,
    };

    let mut input_prompt = args.prompt;
    let code = match &args.code_file {
        Some(path) => {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            input_prompt.push_str(&file_type_mention(&ext));
            Some(
                std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
            )
        }
        None => None,
    };

    let request = RunRequest {
        user_system_prompt: args.system.unwrap_or_default(),
        service: config.default_provider.clone(),
        mode,
        output_file_name: args.output.unwrap_or_default(),
        input_prompt,
        sources: config.sources.file_sources(),
        code,
    };

    let mut turns = Vec::new();
    eprint!("  Thinking...");
    let outcome = orchestrator.run(request, &mut turns, &model).await;
    eprint!("\r              \r");
    let outcome = outcome?;

    println!("{}", outcome.answer);
    eprintln!("  Transcript: {}", outcome.transcript_path.display());

    Ok(())
}
