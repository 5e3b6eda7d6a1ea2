pub mod chat;
pub mod init;
pub mod run;

use scrivener_agent::{ModelHandle, Orchestrator, PromptAssembler};
use scrivener_config::AppConfig;

/// Load config and build the orchestrator and model handle shared by the
/// `run` and `chat` commands.
pub(crate) fn session(
    dry_run_flag: bool,
) -> Result<(AppConfig, Orchestrator, ModelHandle), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let dry_run = dry_run_flag || config.agent.dry_run;

    // Dry runs never reach the model, so a missing key is fine there
    if !dry_run && !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENROUTER_API_KEY = 'sk-or-v1-...'   (recommended)");
        eprintln!("    OPENAI_API_KEY     = 'sk-...'         (for OpenAI direct)");
        eprintln!("    SCRIVENER_API_KEY  = 'sk-...'         (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Or pass --dry-run to skip the model call.");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = scrivener_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let model = ModelHandle::new(provider, &config.default_model)
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens);

    let orchestrator = Orchestrator::new(PromptAssembler::new(&config.agent.template_path))
        .with_max_iterations(config.agent.max_iterations)
        .with_dry_run(dry_run);

    Ok((config, orchestrator, model))
}
