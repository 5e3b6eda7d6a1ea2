//! `scrivener init`: First-time setup.

use scrivener_config::AppConfig;
use std::path::Path;

const DEFAULT_TEMPLATE: &str = concat!(
    "# Role\n\n",
    "You are a careful software engineer helping the user understand and\n",
    "refactor the code in their project.\n\n",
    "# Tools\n\n",
    "In refactor mode you can list, read, and write files. Paths are relative\n",
    "to the project's source folder. Read a file before changing it, and keep\n",
    "edits as small as the request allows.\n",
);

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    initialize(&AppConfig::config_dir())
}

fn initialize(config_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_dir.join("config.toml");

    println!("Scrivener — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    // Honour an existing config's template and data paths
    let config = AppConfig::load_from(&config_path)
        .map_err(|e| format!("Existing config is invalid, fix or delete it first: {e}"))?;

    let template_path = &config.agent.template_path;
    if template_path.exists() {
        println!("  Prompt template exists: {}", template_path.display());
    } else {
        if let Some(parent) = template_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(template_path, DEFAULT_TEMPLATE)?;
        println!("✅ Created prompt template: {}", template_path.display());
    }

    let data_folder = &config.sources.data_folder;
    if !data_folder.exists() {
        std::fs::create_dir_all(data_folder)?;
        println!("✅ Created data folder: {}", data_folder.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} and add your API key", config_path.display());
        println!("   2. Run: scrivener run --prompt \"...\"");
        println!("   3. Or start a session: scrivener chat\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}
