//! `scrivener chat`: Interactive session over stdin.

use scrivener_agent::ChatRequest;
use scrivener_core::{ChatEntry, ChatRole};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub async fn run(show_tools: bool, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (config, orchestrator, model) = super::session(dry_run)?;
    let show_tool_usage = show_tools || config.agent.show_tool_usage;
    let sources = config.sources.file_sources();

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║       Scrivener Chat — Interactive Mode      ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Sources:   {}", sources.source_folder.display());
    println!("  Logs:      {}", sources.data_folder.display());
    if orchestrator.is_dry_run() {
        println!("  Dry run:   no model calls will be made");
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut entries: Vec<ChatEntry> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt_marker()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            prompt_marker()?;
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let request = ChatRequest {
            service: config.default_provider.clone(),
            output_file_name: String::new(),
            input_prompt: line,
            sources: sources.clone(),
            show_tool_usage,
        };

        // The user's own entry is echoed by the first snapshot; skip it
        let already_shown = entries.len() + 1;
        let (tx, rx) = mpsc::channel(32);
        let turn = async {
            let tx = tx;
            orchestrator
                .run_chat(request, &mut entries, &model, &tx)
                .await
        };
        let (result, _) = tokio::join!(turn, print_updates(rx, already_shown));

        match result {
            Ok(outcome) => {
                tracing::debug!(path = %outcome.transcript_path.display(), "Chat turn logged");
            }
            Err(e) => eprintln!("  [Error] {e}"),
        }
        println!();
        prompt_marker()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

/// Print entries beyond `shown` as each snapshot arrives.
async fn print_updates(mut rx: mpsc::Receiver<Vec<ChatEntry>>, mut shown: usize) {
    while let Some(snapshot) = rx.recv().await {
        for entry in snapshot.iter().skip(shown) {
            print_entry(entry);
        }
        shown = shown.max(snapshot.len());
    }
}

fn print_entry(entry: &ChatEntry) {
    match (&entry.metadata, entry.role) {
        (Some(meta), _) => {
            println!("  {}", meta.title);
            for line in entry.content.lines() {
                println!("    │ {line}");
            }
        }
        (None, ChatRole::Assistant) => {
            println!();
            for line in entry.content.lines() {
                println!("  Assistant > {line}");
            }
        }
        (None, ChatRole::User) => {}
    }
}

fn prompt_marker() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
