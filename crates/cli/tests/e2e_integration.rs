//! End-to-end integration tests for Scrivener.
//!
//! These tests exercise the full pipeline from configuration to transcript:
//! config loading, prompt assembly, agent dispatch with the real file tools,
//! streaming into chat entries, and log file output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scrivener_agent::{
    ChatRequest, GraphRequest, ModelHandle, Orchestrator, PromptAssembler, RunRequest,
    SharedToolSet, ToolLoopExecutor, DRY_RUN_PLACEHOLDER,
};
use scrivener_config::AppConfig;
use scrivener_core::error::ProviderError;
use scrivener_core::message::{Message, MessageToolCall, Role};
use scrivener_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use scrivener_core::{AgentMode, ChatEntry, FileSources};
use tokio::sync::mpsc;

// ── Mock Providers ───────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence.
struct ScriptedProvider {
    responses: std::sync::Mutex<Vec<ProviderResponse>>,
    call_count: std::sync::Mutex<usize>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            call_count: std::sync::Mutex::new(0),
        }
    }

    fn text(response: &str) -> Self {
        Self::new(vec![text_response(response)])
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        if *count >= responses.len() {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                *count,
                responses.len()
            );
        }
        let resp = responses[*count].clone();
        *count += 1;
        Ok(resp)
    }
}

/// Any call is a test failure.
struct NoNetworkProvider;

#[async_trait::async_trait]
impl Provider for NoNetworkProvider {
    fn name(&self) -> &str {
        "no_network"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        panic!("dry run must not call the model");
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

fn tool_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_with_tools(thought, tool_calls),
        usage: None,
        model: "mock-model".into(),
    }
}

fn tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: args.to_string(),
    }
}

// ── Workspace fixture ────────────────────────────────────────────────────

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
    config: AppConfig,
}

impl Workspace {
    /// A project folder, a template and a config file pointing at both.
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        std::fs::create_dir_all(root.join("project/lib")).unwrap();
        std::fs::write(
            root.join("project/lib/greet.py"),
            "def greet():\n    return 'hi'\n",
        )
        .unwrap();
        std::fs::write(root.join("template.md"), "You edit Python code.").unwrap();

        let config_toml = format!(
            r#"
default_provider = "openai"
default_model = "gpt-4o-mini"

[agent]
template_path = "{template}"
max_iterations = 5

[sources]
source_folder = "{project}"
data_folder = "{data}"
"#,
            template = slash(&root.join("template.md")),
            project = slash(&root.join("project")),
            data = slash(&root.join("data")),
        );
        let config_path = root.join("config.toml");
        std::fs::write(&config_path, config_toml).unwrap();
        let config = AppConfig::load_from(&config_path).unwrap();

        Self {
            _dir: dir,
            root,
            config,
        }
    }

    fn sources(&self) -> FileSources {
        self.config.sources.file_sources()
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(PromptAssembler::new(&self.config.agent.template_path))
            .with_max_iterations(self.config.agent.max_iterations)
    }

    fn transcripts(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.config.sources.data_folder) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn slash(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

// ── One-shot ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn refactor_run_edits_file_and_logs_transcript() {
    let ws = Workspace::new();
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(
            vec![tool_call("c1", "file_read", serde_json::json!({"path": "lib/greet.py"}))],
            "Let me read it.",
        ),
        tool_response(
            vec![tool_call(
                "c2",
                "file_write",
                serde_json::json!({
                    "path": "lib/greet.py",
                    "content": "def greet():\n    return 'hello'\n"
                }),
            )],
            "",
        ),
        text_response("Updated greet() to return 'hello'."),
    ]));
    let model = ModelHandle::new(provider.clone(), &ws.config.default_model);

    let mut turns = Vec::new();
    let outcome = ws
        .orchestrator()
        .run(
            RunRequest {
                user_system_prompt: String::new(),
                service: ws.config.default_provider.clone(),
                mode: AgentMode::Refactor,
                output_file_name: "greet-change".into(),
                input_prompt: "Make greet say hello".into(),
                sources: ws.sources(),
                code: None,
            },
            &mut turns,
            &model,
        )
        .await
        .unwrap();

    assert_eq!(provider.calls(), 3);
    assert_eq!(
        std::fs::read_to_string(ws.root.join("project/lib/greet.py")).unwrap(),
        "def greet():\n    return 'hello'\n"
    );
    assert_eq!(
        outcome.answer,
        "Let me read it.\nTool Used: file_read\nTool Used: file_write\nUpdated greet() to return 'hello'.\n"
    );

    // system, user, then 5 appended turns
    assert_eq!(turns.len(), 7);
    assert_eq!(turns[0].role, Role::System);
    assert_eq!(turns[0].content, "You edit Python code.");

    assert_eq!(ws.transcripts(), vec![ws.root.join("data/greet-change.txt")]);
    let log = std::fs::read_to_string(&outcome.transcript_path).unwrap();
    assert!(log.starts_with("AI Model Used: openai, Mode: refactor, Timestamp: "));
    assert!(log.contains("Input Prompt: \nMake greet say hello\n"));
    assert!(log.contains("System Prompt: \nYou edit Python code.\n"));
}

#[tokio::test]
async fn sandbox_violation_is_reported_back_to_model() {
    let ws = Workspace::new();
    std::fs::write(ws.root.join("secret.txt"), "top secret").unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(
            vec![tool_call("c1", "file_read", serde_json::json!({"path": "../secret.txt"}))],
            "",
        ),
        text_response("I can't read that."),
    ]));
    let model = ModelHandle::new(provider, "m");

    let mut turns = Vec::new();
    ws.orchestrator()
        .run(
            RunRequest {
                user_system_prompt: String::new(),
                service: "openai".into(),
                mode: AgentMode::Refactor,
                output_file_name: String::new(),
                input_prompt: "Read the secret".into(),
                sources: ws.sources(),
                code: None,
            },
            &mut turns,
            &model,
        )
        .await
        .unwrap();

    let tool_turn = turns.iter().find(|m| m.role == Role::Tool).unwrap();
    assert!(tool_turn.content.starts_with("Error: "));
    assert!(!tool_turn.content.contains("top secret"));
}

#[tokio::test]
async fn consecutive_runs_share_turn_list() {
    let ws = Workspace::new();
    let orchestrator = ws.orchestrator();
    let mut turns = Vec::new();

    for (i, reply) in ["first", "second"].iter().enumerate() {
        let model = ModelHandle::new(Arc::new(ScriptedProvider::text(reply)), "m");
        orchestrator
            .run(
                RunRequest {
                    user_system_prompt: format!("round {i}"),
                    service: "openai".into(),
                    mode: AgentMode::None,
                    output_file_name: format!("run-{i}"),
                    input_prompt: format!("question {i}"),
                    sources: ws.sources(),
                    code: None,
                },
                &mut turns,
                &model,
            )
            .await
            .unwrap();
    }

    // One system turn, overwritten by the second run
    assert_eq!(turns.iter().filter(|m| m.role == Role::System).count(), 1);
    assert!(turns[0].content.ends_with("round 1"));
    assert_eq!(turns.len(), 5);
    assert_eq!(ws.transcripts().len(), 2);
}

#[tokio::test]
async fn dry_run_makes_no_model_call() {
    let ws = Workspace::new();
    let orchestrator = ws.orchestrator().with_dry_run(true);
    let model = ModelHandle::new(Arc::new(NoNetworkProvider), "m");
    let mut turns = Vec::new();

    let outcome = orchestrator
        .run(
            RunRequest {
                user_system_prompt: String::new(),
                service: "openai".into(),
                mode: AgentMode::Refactor,
                output_file_name: "dry".into(),
                input_prompt: "Anything".into(),
                sources: ws.sources(),
                code: Some("x = 1".into()),
            },
            &mut turns,
            &model,
        )
        .await
        .unwrap();

    assert!(turns.is_empty());
    assert_eq!(outcome.answer, DRY_RUN_PLACEHOLDER);
    let log = std::fs::read_to_string(ws.root.join("data/dry.txt")).unwrap();
    assert!(log.contains("Final Prompt: \nAnything\n<code>\nx = 1\n</code>\n"));
}

// ── Streaming ────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_session_across_two_turns() {
    let ws = Workspace::new();
    let orchestrator = ws.orchestrator();
    let mut entries: Vec<ChatEntry> = Vec::new();

    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(
            vec![tool_call("c1", "list_files", serde_json::json!({}))],
            "",
        ),
        text_response("There is one module: lib/greet.py."),
        text_response("It returns 'hi'."),
    ]));
    let model = ModelHandle::new(provider.clone(), "m");

    for question in ["What files exist?", "What does greet return?"] {
        let (tx, mut rx) = mpsc::channel(1);
        let turn = async {
            let tx = tx;
            orchestrator
                .run_chat(
                    ChatRequest {
                        service: "openai".into(),
                        output_file_name: String::new(),
                        input_prompt: question.into(),
                        sources: ws.sources(),
                        show_tool_usage: true,
                    },
                    &mut entries,
                    &model,
                    &tx,
                )
                .await
        };
        let last_snapshot = async {
            let mut last = None;
            while let Some(snapshot) = rx.recv().await {
                last = Some(snapshot);
            }
            last
        };
        let (outcome, last) = tokio::join!(turn, last_snapshot);
        outcome.unwrap();
        assert_eq!(last.as_ref(), Some(&entries));
    }

    assert_eq!(provider.calls(), 3);
    let visible: Vec<&str> = entries
        .iter()
        .filter(|e| !e.is_annotation())
        .map(|e| e.content.as_str())
        .collect();
    assert_eq!(
        visible,
        vec![
            "What files exist?",
            "There is one module: lib/greet.py.",
            "What does greet return?",
            "It returns 'hi'.",
        ]
    );
    let listing = entries.iter().find(|e| {
        e.metadata
            .as_ref()
            .is_some_and(|m| m.title == "📋 Tool result")
    });
    assert!(listing.unwrap().content.contains("lib/greet.py"));
}

#[tokio::test]
async fn graph_run_with_prebuilt_executor() {
    let ws = Workspace::new();
    let tools = SharedToolSet::new();
    let registry = tools.get_or_init(&ws.sources()).await;
    let provider = Arc::new(ScriptedProvider::text("Graph says hi."));
    let executor = Arc::new(ToolLoopExecutor::new(
        ModelHandle::new(provider, "m"),
        registry,
    ));

    let orchestrator = ws.orchestrator().with_tool_set(tools.clone());
    let mut entries = vec![ChatEntry::user("earlier"), ChatEntry::assistant("reply")];
    let (tx, mut rx) = mpsc::channel(1);

    let turn = async {
        let tx = tx;
        orchestrator
            .run_graph(
                GraphRequest {
                    verbatim_system_prompt: "Only answer in one sentence.".into(),
                    service: "anthropic".into(),
                    output_file_name: "graph".into(),
                    input_prompt: "Say hi".into(),
                    sources: ws.sources(),
                    show_tool_usage: false,
                },
                &mut entries,
                executor,
                &tx,
            )
            .await
    };
    let drain = async { while rx.recv().await.is_some() {} };
    let (outcome, ()) = tokio::join!(turn, drain);
    let outcome = outcome.unwrap();

    assert!(tools.is_initialized());
    assert_eq!(entries.len(), 4);
    assert_eq!(outcome.answer, "Graph says hi.\n");
    let log = std::fs::read_to_string(ws.root.join("data/graph.txt")).unwrap();
    assert!(log.contains("AI Model Used: anthropic, Mode: refactor"));
    assert!(log.contains("System Prompt: \nOnly answer in one sentence.\n"));
}

// ── Configuration ────────────────────────────────────────────────────────

#[test]
fn env_overrides_feed_the_provider_router() {
    let mut config = AppConfig::default();
    config.apply_env_overrides(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".into()),
        "SCRIVENER_PROVIDER" => Some("openai".into()),
        _ => None,
    });

    assert!(config.has_api_key());
    let router = scrivener_providers::build_from_config(&config);
    assert_eq!(router.default().unwrap().name(), "openai");
}
