//! The orchestrator: prompt in, answer and transcript out.
//!
//! Three entry points share one flow:
//!
//! 1. Build the system prompt from the template.
//! 2. Normalize the turn list and append the user's prompt.
//! 3. Dispatch to the model directly (mode `none`) or to an agent executor
//!    carrying the refactor tool set.
//! 4. Accumulate the answer from the turns the run appended.
//! 5. Write the transcript.
//!
//! [`Orchestrator::run`] awaits a single result. [`Orchestrator::run_chat`]
//! and [`Orchestrator::run_graph`] stream executor turns into a chat entry
//! list and send a snapshot of that list after every increment. The
//! snapshot channel is bounded, so the caller must drain it while the run
//! is in flight (for example with `tokio::join!`). Dropping a streaming run
//! stops its tool loop before the next model call or tool execution.
//!
//! In dry-run mode no model or executor is touched; the answer comes from
//! `dry-run-answer.txt` in the data folder, or a fixed placeholder.

use crate::answer;
use crate::chat::{apply_turn, history_from_chat};
use crate::executor::{AgentExecutor, ModelHandle, ToolLoopExecutor};
use crate::prompt::{PromptAssembler, attach_code};
use crate::toolset::SharedToolSet;
use crate::transcript::{Transcript, check_output_name};
use crate::turns::{append_user_turn, ensure_instruction_turn};
use scrivener_core::chat::ChatEntry;
use scrivener_core::error::{Error, Result};
use scrivener_core::message::Message;
use scrivener_core::mode::AgentMode;
use scrivener_core::sources::FileSources;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Answer used in dry-run mode when no canned answer file exists.
pub const DRY_RUN_PLACEHOLDER: &str = "Dry Run: No API call made.";

/// A one-shot request from the web app.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Extra instructions appended to the template.
    pub user_system_prompt: String,
    /// Name of the AI service, recorded in the transcript.
    pub service: String,
    pub mode: AgentMode,
    /// Transcript file stem; empty means "use the timestamp".
    pub output_file_name: String,
    pub input_prompt: String,
    pub sources: FileSources,
    /// Code attached to the prompt in a `<code>` block.
    pub code: Option<String>,
}

/// A streamed request from the chat UI, run against the stock tool loop.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub service: String,
    pub output_file_name: String,
    pub input_prompt: String,
    pub sources: FileSources,
    pub show_tool_usage: bool,
}

/// A streamed request run against a caller-supplied executor.
#[derive(Debug, Clone)]
pub struct GraphRequest {
    /// Used as the system prompt as-is when non-empty.
    pub verbatim_system_prompt: String,
    pub service: String,
    pub output_file_name: String,
    pub input_prompt: String,
    pub sources: FileSources,
    pub show_tool_usage: bool,
}

/// What one invocation produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub answer: String,
    pub system_prompt: String,
    pub final_prompt: String,
    pub transcript_path: PathBuf,
    /// Milliseconds since the Unix epoch at the start of the invocation.
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    prompts: PromptAssembler,
    tools: SharedToolSet,
    max_iterations: u32,
    dry_run: bool,
}

impl Orchestrator {
    pub fn new(prompts: PromptAssembler) -> Self {
        Self {
            prompts,
            tools: SharedToolSet::new(),
            max_iterations: 25,
            dry_run: false,
        }
    }

    /// Share a tool set cache with other orchestrators.
    pub fn with_tool_set(mut self, tools: SharedToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// One-shot entry point.
    ///
    /// `turns` is mutated in place: the system turn is set, the user turn
    /// appended, then every turn the run produced. In dry-run mode `turns`
    /// is left untouched.
    pub async fn run(
        &self,
        request: RunRequest,
        turns: &mut Vec<Message>,
        model: &ModelHandle,
    ) -> Result<RunOutcome> {
        check_output_name(&request.output_file_name)?;
        let timestamp = now_millis();
        let final_prompt = attach_code(
            &request.input_prompt,
            request.code.as_deref().unwrap_or_default(),
        );
        let system_prompt = self
            .prompts
            .build_system_prompt(&request.user_system_prompt)
            .await?;

        info!(
            service = %request.service,
            mode = %request.mode,
            dry_run = self.dry_run,
            "Running prompt"
        );

        let answer = if self.dry_run {
            dry_run_answer(&request.sources).await?
        } else {
            ensure_instruction_turn(turns, &system_prompt);
            append_user_turn(turns, &final_prompt);

            if request.mode.uses_tools() {
                let tools = self.tools.get_or_init(&request.sources).await;
                let executor = ToolLoopExecutor::new(model.clone(), tools)
                    .with_max_iterations(self.max_iterations);
                let appended = executor.invoke(turns).await?;
                debug!(appended = appended.len(), "Agent run finished");
                let answer = answer::accumulate(&appended);
                turns.extend(appended);
                answer
            } else {
                info!(model = %model.model(), "Running without tools");
                let reply = model.complete_direct(turns).await?;
                let answer = reply.content.clone();
                turns.push(Message::assistant(reply.content));
                answer
            }
        };

        let transcript_path = Transcript {
            service: &request.service,
            mode: request.mode,
            timestamp,
            input_prompt: &request.input_prompt,
            answer: &answer,
            system_prompt: &system_prompt,
            final_prompt: &final_prompt,
        }
        .write(&request.sources, &request.output_file_name)
        .await?;

        Ok(RunOutcome {
            answer,
            system_prompt,
            final_prompt,
            transcript_path,
            timestamp,
        })
    }

    /// Chat entry point backed by the stock tool loop and the shared tools.
    ///
    /// Always runs in refactor mode with the template as system prompt.
    ///
    /// `updates` receives a snapshot of `entries` after every change. Drain
    /// its receiver concurrently with this future: a full channel blocks
    /// the run until a snapshot is taken. A dropped receiver is ignored.
    pub async fn run_chat(
        &self,
        request: ChatRequest,
        entries: &mut Vec<ChatEntry>,
        model: &ModelHandle,
        updates: &mpsc::Sender<Vec<ChatEntry>>,
    ) -> Result<RunOutcome> {
        check_output_name(&request.output_file_name)?;
        let timestamp = now_millis();
        let system_prompt = self.prompts.build_system_prompt("").await?;

        info!(service = %request.service, dry_run = self.dry_run, "Running chat turn");

        let answer = if self.dry_run {
            self.dry_run_chat(&request.input_prompt, &request.sources, entries, updates)
                .await?
        } else {
            let tools = self.tools.get_or_init(&request.sources).await;
            let executor = ToolLoopExecutor::new(model.clone(), tools)
                .with_max_iterations(self.max_iterations);

            let mut history = history_from_chat(entries);
            ensure_instruction_turn(&mut history, &system_prompt);
            append_user_turn(&mut history, &request.input_prompt);

            stream_into_chat(
                &executor,
                history,
                &request.input_prompt,
                entries,
                request.show_tool_usage,
                updates,
            )
            .await?
        };

        self.finish_streamed(
            &request.service,
            timestamp,
            &request.input_prompt,
            answer,
            system_prompt,
            &request.sources,
            &request.output_file_name,
        )
        .await
    }

    /// Chat entry point backed by a caller-built executor.
    ///
    /// The verbatim system prompt wins when non-empty; otherwise the
    /// template is used. The system turn is placed ahead of the converted
    /// chat history.
    ///
    /// Snapshots go to `updates` exactly as in [`run_chat`](Self::run_chat),
    /// and the receiver must likewise be drained while the run is awaited.
    pub async fn run_graph(
        &self,
        request: GraphRequest,
        entries: &mut Vec<ChatEntry>,
        executor: Arc<dyn AgentExecutor>,
        updates: &mpsc::Sender<Vec<ChatEntry>>,
    ) -> Result<RunOutcome> {
        check_output_name(&request.output_file_name)?;
        let timestamp = now_millis();
        let system_prompt = if request.verbatim_system_prompt.is_empty() {
            self.prompts.build_system_prompt("").await?
        } else {
            request.verbatim_system_prompt.clone()
        };

        info!(service = %request.service, dry_run = self.dry_run, "Running graph turn");

        let answer = if self.dry_run {
            self.dry_run_chat(&request.input_prompt, &request.sources, entries, updates)
                .await?
        } else {
            let mut history = history_from_chat(entries);
            append_user_turn(&mut history, &request.input_prompt);
            history.insert(0, Message::system(&system_prompt));

            stream_into_chat(
                executor.as_ref(),
                history,
                &request.input_prompt,
                entries,
                request.show_tool_usage,
                updates,
            )
            .await?
        };

        self.finish_streamed(
            &request.service,
            timestamp,
            &request.input_prompt,
            answer,
            system_prompt,
            &request.sources,
            &request.output_file_name,
        )
        .await
    }

    /// Push the user entry and the canned answer, with a snapshot after each.
    async fn dry_run_chat(
        &self,
        input_prompt: &str,
        sources: &FileSources,
        entries: &mut Vec<ChatEntry>,
        updates: &mpsc::Sender<Vec<ChatEntry>>,
    ) -> Result<String> {
        entries.push(ChatEntry::user(input_prompt));
        let _ = updates.send(entries.clone()).await;

        let answer = dry_run_answer(sources).await?;
        entries.push(ChatEntry::assistant(&answer));
        let _ = updates.send(entries.clone()).await;
        Ok(answer)
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish_streamed(
        &self,
        service: &str,
        timestamp: i64,
        input_prompt: &str,
        answer: String,
        system_prompt: String,
        sources: &FileSources,
        output_file_name: &str,
    ) -> Result<RunOutcome> {
        let transcript_path = Transcript {
            service,
            mode: AgentMode::Refactor,
            timestamp,
            input_prompt,
            answer: &answer,
            system_prompt: &system_prompt,
            final_prompt: input_prompt,
        }
        .write(sources, output_file_name)
        .await?;

        Ok(RunOutcome {
            answer,
            system_prompt,
            final_prompt: input_prompt.to_string(),
            transcript_path,
            timestamp,
        })
    }
}

/// Push the user entry, then fold each streamed turn into `entries`,
/// sending a snapshot after every change. Returns the accumulated answer.
async fn stream_into_chat(
    executor: &dyn AgentExecutor,
    history: Vec<Message>,
    input_prompt: &str,
    entries: &mut Vec<ChatEntry>,
    show_tool_usage: bool,
    updates: &mpsc::Sender<Vec<ChatEntry>>,
) -> Result<String> {
    entries.push(ChatEntry::user(input_prompt));
    let _ = updates.send(entries.clone()).await;

    debug!("Processing agent responses");
    let mut answer = String::new();
    let mut stream = executor.stream(history).await;
    while let Some(turn) = stream.recv().await {
        let turn = turn?;
        answer::push_fragments(&mut answer, &turn);
        apply_turn(entries, &turn, show_tool_usage);
        let _ = updates.send(entries.clone()).await;
    }
    Ok(answer)
}

/// Canned answer from the data folder, else the placeholder.
async fn dry_run_answer(sources: &FileSources) -> Result<String> {
    let path = sources.dry_run_answer_path();
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => {
            info!(path = %path.display(), "Simulating AI response from file");
            Ok(text)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DRY_RUN_PLACEHOLDER.to_string()),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
