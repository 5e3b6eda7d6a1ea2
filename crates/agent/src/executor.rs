//! Agent dispatch.
//!
//! The orchestrator talks to an agent only through [`AgentExecutor`]. An
//! executor receives the full turn list and hands back exactly the turns its
//! run appended, so callers never slice by pre-call length.
//!
//! [`ToolLoopExecutor`] is the stock implementation: it alternates model
//! calls and tool execution until the model answers with text only.

use async_trait::async_trait;
use scrivener_core::error::Result;
use scrivener_core::message::Message;
use scrivener_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use scrivener_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Assistant turn appended when the tool loop hits its iteration cap.
pub const MAX_ITERATIONS_NOTICE: &str =
    "I've reached the maximum number of tool call iterations. Please provide further guidance.";

/// Buffer size of the channel returned by [`ToolLoopExecutor::stream`].
const STREAM_BUFFER: usize = 32;

/// Runs one agent request over a turn list.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Run to completion and return only the turns this run appended.
    async fn invoke(&self, turns: &[Message]) -> Result<Vec<Message>>;

    /// Yield each appended turn as soon as it is produced.
    ///
    /// The default runs [`invoke`](Self::invoke) and replays its turns. A
    /// failed run yields a single `Err` item.
    async fn stream(&self, turns: Vec<Message>) -> mpsc::Receiver<Result<Message>> {
        let result = self.invoke(&turns).await;
        let capacity = result.as_ref().map(|t| t.len()).unwrap_or(0).max(1);
        let (tx, rx) = mpsc::channel(capacity);
        match result {
            Ok(appended) => {
                for turn in appended {
                    let _ = tx.try_send(Ok(turn));
                }
            }
            Err(e) => {
                let _ = tx.try_send(Err(e));
            }
        }
        rx
    }
}

/// A chat model bound to its call settings.
#[derive(Clone)]
pub struct ModelHandle {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ModelHandle {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        turns: &[Message],
        tools: Vec<ToolDefinition>,
    ) -> Result<ProviderResponse> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: turns.to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools,
        };
        Ok(self.provider.complete(request).await?)
    }

    /// One tool-less completion; returns the assistant turn.
    pub async fn complete_direct(&self, turns: &[Message]) -> Result<Message> {
        let response = self.complete(turns, Vec::new()).await?;
        Ok(response.message)
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Tool-calling loop over a [`ModelHandle`].
#[derive(Clone)]
pub struct ToolLoopExecutor {
    model: ModelHandle,
    tools: Arc<ToolRegistry>,
    max_iterations: u32,
}

impl ToolLoopExecutor {
    pub fn new(model: ModelHandle, tools: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            tools,
            max_iterations: 25,
        }
    }

    /// Set the maximum number of model round-trips per run.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Drive the loop. Every appended turn is collected and, when `tx` is
    /// set, also sent as it is produced. A streamed run stops as soon as
    /// its receiver is gone: no further model calls or tool executions.
    async fn drive(
        &self,
        turns: &[Message],
        tx: Option<&mpsc::Sender<Result<Message>>>,
    ) -> Result<Vec<Message>> {
        let mut context = turns.to_vec();
        let mut appended = Vec::new();
        let definitions = self.tools.definitions();

        info!(
            model = %self.model.model(),
            turns = turns.len(),
            tools = self.tools.len(),
            "Running tool loop"
        );

        let mut iteration = 0;
        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                warn!(
                    iterations = self.max_iterations,
                    "Max tool iterations reached, stopping"
                );
                let notice = Message::assistant(MAX_ITERATIONS_NOTICE);
                record(notice, &mut context, &mut appended, tx).await;
                break;
            }

            if receiver_gone(tx) {
                debug!("Stream receiver dropped, stopping tool loop");
                break;
            }

            debug!(iteration, "Tool loop iteration");

            let response = self.model.complete(&context, definitions.clone()).await?;
            let tool_calls = response.message.tool_calls.clone();
            if !record(response.message, &mut context, &mut appended, tx).await {
                debug!("Stream receiver dropped, stopping tool loop");
                break;
            }

            if tool_calls.is_empty() {
                break;
            }

            debug!(tool_count = tool_calls.len(), "Executing tool calls");

            for tc in &tool_calls {
                if receiver_gone(tx) {
                    debug!("Stream receiver dropped, skipping remaining tool calls");
                    return Ok(appended);
                }

                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };

                let output = match self.tools.execute(&call).await {
                    Ok(result) => {
                        debug!(tool = %tc.name, success = result.success, "Tool executed");
                        result.output
                    }
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool execution failed");
                        format!("Error: {e}")
                    }
                };

                let result_turn = Message::tool_result(&tc.id, output);
                if !record(result_turn, &mut context, &mut appended, tx).await {
                    return Ok(appended);
                }
            }
        }

        Ok(appended)
    }
}

/// Push a produced turn onto the working context and the appended list.
///
/// Returns `false` when the turn could not be streamed because the
/// receiver was dropped.
async fn record(
    turn: Message,
    context: &mut Vec<Message>,
    appended: &mut Vec<Message>,
    tx: Option<&mpsc::Sender<Result<Message>>>,
) -> bool {
    context.push(turn.clone());
    let delivered = match tx {
        Some(tx) => tx.send(Ok(turn.clone())).await.is_ok(),
        None => true,
    };
    appended.push(turn);
    delivered
}

fn receiver_gone(tx: Option<&mpsc::Sender<Result<Message>>>) -> bool {
    tx.is_some_and(|tx| tx.is_closed())
}

#[async_trait]
impl AgentExecutor for ToolLoopExecutor {
    async fn invoke(&self, turns: &[Message]) -> Result<Vec<Message>> {
        self.drive(turns, None).await
    }

    async fn stream(&self, turns: Vec<Message>) -> mpsc::Receiver<Result<Message>> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.drive(&turns, Some(&tx)).await {
                let _ = tx.send(Err(e)).await;
            }
        });
        rx
    }
}
