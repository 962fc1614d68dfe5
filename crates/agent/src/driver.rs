//! The bounded reasoning/tool-execution loop shared by every turn.
//!
//! Buffered and streaming turns run the same loop. A streaming turn passes
//! a sink; the loop then asks the provider for a stream and forwards every
//! chunk, tool call, and tool result to it as it happens.

use crate::prompt::PromptContext;
use crate::stream_event::AgentStreamEvent;
use chrono::Utc;
use memoh_core::error::ProviderError;
use memoh_core::provider::Usage;
use memoh_core::{
    Conversation, DomainEvent, Error, EventBus, Message, MessageToolCall, Provider,
    ProviderRequest, ToolCall, ToolRegistry,
};
use memoh_tools::CapabilityRegistry;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Model parameters sent with every request.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Finish {
    /// The model answered without asking for tools
    Answered,
    /// `max_steps` rounds ran without a final answer
    StepLimit,
    /// The streaming consumer went away
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct StepOutcome {
    pub steps: usize,
    pub usage: Option<Usage>,
    pub finish: Finish,
}

/// A turn that ended in an error after `steps` steps had started.
#[derive(Debug)]
pub(crate) struct StepFailure {
    pub steps: usize,
    pub error: Error,
}

pub(crate) struct StepLoop<'a> {
    pub provider: &'a dyn Provider,
    pub model: &'a ModelSettings,
    pub max_steps: usize,
    pub prompt: &'a PromptContext,
    pub capabilities: &'a CapabilityRegistry,
    pub external: &'a ToolRegistry,
    pub events: &'a EventBus,
    pub sink: Option<&'a mpsc::Sender<AgentStreamEvent>>,
}

impl StepLoop<'_> {
    /// Run steps against `conversation` until the model answers, the step
    /// bound is reached, or the streaming consumer disconnects.
    ///
    /// Every message the loop produces is pushed onto `conversation` in
    /// order. Provider failures and malformed tool-call arguments end the
    /// turn with an error; tool failures become tool-result messages. A
    /// response with malformed arguments is rejected before it is recorded
    /// or any of its calls run, so history never holds unanswered calls.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<StepOutcome, StepFailure> {
        let mut usage: Option<Usage> = None;

        for step in 1..=self.max_steps {
            let mut connected = self.emit(AgentStreamEvent::StepStart { step }).await;
            if !connected {
                return Ok(self.outcome(step - 1, usage, Finish::Cancelled));
            }

            // Both are rebuilt per step: a tool call in the previous step
            // may have enabled a skill.
            let enabled = self.capabilities.skills().enabled().await;
            let tools = self.capabilities.build_tools(self.external);

            let request = ProviderRequest {
                model: self.model.model.clone(),
                system: self.prompt.render(&Utc::now(), &enabled),
                messages: conversation.messages.clone(),
                temperature: self.model.temperature,
                max_tokens: self.model.max_tokens,
                tools: tools.definitions(),
                stream: self.sink.is_some(),
            };

            debug!(step, tools = tools.len(), skills = enabled.len(), "Agent loop step");

            let fail = |error: Error| StepFailure { steps: step, error };
            let (message, step_usage) = match self.sink {
                None => {
                    let response = self
                        .provider
                        .complete(request)
                        .await
                        .map_err(|e| fail(e.into()))?;
                    (response.message, response.usage)
                }
                Some(sink) => match self.stream_step(sink, request).await.map_err(fail)? {
                    Some(streamed) => streamed,
                    None => return Ok(self.outcome(step - 1, usage, Finish::Cancelled)),
                },
            };
            usage = match (usage, step_usage) {
                (Some(total), Some(u)) => Some(total.add(u)),
                (total, u) => total.or(u),
            };

            let calls = message
                .tool_calls
                .iter()
                .map(parse_call)
                .collect::<Result<Vec<_>, _>>()
                .map_err(fail)?;
            conversation.push(message);

            if calls.is_empty() {
                return Ok(self.outcome(step, usage, Finish::Answered));
            }

            debug!(step, tool_count = calls.len(), "Executing tool calls");
            for call in &calls {
                connected &= self
                    .emit(AgentStreamEvent::ToolCall {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: call.arguments.clone(),
                    })
                    .await;

                let (output, success) = self.dispatch(&tools, call).await;
                connected &= self
                    .emit(AgentStreamEvent::ToolResult {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        output: output.clone(),
                        success,
                    })
                    .await;

                conversation.push(Message::tool_result(&call.id, output));
            }

            connected &= self.emit(AgentStreamEvent::StepFinish { step }).await;
            if !connected {
                return Ok(self.outcome(step, usage, Finish::Cancelled));
            }
        }

        warn!(max_steps = self.max_steps, "Step limit reached, ending turn");
        Ok(self.outcome(self.max_steps, usage, Finish::StepLimit))
    }

    fn outcome(&self, steps: usize, usage: Option<Usage>, finish: Finish) -> StepOutcome {
        StepOutcome {
            steps,
            usage,
            finish,
        }
    }

    /// Execute one call, rendering any failure as the tool's output.
    async fn dispatch(&self, tools: &ToolRegistry, call: &ToolCall) -> (String, bool) {
        let start = std::time::Instant::now();
        let result = tools.execute(call).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (output, success) = match result {
            Ok(result) => (result.output, result.success),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                (format!("Error: {e}"), false)
            }
        };

        self.events.publish(DomainEvent::ToolExecuted {
            tool_name: call.name.clone(),
            success,
            duration_ms,
            timestamp: Utc::now(),
        });

        (output, success)
    }

    /// Stream one model response to `sink`. `None` means the consumer
    /// disconnected mid-response.
    async fn stream_step(
        &self,
        sink: &mpsc::Sender<AgentStreamEvent>,
        request: ProviderRequest,
    ) -> Result<Option<(Message, Option<Usage>)>, Error> {
        let mut chunks = self.provider.stream(request).await?;
        let mut content = String::new();
        let mut tool_calls = Vec::new();
        let mut usage = None;

        while let Some(chunk) = chunks.recv().await {
            let chunk = chunk?;
            if let Some(text) = chunk.content.filter(|t| !t.is_empty()) {
                content.push_str(&text);
                if sink.send(AgentStreamEvent::Chunk { content: text }).await.is_err() {
                    return Ok(None);
                }
            }
            tool_calls.extend(chunk.tool_calls);
            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
            if chunk.done {
                break;
            }
        }

        let mut message = Message::assistant(content);
        message.tool_calls = tool_calls;
        Ok(Some((message, usage)))
    }

    /// Forward an event to the streaming consumer. False once the consumer
    /// is gone; always true for buffered turns.
    async fn emit(&self, event: AgentStreamEvent) -> bool {
        match self.sink {
            Some(sink) => sink.send(event).await.is_ok(),
            None => true,
        }
    }
}

fn parse_call(tc: &MessageToolCall) -> Result<ToolCall, Error> {
    let arguments = if tc.arguments.trim().is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(&tc.arguments).map_err(|e| {
            Error::Provider(ProviderError::MalformedToolCall {
                tool_name: tc.name.clone(),
                reason: e.to_string(),
            })
        })?
    };
    Ok(ToolCall {
        id: tc.id.clone(),
        name: tc.name.clone(),
        arguments,
    })
}
