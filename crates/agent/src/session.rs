//! The agent session: one conversation, its skills, and its turns.
//!
//! A turn is one call to [`AgentSession::ask`], [`AgentSession::ask_stream`],
//! or [`AgentSession::trigger_schedule`]:
//!
//! 1. **Load context** (ask only): stored memory in the context window is
//!    appended to history just before the new turn
//! 2. **Append** the user turn (raw text or a rendered schedule)
//! 3. **Open** the configured external tool servers
//! 4. **Run steps** until the model answers or `max_steps` is reached,
//!    regenerating the system prompt and tool set before each step
//! 5. **Close** every tool server that opened, on success and on failure
//! 6. **Persist** the turn to memory when configured
//!
//! Turns on one session are serialized; a session never shares its
//! conversation or skill set with another.

use crate::context::ContextLoader;
use crate::driver::{Finish, ModelSettings, StepFailure, StepLoop};
use crate::prompt::{PromptContext, resolve_current_platform};
use crate::stream::AgentStream;
use crate::stream_event::AgentStreamEvent;
use crate::trigger::schedule_prompt;
use chrono::{DateTime, Utc};
use memoh_config::AppConfig;
use memoh_core::{
    Conversation, DomainEvent, Error, EventBus, ExternalServerSpec, MemoryStore, MemoryUnit,
    Message, MessageSender, Platform, Provider, Schedule, ScheduleStore, Skill, SkillActivation,
};
use memoh_mcp::{Launcher, McpConnections, TransportLauncher};
use memoh_tools::{CapabilityRegistry, SkillTracker, WebSearchSettings};
use memoh_workflow::InMemoryScheduleStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, info, warn};

/// What a turn produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Messages appended by this turn, starting with the user turn
    pub messages: Vec<Message>,

    /// Names of the enabled skills when the turn ended, in enable order
    pub skills: Vec<String>,
}

/// Per-session agent behavior.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: ModelSettings,

    /// Upper bound on reasoning steps per turn
    pub max_steps: usize,

    /// Context window in minutes
    pub max_context_load_time: i64,

    pub language: String,
    pub locale: String,
    pub platforms: Vec<Platform>,
    pub current_platform: Option<String>,
    pub skill_activation: SkillActivation,

    /// Owner recorded on persisted turns and used for memory search
    pub owner_id: String,

    /// Store each completed turn as a memory unit
    pub persist_turns: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: ModelSettings {
                model: "gpt-4o-mini".into(),
                temperature: 0.7,
                max_tokens: None,
            },
            max_steps: 50,
            max_context_load_time: 24 * 60,
            language: "Same as user input".into(),
            locale: "en-US".into(),
            platforms: Vec::new(),
            current_platform: None,
            skill_activation: SkillActivation::PerSkill,
            owner_id: "default".into(),
            persist_turns: true,
        }
    }
}

impl AgentSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: ModelSettings {
                model: config.model.model.clone(),
                temperature: config.model.temperature,
                max_tokens: Some(config.model.max_tokens),
            },
            max_steps: config.agent.max_steps,
            max_context_load_time: config.agent.max_context_load_time,
            language: config.agent.language.clone(),
            locale: config.agent.locale.clone(),
            platforms: config.agent.platforms.clone(),
            current_platform: config.agent.current_platform.clone(),
            skill_activation: config.agent.skill_activation,
            owner_id: config.agent.owner_id.clone(),
            persist_turns: config.agent.persist_turns,
        }
    }
}

/// Builds an [`AgentSession`].
pub struct AgentSessionBuilder {
    provider: Arc<dyn Provider>,
    settings: AgentSettings,
    catalog: Vec<Skill>,
    use_skills: Vec<String>,
    schedules: Option<Arc<dyn ScheduleStore>>,
    memory: Option<Arc<dyn MemoryStore>>,
    messaging: Option<Arc<dyn MessageSender>>,
    web_search: WebSearchSettings,
    servers: Vec<ExternalServerSpec>,
    launcher: Option<Arc<dyn Launcher>>,
    mcp_timeout: Duration,
    events: Option<Arc<EventBus>>,
    history: Vec<Message>,
}

impl AgentSessionBuilder {
    pub fn new(provider: Arc<dyn Provider>, settings: AgentSettings) -> Self {
        Self {
            provider,
            settings,
            catalog: Vec::new(),
            use_skills: Vec::new(),
            schedules: None,
            memory: None,
            messaging: None,
            web_search: WebSearchSettings::default(),
            servers: Vec::new(),
            launcher: None,
            mcp_timeout: Duration::from_secs(30),
            events: None,
            history: Vec::new(),
        }
    }

    /// Settings, skills, web search, and tool servers from `config`.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let mut web_search = WebSearchSettings::new(config.web_search.brave_api_key.clone());
        web_search.base_url = config.web_search.brave_base_url.clone();
        web_search.max_results = config.web_search.max_results;

        Self::new(provider, AgentSettings::from_config(config))
            .with_skills(config.agent.skills.clone(), &config.agent.use_skills)
            .with_web_search(web_search)
            .with_external_servers(config.mcp.servers.clone())
            .with_mcp_timeout(Duration::from_secs(config.mcp.timeout_secs))
    }

    /// The skill catalog and the names enabled from the start.
    pub fn with_skills(mut self, catalog: Vec<Skill>, use_skills: &[String]) -> Self {
        self.catalog = catalog;
        self.use_skills = use_skills.to_vec();
        self
    }

    /// Back the schedule tools with `store` instead of an in-process store.
    pub fn with_schedule_store(mut self, store: Arc<dyn ScheduleStore>) -> Self {
        self.schedules = Some(store);
        self
    }

    /// Load context from, search, and persist turns to `store`.
    pub fn with_memory(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(store);
        self
    }

    /// Offer `send-message` to the configured platforms.
    pub fn with_messaging(mut self, sender: Arc<dyn MessageSender>) -> Self {
        self.messaging = Some(sender);
        self
    }

    pub fn with_web_search(mut self, settings: WebSearchSettings) -> Self {
        self.web_search = settings;
        self
    }

    /// Tool servers opened for every turn.
    pub fn with_external_servers(mut self, servers: Vec<ExternalServerSpec>) -> Self {
        self.servers = servers;
        self
    }

    /// Open tool servers with `launcher` instead of the transport launcher.
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_mcp_timeout(mut self, timeout: Duration) -> Self {
        self.mcp_timeout = timeout;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Messages the conversation starts with.
    pub fn with_history(mut self, messages: Vec<Message>) -> Self {
        self.history = messages;
        self
    }

    pub fn build(self) -> AgentSession {
        let settings = self.settings;
        let events = self.events.unwrap_or_default();

        let skills = SkillTracker::new(self.catalog.clone(), &self.use_skills)
            .with_events(Arc::clone(&events));
        let schedules = self
            .schedules
            .unwrap_or_else(|| Arc::new(InMemoryScheduleStore::new()));

        let mut capabilities = CapabilityRegistry::new(skills, schedules)
            .with_activation(settings.skill_activation)
            .with_web_search(self.web_search);
        if let Some(store) = &self.memory {
            capabilities = capabilities.with_memory(
                Arc::clone(store),
                settings.owner_id.clone(),
                settings.locale.clone(),
            );
        }
        if let Some(sender) = self.messaging {
            capabilities = capabilities.with_messaging(sender, settings.platforms.clone());
        }

        let prompt = PromptContext {
            locale: settings.locale.clone(),
            language: settings.language.clone(),
            max_context_load_time: settings.max_context_load_time,
            platforms: settings.platforms.clone(),
            current_platform: resolve_current_platform(
                &settings.platforms,
                settings.current_platform.as_deref(),
            ),
            catalog: self.catalog,
            activation: settings.skill_activation,
        };

        let launcher = self
            .launcher
            .unwrap_or_else(|| Arc::new(TransportLauncher::new(self.mcp_timeout)));

        let mut conversation = Conversation::new();
        conversation.extend(self.history);

        AgentSession {
            inner: Arc::new(SessionInner {
                provider: self.provider,
                context: ContextLoader::new(self.memory.clone(), settings.max_context_load_time),
                memory: self.memory,
                capabilities,
                prompt,
                servers: self.servers,
                launcher,
                events,
                settings,
                state: Mutex::new(SessionState { conversation }),
            }),
        }
    }
}

/// A conversational agent session.
pub struct AgentSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    provider: Arc<dyn Provider>,
    settings: AgentSettings,
    capabilities: CapabilityRegistry,
    prompt: PromptContext,
    context: ContextLoader,
    memory: Option<Arc<dyn MemoryStore>>,
    servers: Vec<ExternalServerSpec>,
    launcher: Arc<dyn Launcher>,
    events: Arc<EventBus>,
    state: Mutex<SessionState>,
}

struct SessionState {
    conversation: Conversation,
}

impl AgentSession {
    pub fn builder(provider: Arc<dyn Provider>, settings: AgentSettings) -> AgentSessionBuilder {
        AgentSessionBuilder::new(provider, settings)
    }

    /// Run a turn for `text` and return its messages.
    pub async fn ask(&self, text: impl Into<String>) -> Result<AgentResult, Error> {
        self.inner.run_turn(text.into(), true, None).await
    }

    /// Run a turn for `text`, yielding events as they happen.
    ///
    /// The turn runs on a spawned task. Dropping the stream before it ends
    /// stops the turn at the next event and still closes its tool servers.
    pub fn ask_stream(&self, text: impl Into<String>) -> AgentStream {
        let (tx, rx) = mpsc::channel(64);
        let (result_tx, result_rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let text = text.into();

        tokio::spawn(async move {
            let result = inner.run_turn(text, true, Some(&tx)).await;
            let _ = result_tx.send(result);
        });

        AgentStream::new(rx, result_rx)
    }

    /// Run a buffered turn carrying out `schedule`.
    pub async fn trigger_schedule(&self, schedule: &Schedule) -> Result<AgentResult, Error> {
        info!(schedule_id = %schedule.id, name = %schedule.name, "Running scheduled turn");
        self.inner.events.publish(DomainEvent::ScheduleTriggered {
            schedule_id: schedule.id.clone(),
            timestamp: Utc::now(),
        });
        let text = self.schedule_prompt(schedule);
        self.inner.run_turn(text, false, None).await
    }

    /// Names of the enabled skills, in enable order.
    pub async fn enabled_skills(&self) -> Vec<String> {
        self.inner.capabilities.skills().enabled_names().await
    }

    /// The system prompt the next step would use.
    pub async fn system_prompt(&self) -> String {
        let enabled = self.inner.capabilities.skills().enabled().await;
        self.inner.prompt.render(&Utc::now(), &enabled)
    }

    /// The user turn [`trigger_schedule`](Self::trigger_schedule) would submit now.
    pub fn schedule_prompt(&self, schedule: &Schedule) -> String {
        schedule_prompt(schedule, &Utc::now(), &self.inner.settings.locale)
    }

    /// The full conversation so far.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.state.lock().await.conversation.messages.clone()
    }

    /// The bus carrying this session's domain events.
    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.inner.events)
    }
}

impl SessionInner {
    async fn run_turn(
        &self,
        text: String,
        load_context: bool,
        sink: Option<&mpsc::Sender<AgentStreamEvent>>,
    ) -> Result<AgentResult, Error> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let started = Utc::now();

        if load_context {
            self.context.load(&mut state.conversation, started).await;
        }

        let turn_start = state.conversation.len();
        state.conversation.push(Message::user(text));
        info!(
            messages = state.conversation.len(),
            streaming = sink.is_some(),
            "Processing turn"
        );

        let connections =
            McpConnections::launch(self.launcher.as_ref(), &self.servers, Some(Arc::clone(&self.events)))
                .await;
        let external = connections.discover();

        let steps = StepLoop {
            provider: self.provider.as_ref(),
            model: &self.settings.model,
            max_steps: self.settings.max_steps,
            prompt: &self.prompt,
            capabilities: &self.capabilities,
            external: &external,
            events: &self.events,
            sink,
        };
        let outcome = steps.run(&mut state.conversation).await;
        drop(external);
        connections.close_all().await;

        let messages = state.conversation.since(turn_start).to_vec();

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(StepFailure { steps, error: e }) => {
                warn!(steps, error = %e, "Turn failed");
                self.events.publish(DomainEvent::TurnCompleted {
                    steps,
                    messages: messages.len(),
                    success: false,
                    timestamp: Utc::now(),
                });
                if let Some(sink) = sink {
                    let _ = sink
                        .send(AgentStreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                }
                return Err(e);
            }
        };

        if outcome.finish != Finish::Cancelled {
            self.persist(started, &messages).await;
        } else {
            debug!(steps = outcome.steps, "Streaming consumer left, turn not persisted");
        }

        let skills = self.capabilities.skills().enabled_names().await;
        info!(
            steps = outcome.steps,
            messages = messages.len(),
            truncated = outcome.finish == Finish::StepLimit,
            "Turn complete"
        );
        self.events.publish(DomainEvent::TurnCompleted {
            steps: outcome.steps,
            messages: messages.len(),
            success: true,
            timestamp: Utc::now(),
        });
        if let Some(sink) = sink {
            let _ = sink
                .send(AgentStreamEvent::Done {
                    steps: outcome.steps,
                    messages: messages.len(),
                    truncated: outcome.finish == Finish::StepLimit,
                    usage: outcome.usage,
                })
                .await;
        }

        Ok(AgentResult { messages, skills })
    }

    async fn persist(&self, started: DateTime<Utc>, messages: &[Message]) {
        let Some(store) = &self.memory else {
            return;
        };
        if !self.settings.persist_turns || messages.is_empty() {
            return;
        }

        let unit = MemoryUnit::new(started, messages.to_vec()).with_owner(self.settings.owner_id.clone());
        match store.store(unit).await {
            Ok(()) => debug!(store = store.name(), messages = messages.len(), "Turn persisted"),
            Err(e) => warn!(store = store.name(), error = %e, "Failed to persist turn"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use futures::StreamExt;
    use memoh_core::error::ProviderError;
    use memoh_core::Role;
    use memoh_memory::InMemoryStore;

    fn cook() -> Skill {
        Skill::new("cook", "Kitchen help", "Answer as a chef.")
    }

    fn session(provider: Arc<SequentialMockProvider>) -> AgentSession {
        AgentSession::builder(provider, AgentSettings::default())
            .with_skills(vec![cook()], &[])
            .build()
    }

    #[tokio::test]
    async fn simple_text_turn() {
        let provider = Arc::new(SequentialMockProvider::single_text("Hello!"));
        let agent = session(provider.clone());

        let result = agent.ask("Hi").await.unwrap();

        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.messages[0].role, Role::User);
        assert_eq!(result.messages[1].content, "Hello!");
        assert!(result.skills.is_empty());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn skill_instructions_reach_the_next_step() {
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![make_tool_call("use-skill-cook", serde_json::json!({}))],
            "",
            "Two eggs, one pan.",
        ));
        let agent = session(provider.clone());

        let result = agent.ask("How do I make an omelette?").await.unwrap();

        assert_eq!(result.skills, vec!["cook"]);
        let requests = provider.requests();
        assert!(!requests[0].system.contains("Answer as a chef."));
        assert!(requests[1].system.contains("Answer as a chef."));
        assert_eq!(agent.enabled_skills().await, vec!["cook"]);
    }

    #[tokio::test]
    async fn tool_failure_is_reported_to_the_model() {
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![make_tool_call("no-such-tool", serde_json::json!({}))],
            "",
            "Sorry.",
        ));
        let agent = session(provider);

        let result = agent.ask("Do the thing").await.unwrap();

        let tool_msg = &result.messages[2];
        assert_eq!(tool_msg.role, Role::Tool);
        assert!(tool_msg.content.starts_with("Error: Tool not found"));
        assert_eq!(result.messages[3].content, "Sorry.");
    }

    #[tokio::test]
    async fn step_bound_truncates_without_error() {
        let looping = (0..5)
            .map(|_| make_tool_call_response(vec![make_tool_call("list-schedules", serde_json::json!({}))], ""))
            .collect();
        let provider = Arc::new(SequentialMockProvider::new(looping));
        let settings = AgentSettings {
            max_steps: 3,
            ..Default::default()
        };
        let agent = AgentSession::builder(provider.clone(), settings).build();

        let result = agent.ask("loop forever").await.unwrap();

        assert_eq!(provider.call_count(), 3);
        let dispatched = result.messages.iter().filter(|m| m.role == Role::Tool).count();
        assert_eq!(dispatched, 3);
    }

    #[tokio::test]
    async fn provider_failure_rejects_the_turn() {
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let agent = AgentSession::builder(provider, AgentSettings::default()).build();

        let err = agent.ask("Hi").await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::ApiError { .. })));
        // The user turn stays in history
        assert_eq!(agent.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn malformed_call_rejects_the_response_before_any_call_runs() {
        let bad = memoh_core::MessageToolCall {
            id: "c2".into(),
            name: "create-schedule".into(),
            arguments: "{oops".into(),
        };
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![
                    make_tool_call(
                        "create-schedule",
                        serde_json::json!({ "name": "tea", "pattern": "0 9 * * *", "command": "Brew tea" }),
                    ),
                    bad,
                ],
                "",
            ),
            make_text_response("second"),
        ]));
        let schedules = InMemoryScheduleStore::new();
        let agent = AgentSession::builder(provider.clone(), AgentSettings::default())
            .with_schedule_store(Arc::new(schedules.clone()))
            .build();

        let err = agent.ask("one").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::MalformedToolCall { ref tool_name, .. }) if tool_name == "create-schedule"
        ));
        assert!(schedules.list().await.unwrap().is_empty());

        agent.ask("two").await.unwrap();
        let sent = &provider.requests()[1].messages;
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.role == Role::User && m.tool_calls.is_empty()));
        assert_eq!(sent[1].content, "two");
    }

    #[tokio::test]
    async fn failed_turn_reports_the_steps_it_ran() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![make_tool_call("list-schedules", serde_json::json!({}))], ""),
            make_tool_call_response(vec![make_tool_call("list-schedules", serde_json::json!({}))], ""),
        ]));
        let agent = AgentSession::builder(provider, AgentSettings::default()).build();
        let mut events = agent.events().subscribe();

        assert!(agent.ask("loop").await.is_err());

        let mut reported = None;
        while let Ok(event) = events.try_recv() {
            if let DomainEvent::TurnCompleted { steps, success: false, .. } = event.as_ref() {
                reported = Some(*steps);
            }
        }
        assert_eq!(reported, Some(3));
    }

    #[tokio::test]
    async fn context_is_loaded_once_and_turns_persist() {
        let store = Arc::new(InMemoryStore::with_units(vec![MemoryUnit::new(
            Utc::now() - chrono::Duration::minutes(30),
            vec![Message::user("I like tea"), Message::assistant("Noted.")],
        )]));
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_text_response("first"),
            make_text_response("second"),
        ]));
        let agent = AgentSession::builder(provider.clone(), AgentSettings::default())
            .with_memory(store.clone())
            .build();

        agent.ask("one").await.unwrap();
        agent.ask("two").await.unwrap();

        let contents: Vec<String> = agent.messages().await.into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["I like tea", "Noted.", "one", "first", "two", "second"]);
        assert_eq!(provider.requests()[0].messages.len(), 3);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn memory_written_between_turns_follows_earlier_turns() {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_text_response("first"),
            make_text_response("second"),
        ]));
        let agent = AgentSession::builder(provider.clone(), AgentSettings::default())
            .with_memory(store.clone())
            .build();

        agent.ask("one").await.unwrap();
        store
            .store(MemoryUnit::new(Utc::now(), vec![Message::user("written later")]))
            .await
            .unwrap();
        agent.ask("two").await.unwrap();

        let contents: Vec<String> = agent.messages().await.into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["one", "first", "written later", "two", "second"]);
        let sent: Vec<String> = provider.requests()[1]
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(sent, vec!["one", "first", "written later", "two"]);
    }

    #[tokio::test]
    async fn schedule_trigger_skips_context_load() {
        let store = Arc::new(InMemoryStore::with_units(vec![MemoryUnit::new(
            Utc::now() - chrono::Duration::minutes(5),
            vec![Message::user("earlier")],
        )]));
        let provider = Arc::new(SequentialMockProvider::single_text("Done."));
        let agent = AgentSession::builder(provider.clone(), AgentSettings::default())
            .with_memory(store)
            .build();

        let schedule = Schedule {
            id: "s1".into(),
            name: "brief".into(),
            description: String::new(),
            pattern: "0 9 * * *".into(),
            max_calls: None,
            calls: 1,
            command: "Send the morning brief".into(),
            created_at: Utc::now(),
        };
        let result = agent.trigger_schedule(&schedule).await.unwrap();

        assert!(result.messages[0].content.contains("Send the morning brief"));
        let requests = provider.requests();
        assert_eq!(requests[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn stream_yields_events_then_the_same_result() {
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![make_tool_call("use-skill-cook", serde_json::json!({}))],
            "",
            "Bon appétit.",
        ));
        let agent = session(provider);

        let mut stream = agent.ask_stream("Cook something");
        let mut kinds = Vec::new();
        while let Some(event) = stream.next().await {
            kinds.push(event.event_type());
        }
        let result = stream.finish().await.unwrap();

        assert_eq!(
            kinds,
            vec![
                "step_start",
                "tool_call",
                "tool_result",
                "step_finish",
                "step_start",
                "chunk",
                "done"
            ]
        );
        assert_eq!(result.skills, vec!["cook"]);
        assert_eq!(result.messages.last().unwrap().content, "Bon appétit.");
    }

    #[tokio::test]
    async fn stream_surfaces_provider_errors() {
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let agent = AgentSession::builder(provider, AgentSettings::default()).build();

        let mut stream = agent.ask_stream("Hi");
        let mut last = None;
        while let Some(event) = stream.next().await {
            last = Some(event);
        }
        assert!(matches!(last, Some(AgentStreamEvent::Error { .. })));
        assert!(stream.finish().await.is_err());
    }

    #[tokio::test]
    async fn system_prompt_reflects_enabled_skills() {
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let agent = AgentSession::builder(provider, AgentSettings::default())
            .with_skills(vec![cook()], &["cook".to_string()])
            .build();

        assert!(agent.system_prompt().await.contains("### cook"));
        assert_eq!(agent.enabled_skills().await, vec!["cook"]);
    }
}
