// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session turn orchestration.
//!
//! A turn moves through Idle -> Sending -> Streaming -> Idle, or through
//! Cancelled back to Idle when the caller aborts it. Every turn ends with a
//! reply: the remote gateway is tried first (one retry), then the local
//! model, then the rules engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use leadwise_analytics::{Analytics, AnalyticsEvent};
use leadwise_config::LeadwiseConfig;
use leadwise_core::{
    ChatMessage, LeadProfile, LeadwiseError, SessionId, TextGenerator, TextStream, Tier,
};
use leadwise_lead::LeadQualifier;
use leadwise_memory::{ConversationMemory, SessionMemory};
use leadwise_providers::{OllamaGenerator, PromptBuilder, cap_history};
use leadwise_rag::KnowledgeBase;
use leadwise_router::ModelRouter;
use leadwise_rules::{RuleContext, RulesEngine};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::buffer::StreamBuffer;
use crate::state::{ChatState, DisplayMessage, MessageStatus, Phase};
use crate::transport::{ChatTransport, HttpChatTransport, RemoteReply};

/// Shown when the gateway failed twice and the rules engine answered.
pub const REMOTE_UNAVAILABLE_NOTICE: &str =
    "Our AI assistant is temporarily unavailable, so you're getting a quick answer instead.";

/// Shown when the local model failed and the rules engine answered.
pub const LOCAL_UNAVAILABLE_NOTICE: &str =
    "The on-device model couldn't answer, so you're getting a quick answer instead.";

/// Provider label attached to rules replies.
pub const RULES_PROVIDER: &str = "rules";

/// Remote attempts per turn before degrading.
const REMOTE_ATTEMPTS: u32 = 2;

/// Collaborators the orchestrator drives.
pub struct Dependencies {
    pub router: ModelRouter,
    pub transport: Arc<dyn ChatTransport>,
    pub local: Arc<dyn TextGenerator>,
    pub rules: RulesEngine,
    /// Lead scoring; also owns the conversation memory.
    pub leads: LeadQualifier,
    pub analytics: Analytics,
    /// Prompt assembly for the local tier.
    pub prompts: PromptBuilder,
}

/// How a call to [`Orchestrator::send_message`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed {
        reply: String,
        tier: Tier,
        provider: Option<String>,
    },
    Cancelled,
}

struct Reply {
    text: String,
    tier: Tier,
    provider: Option<String>,
}

enum Step {
    Reply(Reply),
    Cancelled,
}

enum Pumped {
    Done(String),
    Cancelled,
}

/// Drives one visitor session: routing, streaming, fallback and bookkeeping.
pub struct Orchestrator {
    session: SessionId,
    deps: Dependencies,
    flush_interval: Duration,
    max_history: usize,
    state: watch::Sender<ChatState>,
    busy: AtomicBool,
    current: Mutex<Option<CancellationToken>>,
}

/// Releases the in-flight flag however the turn ends.
struct TurnGuard<'a> {
    orchestrator: &'a Orchestrator,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.current_slot().take();
        self.orchestrator.state.send_modify(|s| {
            s.is_loading = false;
            s.phase = Phase::Idle;
        });
        self.orchestrator.busy.store(false, Ordering::Release);
    }
}

impl Orchestrator {
    pub fn new(session: SessionId, deps: Dependencies, flush_interval: Duration) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self {
            session,
            deps,
            flush_interval,
            max_history: 20,
            state,
            busy: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    /// Messages sent to a model per turn, oldest dropped first.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        self
    }

    /// Wires the HTTP transport, Ollama and in-memory stores from config.
    pub fn from_config(config: &LeadwiseConfig, session: SessionId) -> Result<Self, LeadwiseError> {
        let request_timeout = Duration::from_secs(config.client.request_timeout_secs);
        let memory = ConversationMemory::default();
        let leads = LeadQualifier::in_memory(memory);
        let analytics = Analytics::in_memory(leads.clone());
        let knowledge = KnowledgeBase::default().with_top_k(config.rag.top_k);

        let deps = Dependencies {
            router: ModelRouter::from_config(&config.client, &config.local)?,
            transport: Arc::new(HttpChatTransport::new(&config.client)?),
            local: Arc::new(OllamaGenerator::new(&config.local, request_timeout)?),
            rules: RulesEngine::in_memory(config.rules.history_size, config.rules.contact_email.clone())
                .with_knowledge(knowledge, config.rag.min_confidence),
            leads,
            analytics,
            prompts: PromptBuilder::from_config(config),
        };
        Ok(Self::new(
            session,
            deps,
            Duration::from_millis(config.client.flush_interval_ms),
        )
        .with_max_history(config.server.max_history))
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> ChatState {
        self.state.borrow().clone()
    }

    pub fn memory(&self) -> &ConversationMemory {
        self.deps.leads.memory()
    }

    pub fn analytics(&self) -> &Analytics {
        &self.deps.analytics
    }

    /// The session's lead profile, once a turn has completed.
    pub async fn lead(&self) -> Result<Option<LeadProfile>, LeadwiseError> {
        self.deps.leads.get_lead(&self.session).await
    }

    /// Aborts the in-flight turn. Returns false when nothing was running.
    pub fn cancel(&self) -> bool {
        match self.current_slot().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Runs one visitor turn to completion or cancellation.
    ///
    /// Rejects blank text and overlapping calls. Any failure after the user
    /// message is accepted degrades to a lower tier instead of surfacing.
    pub async fn send_message(&self, text: &str) -> Result<TurnOutcome, LeadwiseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LeadwiseError::InvalidRequest("message is empty".into()));
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LeadwiseError::Busy);
        }
        let token = CancellationToken::new();
        *self.current_slot() = Some(token.clone());
        let _guard = TurnGuard { orchestrator: self };

        self.run_turn(text, &token).await
    }

    async fn run_turn(
        &self,
        text: &str,
        token: &CancellationToken,
    ) -> Result<TurnOutcome, LeadwiseError> {
        let started = Instant::now();
        self.state.send_modify(|s| {
            s.messages.push(DisplayMessage::user(text));
            s.is_loading = true;
            s.error = None;
            s.phase = Phase::Sending;
        });
        self.record(AnalyticsEvent::MessageSent {
            chars: text.chars().count(),
        })
        .await;

        let placeholder = DisplayMessage::placeholder();
        let placeholder_id = placeholder.id.clone();
        self.state.send_modify(|s| s.messages.push(placeholder));

        let choice = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(self.finish_cancelled(&placeholder_id).await),
            choice = self.deps.router.choose_model() => choice,
        };
        info!(
            session_id = %self.session,
            tier = %choice.tier,
            reason = choice.reason,
            "turn routed"
        );

        let step = match choice.tier {
            Tier::Remote => self.via_remote(text, &placeholder_id, token).await,
            Tier::Local => self.via_local(text, &placeholder_id, token).await,
            Tier::Rules => self.via_rules(text).await.map(Step::Reply),
        };

        match step {
            Ok(Step::Reply(reply)) => {
                if reply.tier != choice.tier {
                    self.record(AnalyticsEvent::FallbackUsed {
                        from: choice.tier,
                        to: reply.tier,
                    })
                    .await;
                }
                Ok(self.finish_reply(text, reply, &placeholder_id, started).await)
            }
            Ok(Step::Cancelled) => Ok(self.finish_cancelled(&placeholder_id).await),
            Err(err) => {
                warn!(session_id = %self.session, error = %err, "turn failed");
                self.state.send_modify(|s| {
                    s.messages.retain(|m| m.id != placeholder_id);
                    s.error = Some("Something went wrong. Please try again.".into());
                });
                Err(err)
            }
        }
    }

    async fn via_remote(
        &self,
        text: &str,
        placeholder: &str,
        token: &CancellationToken,
    ) -> Result<Step, LeadwiseError> {
        let input = self.model_input(text).await;
        for attempt in 1..=REMOTE_ATTEMPTS {
            let reply = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(Step::Cancelled),
                reply = self.deps.transport.send(&self.session, &input) => reply,
            };
            let failure = match reply {
                Ok(RemoteReply::Fallback) => {
                    info!(session_id = %self.session, "gateway has no provider, degrading");
                    return self.without_remote(text, placeholder, token).await;
                }
                Ok(RemoteReply::Stream { provider, stream }) => {
                    match self.pump(stream, placeholder, token).await {
                        Ok(Pumped::Cancelled) => return Ok(Step::Cancelled),
                        Ok(Pumped::Done(reply)) if !reply.trim().is_empty() => {
                            return Ok(Step::Reply(Reply {
                                text: reply,
                                tier: Tier::Remote,
                                provider: Some(provider),
                            }));
                        }
                        Ok(Pumped::Done(_)) => LeadwiseError::transient("empty reply"),
                        Err(err) => err,
                    }
                }
                Err(err) => err,
            };
            let retryable = failure.is_retryable();
            warn!(
                session_id = %self.session,
                attempt,
                retryable,
                error = %failure,
                "remote attempt failed"
            );
            self.reset_placeholder(placeholder);
            if !retryable {
                break;
            }
        }

        self.state
            .send_modify(|s| s.error = Some(REMOTE_UNAVAILABLE_NOTICE.into()));
        self.via_rules(text).await.map(Step::Reply)
    }

    /// The gateway answered but has no provider: local if usable, else rules.
    async fn without_remote(
        &self,
        text: &str,
        placeholder: &str,
        token: &CancellationToken,
    ) -> Result<Step, LeadwiseError> {
        if self.deps.router.local_available().await {
            self.via_local(text, placeholder, token).await
        } else {
            self.via_rules(text).await.map(Step::Reply)
        }
    }

    async fn via_local(
        &self,
        text: &str,
        placeholder: &str,
        token: &CancellationToken,
    ) -> Result<Step, LeadwiseError> {
        let industry = self
            .session_memory()
            .await
            .and_then(|memory| memory.profile.industry);
        let prompt = self
            .deps
            .prompts
            .prepare(&self.model_input(text).await, industry.as_deref());
        let attempt: Result<Pumped, LeadwiseError> = async {
            let stream = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(Pumped::Cancelled),
                stream = self.deps.local.generate(&prompt.messages, Some(&prompt.system)) => stream?,
            };
            self.pump(stream, placeholder, token).await
        }
        .await;

        match attempt {
            Ok(Pumped::Cancelled) => return Ok(Step::Cancelled),
            Ok(Pumped::Done(reply)) if !reply.trim().is_empty() => {
                return Ok(Step::Reply(Reply {
                    text: reply,
                    tier: Tier::Local,
                    provider: Some(self.deps.local.name().to_string()),
                }));
            }
            Ok(Pumped::Done(_)) => {
                warn!(session_id = %self.session, "local model returned nothing");
            }
            Err(err) => {
                warn!(session_id = %self.session, error = %err, "local model failed");
            }
        }
        self.reset_placeholder(placeholder);
        self.state
            .send_modify(|s| s.error = Some(LOCAL_UNAVAILABLE_NOTICE.into()));
        self.via_rules(text).await.map(Step::Reply)
    }

    async fn via_rules(&self, text: &str) -> Result<Reply, LeadwiseError> {
        let memory = self.session_memory().await;
        let context = RuleContext {
            prior_turns: memory.as_ref().map_or(0, |m| m.turns.len()),
            industry: memory.as_ref().and_then(|m| m.profile.industry.as_deref()),
        };
        let reply = self.deps.rules.respond(&self.session, text, context).await?;
        debug!(
            session_id = %self.session,
            family = %reply.family,
            document = reply.document.as_deref(),
            "rules reply"
        );
        Ok(Reply {
            text: reply.text,
            tier: Tier::Rules,
            provider: Some(RULES_PROVIDER.to_string()),
        })
    }

    /// Copies stream chunks into the placeholder at the flush cadence.
    async fn pump(
        &self,
        mut stream: TextStream,
        placeholder: &str,
        token: &CancellationToken,
    ) -> Result<Pumped, LeadwiseError> {
        let mut buffer = StreamBuffer::new(self.flush_interval);
        let mut ticker = tokio::time::interval(self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut full = String::new();

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    if let Some(rest) = buffer.flush() {
                        self.append(placeholder, &rest);
                    }
                    return Ok(Pumped::Cancelled);
                }
                _ = ticker.tick() => {
                    if let Some(due) = buffer.take_if_due(Instant::now()) {
                        self.append(placeholder, &due);
                    }
                }
                item = stream.next() => match item {
                    Some(Ok(chunk)) => {
                        if full.is_empty() && !chunk.is_empty() {
                            self.state.send_modify(|s| s.phase = Phase::Streaming);
                        }
                        full.push_str(&chunk);
                        buffer.push(&chunk);
                    }
                    Some(Err(err)) => return Err(err),
                    None => {
                        if let Some(rest) = buffer.flush() {
                            self.append(placeholder, &rest);
                        }
                        return Ok(Pumped::Done(full));
                    }
                },
            }
        }
    }

    fn append(&self, placeholder: &str, text: &str) {
        self.state.send_modify(|s| {
            if let Some(message) = s.messages.iter_mut().find(|m| m.id == placeholder) {
                message.content.push_str(text);
            }
        });
    }

    fn reset_placeholder(&self, placeholder: &str) {
        self.state.send_modify(|s| {
            if let Some(message) = s.messages.iter_mut().find(|m| m.id == placeholder) {
                message.content.clear();
            }
            s.phase = Phase::Sending;
        });
    }

    async fn finish_reply(
        &self,
        user_text: &str,
        reply: Reply,
        placeholder: &str,
        started: Instant,
    ) -> TurnOutcome {
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.state.send_modify(|s| {
            if let Some(message) = s.messages.iter_mut().find(|m| m.id == placeholder) {
                message.id = uuid::Uuid::new_v4().to_string();
                message.content = reply.text.clone();
                message.status = MessageStatus::Complete;
                message.provider = reply.provider.clone();
                message.tier = Some(reply.tier);
            }
            s.active_provider = reply.provider.clone();
        });

        self.record(AnalyticsEvent::ResponseCompleted {
            tier: reply.tier,
            provider: reply.provider.clone(),
            latency_ms,
            chars: reply.text.chars().count(),
        })
        .await;

        if let Err(err) = self
            .memory()
            .record_exchange(&self.session, user_text, &reply.text)
            .await
        {
            warn!(session_id = %self.session, error = %err, "failed to record turn");
        } else {
            match self.deps.leads.update_lead(&self.session).await {
                Ok(lead) => {
                    self.record(AnalyticsEvent::LeadUpdated {
                        score: lead.score,
                        level: lead.level,
                    })
                    .await;
                }
                Err(err) => warn!(session_id = %self.session, error = %err, "lead update failed"),
            }
        }

        info!(
            session_id = %self.session,
            tier = %reply.tier,
            provider = reply.provider.as_deref(),
            latency_ms,
            "turn completed"
        );
        TurnOutcome::Completed {
            reply: reply.text,
            tier: reply.tier,
            provider: reply.provider,
        }
    }

    /// Keeps partial text, drops an empty placeholder, skips memory updates.
    async fn finish_cancelled(&self, placeholder: &str) -> TurnOutcome {
        self.state.send_modify(|s| {
            let position = s.messages.iter().position(|m| m.id == placeholder);
            if let Some(index) = position {
                if s.messages[index].content.is_empty() {
                    s.messages.remove(index);
                } else {
                    let message = &mut s.messages[index];
                    message.id = uuid::Uuid::new_v4().to_string();
                    message.status = MessageStatus::Cancelled;
                }
            }
            s.phase = Phase::Cancelled;
        });
        self.record(AnalyticsEvent::ResponseCancelled).await;
        info!(session_id = %self.session, "turn cancelled");
        TurnOutcome::Cancelled
    }

    async fn session_memory(&self) -> Option<SessionMemory> {
        match self.memory().get_context(&self.session).await {
            Ok(memory) => memory,
            Err(err) => {
                warn!(session_id = %self.session, error = %err, "session memory unavailable");
                None
            }
        }
    }

    /// Visible history plus the memory digest, capped for the model.
    async fn model_input(&self, text: &str) -> Vec<ChatMessage> {
        let history = self.state.borrow().history();
        let mut input = Vec::with_capacity(history.len() + 1);
        match self.memory().get_relevant_context(&self.session, text).await {
            Ok(digest) if !digest.is_empty() => input.push(ChatMessage::system(digest)),
            Ok(_) => {}
            Err(err) => warn!(session_id = %self.session, error = %err, "memory digest unavailable"),
        }
        input.extend_from_slice(cap_history(&history, self.max_history));
        input
    }

    async fn record(&self, event: AnalyticsEvent) {
        if let Err(err) = self.deps.analytics.record(&self.session, event).await {
            warn!(session_id = %self.session, error = %err, "failed to record analytics event");
        }
    }

    fn current_slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use leadwise_core::Role;
    use leadwise_router::{HealthReport, LocalCapability, RemoteProbe};
    use std::sync::atomic::AtomicUsize;

    struct Probe(bool);

    #[async_trait]
    impl RemoteProbe for Probe {
        async fn probe(&self) -> Result<HealthReport, LeadwiseError> {
            Ok(HealthReport {
                status: "ok".into(),
                remote_available: self.0,
                providers: Vec::new(),
                primary: None,
            })
        }
    }

    struct NoLocal;

    #[async_trait]
    impl LocalCapability for NoLocal {
        fn name(&self) -> &str {
            "ollama"
        }
        async fn available(&self) -> bool {
            false
        }
    }

    struct Failing;

    #[async_trait]
    impl TextGenerator for Failing {
        fn name(&self) -> &str {
            "ollama"
        }
        async fn generate(
            &self,
            _messages: &[ChatMessage],
            _system: Option<&str>,
        ) -> Result<TextStream, LeadwiseError> {
            Err(LeadwiseError::transient("offline"))
        }
    }

    struct Broken(AtomicUsize);

    #[async_trait]
    impl ChatTransport for Broken {
        async fn send(
            &self,
            _session: &SessionId,
            _messages: &[ChatMessage],
        ) -> Result<RemoteReply, LeadwiseError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(LeadwiseError::transient("connection refused"))
        }
    }

    fn orchestrator(remote: bool, transport: Arc<dyn ChatTransport>) -> Orchestrator {
        let leads = LeadQualifier::in_memory(ConversationMemory::default());
        let deps = Dependencies {
            router: ModelRouter::new(Arc::new(Probe(remote)), Arc::new(NoLocal)),
            transport,
            local: Arc::new(Failing),
            rules: RulesEngine::in_memory(5, "hello@leadwise.test"),
            analytics: Analytics::in_memory(leads.clone()),
            leads,
            prompts: PromptBuilder::new("You are a test assistant.", KnowledgeBase::default(), 0.5, 20),
        };
        Orchestrator::new(SessionId::from("s"), deps, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let orch = orchestrator(false, Arc::new(Broken(AtomicUsize::new(0))));
        let err = orch.send_message("   ").await.unwrap_err();
        assert!(matches!(err, LeadwiseError::InvalidRequest(_)));
        assert!(orch.state().messages.is_empty());
    }

    #[tokio::test]
    async fn rules_tier_answers_offline() {
        let orch = orchestrator(false, Arc::new(Broken(AtomicUsize::new(0))));
        let outcome = orch.send_message("hi").await.unwrap();
        let TurnOutcome::Completed { reply, tier, .. } = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(tier, Tier::Rules);
        assert_eq!(reply, leadwise_rules::GREETING);

        let state = orch.state();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, Role::Assistant);
        assert!(!state.messages[1].is_placeholder());
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.is_loading);
        assert_eq!(state.active_provider.as_deref(), Some(RULES_PROVIDER));
    }

    #[tokio::test]
    async fn remote_failing_twice_degrades_to_rules() {
        let transport = Arc::new(Broken(AtomicUsize::new(0)));
        let orch = orchestrator(true, transport.clone());
        let outcome = orch.send_message("how much does a chatbot cost").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Completed { tier: Tier::Rules, .. }));
        assert_eq!(transport.0.load(Ordering::SeqCst), 2);
        assert_eq!(orch.state().error.as_deref(), Some(REMOTE_UNAVAILABLE_NOTICE));

        let events = orch.analytics().events(orch.session()).await.unwrap();
        assert!(events.iter().any(|e| matches!(
            e.event,
            AnalyticsEvent::FallbackUsed { from: Tier::Remote, to: Tier::Rules }
        )));
    }

    #[tokio::test]
    async fn completed_turn_updates_memory_and_lead() {
        let orch = orchestrator(false, Arc::new(Broken(AtomicUsize::new(0))));
        orch.send_message("I'm the CEO of a saas company").await.unwrap();
        let memory = orch.memory().get_context(orch.session()).await.unwrap().unwrap();
        assert_eq!(memory.turns.len(), 1);
        assert!(orch.lead().await.unwrap().is_some());
    }

    #[test]
    fn cancel_without_turn_is_noop() {
        let orch = orchestrator(false, Arc::new(Broken(AtomicUsize::new(0))));
        assert!(!orch.cancel());
    }
}
