// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An orchestrator wired to scripted collaborators.

use std::sync::Arc;
use std::time::Duration;

use leadwise_agent::{Dependencies, Orchestrator};
use leadwise_analytics::Analytics;
use leadwise_core::SessionId;
use leadwise_lead::LeadQualifier;
use leadwise_memory::ConversationMemory;
use leadwise_providers::PromptBuilder;
use leadwise_rag::KnowledgeBase;
use leadwise_router::ModelRouter;
use leadwise_rules::RulesEngine;

use crate::mock_generator::{MockGenerator, Script};
use crate::mock_transport::{MockTransport, TransportScript};
use crate::probes::{StaticLocal, StaticProbe};

/// Contact address used by harness rules engines.
pub const TEST_CONTACT_EMAIL: &str = "team@leadwise.test";

/// Builder for test orchestrators.
pub struct TestHarnessBuilder {
    remote_available: bool,
    local_available: bool,
    transport: Vec<TransportScript>,
    local: Vec<Script>,
    chunk_delay: Option<Duration>,
    flush_interval: Duration,
    history_size: usize,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            remote_available: true,
            local_available: false,
            transport: Vec::new(),
            local: Vec::new(),
            chunk_delay: None,
            flush_interval: Duration::from_millis(5),
            history_size: 5,
        }
    }

    pub fn remote_available(mut self, available: bool) -> Self {
        self.remote_available = available;
        self
    }

    pub fn local_available(mut self, available: bool) -> Self {
        self.local_available = available;
        self
    }

    /// Scripted gateway responses, one per remote attempt.
    pub fn with_remote(mut self, script: Vec<TransportScript>) -> Self {
        self.transport = script;
        self
    }

    /// Scripted local model outcomes, one per call.
    pub fn with_local(mut self, script: Vec<Script>) -> Self {
        self.local = script;
        self
    }

    /// Sleeps before every streamed chunk, remote and local.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    pub fn build(self) -> TestHarness {
        let probe = Arc::new(StaticProbe::new(self.remote_available));
        let capability = Arc::new(StaticLocal::new("ollama", self.local_available));

        let mut transport = MockTransport::new(self.transport);
        let mut local = MockGenerator::with_script("ollama", self.local);
        if let Some(delay) = self.chunk_delay {
            transport = transport.with_chunk_delay(delay);
            local = local.with_chunk_delay(delay);
        }
        let transport = Arc::new(transport);
        let local = Arc::new(local);

        let memory = ConversationMemory::default();
        let leads = LeadQualifier::in_memory(memory.clone());
        let analytics = Analytics::in_memory(leads.clone());
        let deps = Dependencies {
            router: ModelRouter::new(probe.clone(), capability.clone()),
            transport: transport.clone(),
            local: local.clone(),
            rules: RulesEngine::in_memory(self.history_size, TEST_CONTACT_EMAIL)
                .with_knowledge(KnowledgeBase::default(), 0.5),
            leads: leads.clone(),
            analytics: analytics.clone(),
            prompts: PromptBuilder::new("You are a test assistant.", KnowledgeBase::default(), 0.5, 20),
        };
        let orchestrator = Arc::new(Orchestrator::new(
            SessionId::from("test-session"),
            deps,
            self.flush_interval,
        ));

        TestHarness {
            orchestrator,
            transport,
            local,
            probe,
            capability,
            memory,
            leads,
            analytics,
        }
    }
}

/// A session orchestrator and handles to everything it talks to.
pub struct TestHarness {
    pub orchestrator: Arc<Orchestrator>,
    pub transport: Arc<MockTransport>,
    pub local: Arc<MockGenerator>,
    pub probe: Arc<StaticProbe>,
    pub capability: Arc<StaticLocal>,
    pub memory: ConversationMemory,
    pub leads: LeadQualifier,
    pub analytics: Analytics,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn session(&self) -> &SessionId {
        self.orchestrator.session()
    }
}
