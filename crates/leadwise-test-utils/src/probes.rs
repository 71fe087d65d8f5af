// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router inputs that answer from flags instead of the network.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use leadwise_core::LeadwiseError;
use leadwise_router::{HealthReport, LocalCapability, RemoteProbe};

/// Health probe with switchable answers.
pub struct StaticProbe {
    remote_available: AtomicBool,
    unreachable: AtomicBool,
}

impl StaticProbe {
    pub fn new(remote_available: bool) -> Self {
        Self {
            remote_available: AtomicBool::new(remote_available),
            unreachable: AtomicBool::new(false),
        }
    }

    pub fn set_remote_available(&self, available: bool) {
        self.remote_available.store(available, Ordering::SeqCst);
    }

    /// Makes every probe fail as if the gateway were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteProbe for StaticProbe {
    async fn probe(&self) -> Result<HealthReport, LeadwiseError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(LeadwiseError::transient("health probe failed"));
        }
        let available = self.remote_available.load(Ordering::SeqCst);
        Ok(HealthReport {
            status: if available { "ok" } else { "degraded" }.to_string(),
            remote_available: available,
            providers: if available { vec!["mock".to_string()] } else { Vec::new() },
            primary: available.then(|| "mock".to_string()),
        })
    }
}

/// Local model capability fixed at construction.
pub struct StaticLocal {
    name: String,
    available: AtomicBool,
}

impl StaticLocal {
    pub fn new(name: &str, available: bool) -> Self {
        Self {
            name: name.to_string(),
            available: AtomicBool::new(available),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl LocalCapability for StaticLocal {
    fn name(&self) -> &str {
        &self.name
    }

    async fn available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
