//! Per-eval dispatch: credential gate, category routing, adapter invocation.

use crate::registry::AdapterRegistry;
use crate::runner::{ProgressEvent, ProgressSender};
use crate::types::{EvalRecord, Verdict, is_known_category};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

/// Answers whether a credential variable is present.
///
/// Only presence matters; the value is never read by the harness.
pub trait CredentialSource: Send + Sync {
    fn is_set(&self, name: &str) -> bool;
}

/// Looks credentials up in the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn is_set(&self, name: &str) -> bool {
        std::env::var_os(name).is_some()
    }
}

impl CredentialSource for HashSet<String> {
    fn is_set(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Routes each eval to its category adapter and always yields one verdict.
pub struct Dispatcher {
    registry: AdapterRegistry,
    credentials: Box<dyn CredentialSource>,
}

impl Dispatcher {
    /// Dispatcher that checks credentials against the process environment.
    #[must_use]
    pub fn new(registry: AdapterRegistry) -> Self {
        Self {
            registry,
            credentials: Box::new(ProcessEnv),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.credentials = Box::new(credentials);
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Skip verdict when the eval names a credential that is not set.
    #[must_use]
    pub fn check_credentials(&self, eval: &EvalRecord) -> Option<Verdict> {
        let key = eval.requires_key.as_deref()?;
        if self.credentials.is_set(key) {
            None
        } else {
            Some(Verdict::skip(format!("{key} not set")))
        }
    }

    /// Run one eval. Never fails: adapter errors and panics become fail
    /// verdicts, and missing credentials or adapters become skips.
    pub async fn dispatch(&self, eval: &EvalRecord, progress: Option<&ProgressSender>) -> Verdict {
        if let Some(skip) = self.check_credentials(eval) {
            debug!(id = %eval.id, "credential missing, skipping");
            return skip;
        }

        if let Some(tx) = progress {
            let _ = tx.send(ProgressEvent::EvalDispatched {
                id: eval.id.clone(),
                given: eval.given.clone(),
                when: eval.when.clone(),
                then: eval.then.clone(),
            });
        }

        let Some(adapter) = self.registry.get(&eval.category) else {
            return unroutable(&eval.category);
        };

        debug!(id = %eval.id, category = %eval.category, "invoking adapter");
        match AssertUnwindSafe(adapter.evaluate(eval)).catch_unwind().await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!(id = %eval.id, error = %e, "adapter error");
                Verdict::fail(format!("adapter error: {e}"))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(id = %eval.id, panic = %message, "adapter panicked");
                Verdict::fail(format!("adapter panicked: {message}"))
            }
        }
    }
}

fn unroutable(category: &str) -> Verdict {
    if is_known_category(category) {
        Verdict::skip(format!("No adapter registered for category: {category}"))
    } else {
        Verdict::skip(format!("Unknown category: {category}"))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
