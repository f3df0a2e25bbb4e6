//! Interaction callback registry.
//!
//! A pub/sub facility keyed by a closed enumeration of user interactions
//! (viewing the topology during analysis, opening alert details, ...).
//! External handlers are notified when an interaction occurs; the
//! sequencing logic itself never depends on this.
//!
//! The registry is an explicit object constructed once at the composition
//! root and passed to whichever component needs to publish or subscribe —
//! there is no ambient global instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The user interactions external handlers can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Topology opened while the analysis stage is active
    #[serde(rename = "browse-topology-analysis")]
    BrowseTopologyAnalysis,
    /// Topology opened while the verification stage is active
    #[serde(rename = "browse-topology-verification")]
    BrowseTopologyVerification,
    /// Alert monitor opened
    #[serde(rename = "browse-alerts")]
    BrowseAlerts,
    /// A single alert expanded for details
    #[serde(rename = "click-alert-details")]
    ClickAlertDetails,
}

impl InteractionKind {
    pub fn all() -> &'static [InteractionKind] {
        &[
            InteractionKind::BrowseTopologyAnalysis,
            InteractionKind::BrowseTopologyVerification,
            InteractionKind::BrowseAlerts,
            InteractionKind::ClickAlertDetails,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::BrowseTopologyAnalysis => "browse-topology-analysis",
            InteractionKind::BrowseTopologyVerification => "browse-topology-verification",
            InteractionKind::BrowseAlerts => "browse-alerts",
            InteractionKind::ClickAlertDetails => "click-alert-details",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InteractionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "browse-topology-analysis" => Ok(InteractionKind::BrowseTopologyAnalysis),
            "browse-topology-verification" => Ok(InteractionKind::BrowseTopologyVerification),
            "browse-alerts" => Ok(InteractionKind::BrowseAlerts),
            "click-alert-details" => Ok(InteractionKind::ClickAlertDetails),
            _ => anyhow::bail!(
                "Invalid interaction '{}'. Valid values: browse-topology-analysis, browse-topology-verification, browse-alerts, click-alert-details",
                s
            ),
        }
    }
}

/// Payload delivered to handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionData {
    /// Name of the step during which the interaction happened
    pub step_name: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form extra context (e.g. which alert was clicked)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Handle returned by [`CallbackRegistry::register`], usable to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackId(u64);

type Handler = Arc<dyn Fn(&InteractionData) + Send + Sync>;

struct RegistryInner {
    next_id: u64,
    handlers: HashMap<InteractionKind, Vec<(CallbackId, Handler)>>,
}

/// Pub/sub registry for interaction callbacks.
pub struct CallbackRegistry {
    inner: Mutex<RegistryInner>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                next_id: 0,
                handlers: HashMap::new(),
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler for one interaction kind.
    pub fn register<F>(&self, kind: InteractionKind, handler: F) -> CallbackId
    where
        F: Fn(&InteractionData) + Send + Sync + 'static,
    {
        let mut inner = self.inner();
        inner.next_id += 1;
        let id = CallbackId(inner.next_id);
        inner
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a previously registered handler. Returns false if the id is
    /// not registered under this kind.
    pub fn unregister(&self, kind: InteractionKind, id: CallbackId) -> bool {
        let mut inner = self.inner();
        let Some(handlers) = inner.handlers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        handlers.len() != before
    }

    /// Notify every handler registered for `kind`.
    ///
    /// Handlers run in registration order. A panicking handler is caught
    /// and logged; it never prevents delivery to the remaining handlers.
    pub fn trigger(
        &self,
        kind: InteractionKind,
        step_name: &str,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) {
        let handlers: Vec<Handler> = {
            let inner = self.inner();
            inner
                .handlers
                .get(&kind)
                .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };
        if handlers.is_empty() {
            return;
        }

        let data = InteractionData {
            step_name: step_name.to_string(),
            timestamp: Utc::now(),
            metadata: metadata.unwrap_or_default(),
        };
        tracing::debug!(kind = %kind, step = step_name, handlers = handlers.len(), "interaction");

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(&data))).is_err() {
                tracing::warn!(kind = %kind, "interaction handler panicked; continuing delivery");
            }
        }
    }

    /// Number of handlers registered for `kind`.
    pub fn count(&self, kind: InteractionKind) -> usize {
        self.inner()
            .handlers
            .get(&kind)
            .map(|hs| hs.len())
            .unwrap_or(0)
    }

    /// Drop every handler of every kind.
    pub fn clear(&self) {
        self.inner().handlers.clear();
    }

    /// Drop every handler of one kind.
    pub fn clear_kind(&self, kind: InteractionKind) {
        self.inner().handlers.remove(&kind);
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
