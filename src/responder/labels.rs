//! Resolves the marker label to a single remote id.
//!
//! Creation is attempted first. A conflict means another run (or another
//! process) already created the label, so the existing one is looked up by
//! name and reused. Resolved ids are remembered for the life of the registry.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::api::models::{Label, LabelSpec};
use crate::error::{AppError, AppResult};
use crate::gateway::MailboxGateway;

pub struct LabelRegistry<'a, G: ?Sized> {
    gateway: &'a G,
    resolved: Mutex<HashMap<String, String>>,
}

impl<'a, G: MailboxGateway + ?Sized> LabelRegistry<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the id of the label called `name`, creating it when missing.
    pub async fn ensure_label(&self, name: &str) -> AppResult<String> {
        if let Some(id) = self.cached(name) {
            return Ok(id);
        }

        let id = match self.gateway.create_label(&LabelSpec::visible(name)).await {
            Ok(label) => {
                info!(label = name, label_id = %label.id, "created marker label");
                label.id
            }
            Err(AppError::Conflict(reason)) => {
                debug!(label = name, %reason, "label exists, resolving by name");
                let labels = self.gateway.list_labels().await?;
                find_by_name(&labels, name).ok_or_else(|| {
                    AppError::Api(format!(
                        "label `{name}` conflicts on create but is missing from the label list"
                    ))
                })?
            }
            Err(err) => return Err(err),
        };

        self.remember(name, &id);
        Ok(id)
    }

    /// Drops a remembered id, e.g. after the label was deleted remotely.
    pub fn forget(&self, name: &str) {
        if let Ok(mut resolved) = self.resolved.lock() {
            resolved.remove(name);
        }
    }

    fn cached(&self, name: &str) -> Option<String> {
        self.resolved.lock().ok()?.get(name).cloned()
    }

    fn remember(&self, name: &str, id: &str) {
        if let Ok(mut resolved) = self.resolved.lock() {
            resolved.insert(name.to_string(), id.to_string());
        }
    }
}

// gmail compares label names case-insensitively, so fall back to that
fn find_by_name(labels: &[Label], name: &str) -> Option<String> {
    labels
        .iter()
        .find(|label| label.name == name)
        .or_else(|| {
            labels
                .iter()
                .find(|label| label.name.eq_ignore_ascii_case(name))
        })
        .map(|label| label.id.clone())
}
