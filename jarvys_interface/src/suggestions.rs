//! In-process suggestion board. Datastore rows seed it; approvals and
//! rejections decided here are terminal and survive later merges, so a
//! stale datastore read can never resurrect a decided suggestion.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::types::{Suggestion, SuggestionStatus};

/// Result of applying a validation action to a suggestion.
#[derive(Debug, Clone)]
pub enum ValidateOutcome {
    /// Transitioned pending -> approved/rejected.
    Applied(Suggestion),
    /// Already terminal. Reports the unchanged suggestion; concurrent
    /// viewers racing to validate must both get a success.
    Noop(Suggestion),
    /// No suggestion with that id is tracked here.
    Unknown,
}

#[derive(Default)]
pub struct SuggestionBoard {
    entries: RwLock<HashMap<String, Suggestion>>,
}

impl SuggestionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in rows read from the datastore. A suggestion already decided
    /// locally keeps its terminal status regardless of what the row says.
    pub async fn merge(&self, remote: Vec<Suggestion>) {
        let mut entries = self.entries.write().await;
        for suggestion in remote {
            let decided = entries
                .get(&suggestion.id)
                .is_some_and(|existing| existing.status != SuggestionStatus::Pending);
            if !decided {
                entries.insert(suggestion.id.clone(), suggestion);
            }
        }
    }

    /// Every tracked suggestion, newest first, unfiltered. Callers filter
    /// by status themselves.
    pub async fn all(&self) -> Vec<Suggestion> {
        let entries = self.entries.read().await;
        let mut list: Vec<Suggestion> = entries.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    /// Pending -> approved/rejected, terminal. Approving may carry a revised
    /// priority. Any action on an already-terminal suggestion is a no-op.
    pub async fn validate(
        &self,
        id: &str,
        target: SuggestionStatus,
        priority: Option<u8>,
    ) -> ValidateOutcome {
        let mut entries = self.entries.write().await;
        let Some(suggestion) = entries.get_mut(id) else {
            return ValidateOutcome::Unknown;
        };
        match suggestion.status {
            SuggestionStatus::Pending => {
                suggestion.status = target;
                if target == SuggestionStatus::Approved {
                    if let Some(priority) = priority {
                        suggestion.priority = priority;
                    }
                }
                ValidateOutcome::Applied(suggestion.clone())
            }
            _ => ValidateOutcome::Noop(suggestion.clone()),
        }
    }
}
