use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account as the account store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique username, also used as the merge target key.
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub active: bool,
    pub last_modified: DateTime<Utc>,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        active: bool,
        last_modified: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            email: email.into(),
            active,
            last_modified,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// Source and target of a single merge, consumed right away by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeDecision {
    pub source_id: String,
    pub target_id: String,
}

/// Why a merge target was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetReason {
    SameDomain,
    DefaultUser,
}

/// What the loop intends to do with one eligible account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedStep {
    Merge {
        decision: MergeDecision,
        reason: TargetReason,
    },
    /// The chosen identifier does not exist in the snapshot.
    Unresolved { source_id: String, wanted_id: String },
    /// The only target on offer is the account itself.
    SelfTarget { source_id: String },
}

impl std::fmt::Display for PlannedStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge { decision, reason } => {
                let via = match reason {
                    TargetReason::SameDomain => "same domain",
                    TargetReason::DefaultUser => "default user",
                };
                write!(
                    f,
                    "merge {} into {} ({})",
                    decision.source_id, decision.target_id, via
                )
            }
            Self::Unresolved {
                source_id,
                wanted_id,
            } => write!(f, "skip {}: target {} not found", source_id, wanted_id),
            Self::SelfTarget { source_id } => {
                write!(f, "skip {}: would merge into itself", source_id)
            }
        }
    }
}

/// Result for one eligible account after execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    Merged(MergeDecision),
    Failed {
        decision: MergeDecision,
        error: String,
    },
    Unresolved { source_id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub scanned: usize,
    pub eligible: usize,
    pub merged_count: usize,
    pub failed_count: usize,
    pub unresolved_count: usize,
    pub outcomes: Vec<AccountOutcome>,
}

impl RunReport {
    pub fn record(&mut self, outcome: AccountOutcome) {
        match &outcome {
            AccountOutcome::Merged(_) => self.merged_count += 1,
            AccountOutcome::Failed { .. } => self.failed_count += 1,
            AccountOutcome::Unresolved { .. } => self.unresolved_count += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn merged(&self) -> impl Iterator<Item = &MergeDecision> {
        self.outcomes.iter().filter_map(|o| match o {
            AccountOutcome::Merged(d) => Some(d),
            _ => None,
        })
    }
}

/// Entry in the file store's merge ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    pub source: String,
    pub target: String,
    pub merged_at: DateTime<Utc>,
}
