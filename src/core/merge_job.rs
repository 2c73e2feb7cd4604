//! The merge loop: find disabled accounts past the threshold and fold each of
//! them into an active account.
//!
//! [`plan`] is the pure half and does no I/O. [`MergeJob::run_once`]
//! reads the settings and the account snapshot, plans, then hands every
//! decision to the store one at a time.

use crate::config::settings::MergeSettings;
use crate::core::eligibility::is_eligible;
use crate::core::matching::select_candidates;
use crate::core::timer::TimerSchedule;
use crate::domain::model::{
    Account, AccountOutcome, MergeDecision, PlannedStep, RunReport, TargetReason,
};
use crate::domain::ports::{AccountStore, Clock, ConfigurationSource, SystemClock, TimerJob};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_JOB_NAME: &str = "merge-user";

/// Identifier lookup for one run. On duplicate identifiers the account seen
/// first in the snapshot wins.
fn index_by_id(accounts: &[Account]) -> HashMap<&str, &Account> {
    let mut index = HashMap::with_capacity(accounts.len());
    for account in accounts {
        index.entry(account.id.as_str()).or_insert(account);
    }
    index
}

/// Decide what to do with every eligible account in `accounts`, in
/// snapshot order.
pub fn plan(
    accounts: &[Account],
    settings: &MergeSettings,
    now: DateTime<Utc>,
) -> Vec<PlannedStep> {
    let by_id = index_by_id(accounts);
    let active: Vec<&Account> = accounts.iter().filter(|a| a.active).collect();

    accounts
        .iter()
        .filter(|account| is_eligible(account, now, settings.threshold_days))
        .map(|source| {
            let candidates = select_candidates(source, active.iter().copied());
            let (wanted, reason) = match candidates.first() {
                Some(first) => (*first, TargetReason::SameDomain),
                None => (settings.default_user.as_str(), TargetReason::DefaultUser),
            };

            match by_id.get(wanted) {
                None => PlannedStep::Unresolved {
                    source_id: source.id.clone(),
                    wanted_id: wanted.to_string(),
                },
                Some(target) if target.id == source.id => PlannedStep::SelfTarget {
                    source_id: source.id.clone(),
                },
                Some(target) => PlannedStep::Merge {
                    decision: MergeDecision {
                        source_id: source.id.clone(),
                        target_id: target.id.clone(),
                    },
                    reason,
                },
            }
        })
        .collect()
}

pub struct MergeJob<S, C, K = SystemClock> {
    name: String,
    store: S,
    settings: C,
    clock: K,
    schedule: TimerSchedule,
}

impl<S, C> MergeJob<S, C, SystemClock>
where
    S: AccountStore,
    C: ConfigurationSource,
{
    pub fn new(store: S, settings: C) -> Self {
        Self {
            name: DEFAULT_JOB_NAME.to_string(),
            store,
            settings,
            clock: SystemClock,
            schedule: TimerSchedule::default(),
        }
    }
}

impl<S, C, K> MergeJob<S, C, K>
where
    S: AccountStore,
    C: ConfigurationSource,
    K: Clock,
{
    pub fn with_clock<K2: Clock>(self, clock: K2) -> MergeJob<S, C, K2> {
        MergeJob {
            name: self.name,
            store: self.store,
            settings: self.settings,
            clock,
            schedule: self.schedule,
        }
    }

    pub fn with_schedule(mut self, schedule: TimerSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads settings and accounts, then returns the plan without executing it.
    pub async fn dry_run(&self) -> Result<Vec<PlannedStep>> {
        let settings = MergeSettings::load(&self.settings)?;
        let accounts = self.store.list_all().await?;
        Ok(plan(&accounts, &settings, self.clock.now()))
    }

    /// One full pass. Errors only for problems that stop the whole run
    /// (settings or listing); per-account failures land in the report.
    pub async fn run_once(&self) -> Result<RunReport> {
        let settings = MergeSettings::load(&self.settings)?;
        let accounts = self.store.list_all().await?;
        let now = self.clock.now();

        tracing::debug!(
            accounts = accounts.len(),
            threshold_days = settings.threshold_days,
            default_user = %settings.default_user,
            "scanning accounts"
        );

        let steps = plan(&accounts, &settings, now);
        let by_id = index_by_id(&accounts);
        let mut report = RunReport {
            scanned: accounts.len(),
            eligible: steps.len(),
            ..RunReport::default()
        };

        for step in steps {
            let outcome = match step {
                PlannedStep::Merge { decision, reason } => {
                    self.execute(decision, reason, &by_id).await
                }
                PlannedStep::Unresolved {
                    source_id,
                    wanted_id,
                } => {
                    tracing::debug!(source = %source_id, wanted = %wanted_id, "merge target not found, skipping");
                    AccountOutcome::Unresolved { source_id }
                }
                PlannedStep::SelfTarget { source_id } => {
                    tracing::warn!(source = %source_id, "default user is the disabled account itself, skipping");
                    AccountOutcome::Unresolved { source_id }
                }
            };
            report.record(outcome);
        }

        Ok(report)
    }

    async fn execute(
        &self,
        decision: MergeDecision,
        reason: TargetReason,
        by_id: &HashMap<&str, &Account>,
    ) -> AccountOutcome {
        let email_of = |id: &str| by_id.get(id).map(|a| a.email.clone()).unwrap_or_default();
        let source = by_id.get(decision.source_id.as_str());

        match self
            .store
            .merge_and_delete(&decision.target_id, &decision.source_id)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    source = %email_of(&decision.source_id),
                    target = %email_of(&decision.target_id),
                    ?reason,
                    "merged user"
                );
                tracing::info!(source = %email_of(&decision.source_id), "deleted user");
                AccountOutcome::Merged(decision)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    fatal = false,
                    source = %decision.source_id,
                    display_name = source.map(|a| a.display_name.as_str()).unwrap_or_default(),
                    target = %decision.target_id,
                    "could not merge or delete user"
                );
                AccountOutcome::Failed {
                    decision,
                    error: e.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl<S, C, K> TimerJob for MergeJob<S, C, K>
where
    S: AccountStore,
    C: ConfigurationSource,
    K: Clock,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.schedule.as_duration()
    }

    async fn run(&self) -> bool {
        match self.run_once().await {
            Ok(report) => {
                tracing::info!(
                    scanned = report.scanned,
                    eligible = report.eligible,
                    merged = report.merged_count,
                    failed = report.failed_count,
                    unresolved = report.unresolved_count,
                    "✅ merge run finished"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    fatal = true,
                    suggestion = e.recovery_suggestion(),
                    "❌ merge run aborted"
                );
                false
            }
        }
    }
}
