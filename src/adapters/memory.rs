use crate::domain::model::{Account, MergeRecord};
use crate::domain::ports::AccountStore;
use crate::utils::error::{MergeUserError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    merges: Vec<MergeRecord>,
    failing_sources: HashSet<String>,
}

/// Account store kept in memory. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryAccountStore {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                accounts,
                ..State::default()
            })),
        }
    }

    /// Makes every merge of `source_id` fail with a store error.
    pub async fn fail_merges_of(&self, source_id: impl Into<String>) {
        self.state.lock().await.failing_sources.insert(source_id.into());
    }

    pub async fn insert(&self, account: Account) {
        self.state.lock().await.accounts.push(account);
    }

    pub async fn accounts(&self) -> Vec<Account> {
        self.state.lock().await.accounts.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Account> {
        self.state
            .lock()
            .await
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub async fn merges(&self) -> Vec<MergeRecord> {
        self.state.lock().await.merges.clone()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn list_all(&self) -> Result<Vec<Account>> {
        Ok(self.accounts().await)
    }

    async fn merge_and_delete(&self, target_id: &str, source_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.failing_sources.contains(source_id) {
            return Err(MergeUserError::store(format!(
                "merge of {} was rejected",
                source_id
            )));
        }
        if target_id == source_id {
            return Err(MergeUserError::SelfMergeError {
                id: source_id.to_string(),
            });
        }
        if !state.accounts.iter().any(|a| a.id == target_id) {
            return Err(MergeUserError::AccountNotFoundError {
                id: target_id.to_string(),
            });
        }
        let position = state
            .accounts
            .iter()
            .position(|a| a.id == source_id)
            .ok_or_else(|| MergeUserError::AccountNotFoundError {
                id: source_id.to_string(),
            })?;

        state.accounts.remove(position);
        state.merges.push(MergeRecord {
            source: source_id.to_string(),
            target: target_id.to_string(),
            merged_at: Utc::now(),
        });
        Ok(())
    }
}
