use crate::domain::model::{Account, MergeRecord};
use crate::domain::ports::AccountStore;
use crate::utils::error::{MergeUserError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// On-disk layout of the account file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountsDocument {
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub merges: Vec<MergeRecord>,
}

/// Accounts kept in a single JSON file. Every merge rewrites the whole file
/// through a temporary sibling and a rename.
#[derive(Debug)]
pub struct JsonFileAccountStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileAccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<AccountsDocument> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn save(&self, document: &AccountsDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec_pretty(document)?;
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        tokio::fs::write(&temp_path, data).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for JsonFileAccountStore {
    async fn list_all(&self) -> Result<Vec<Account>> {
        Ok(self.load().await?.accounts)
    }

    async fn merge_and_delete(&self, target_id: &str, source_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if target_id == source_id {
            return Err(MergeUserError::SelfMergeError {
                id: source_id.to_string(),
            });
        }

        let mut document = self.load().await?;
        if !document.accounts.iter().any(|a| a.id == target_id) {
            return Err(MergeUserError::AccountNotFoundError {
                id: target_id.to_string(),
            });
        }
        let position = document
            .accounts
            .iter()
            .position(|a| a.id == source_id)
            .ok_or_else(|| MergeUserError::AccountNotFoundError {
                id: source_id.to_string(),
            })?;

        document.accounts.remove(position);
        document.merges.push(MergeRecord {
            source: source_id.to_string(),
            target: target_id.to_string(),
            merged_at: Utc::now(),
        });

        self.save(&document).await
    }
}
