pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{InMemoryAccountStore, JsonFileAccountStore};
pub use config::{settings::MergeSettings, toml_config::SettingsFile, toml_config::TomlConfig, MapSettings};
pub use crate::core::{
    merge_job::{plan, MergeJob},
    timer::{TimerEngine, TimerSchedule},
};
pub use domain::model::{Account, AccountOutcome, MergeDecision, PlannedStep, RunReport};
pub use domain::ports::{AccountStore, Clock, ConfigurationSource, FixedClock, SystemClock, TimerJob};
pub use utils::error::{MergeUserError, Result};
