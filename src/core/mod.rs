pub mod eligibility;
pub mod matching;
pub mod merge_job;
pub mod timer;

pub use crate::domain::model::{Account, PlannedStep, RunReport};
pub use crate::domain::ports::{AccountStore, Clock, ConfigurationSource, TimerJob};
pub use crate::utils::error::Result;
