pub mod settings;
pub mod toml_config;

use crate::domain::ports::ConfigurationSource;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Settings held in memory, for embedding the job or for tests.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl ConfigurationSource for MapSettings {
    fn get_setting(&self, name: &str) -> Result<Option<String>> {
        Ok(self.values.get(name).cloned())
    }
}
