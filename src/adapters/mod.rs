// Adapters layer: concrete account stores behind the AccountStore port.

pub mod json_file;
pub mod memory;

pub use json_file::{AccountsDocument, JsonFileAccountStore};
pub use memory::InMemoryAccountStore;
