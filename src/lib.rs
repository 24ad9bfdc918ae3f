pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileCredentialStore, MemoryCredentialStore, RecordingNavigator};
pub use config::ClientConfig;
pub use crate::core::{http_client::ApiClient, list_state::ListQuery, session::SessionManager};
pub use utils::error::{ClientError, Result};
