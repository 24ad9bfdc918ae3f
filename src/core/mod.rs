pub mod http_client;
pub mod list_state;
pub mod resources;
pub mod routing;
pub mod session;
pub mod token;

pub use crate::domain::model::{Destination, SessionState, StoredCredentials, User};
pub use crate::domain::ports::{Clock, ConfigProvider, CredentialStore, Navigator};
pub use crate::utils::error::Result;
