pub mod navigator;
pub mod storage;

pub use navigator::RecordingNavigator;
pub use storage::{FileCredentialStore, MemoryCredentialStore};
