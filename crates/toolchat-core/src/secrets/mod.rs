//! Secret storage for provider credentials
//!
//! - `SecretStore` trait for pluggable lookups
//! - `EnvSecretStore` reads provider keys from environment variables
//! - `MemorySecretStore` holds keys in process, for tests and embedding

mod traits;
mod env_store;
mod memory_store;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
