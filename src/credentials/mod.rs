//! Credentials Module
//!
//! Credential values and the round-robin key pool that hands them out.

pub mod credential;
pub mod key_pool;

pub use credential::{Credential, MIN_CREDENTIAL_LEN};
pub use key_pool::KeyPool;
