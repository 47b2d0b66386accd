//! AWS-backed implementations of the adapter backends.
//!
//! - [`ssm::SsmCommandService`] sends command documents through Systems Manager.
//! - [`directory::DirectoryDataService`] reads users and groups through Directory
//!   Service Data.

pub mod directory;
mod fields;
pub mod ssm;

pub use directory::DirectoryDataService;
pub use ssm::SsmCommandService;

use aws_config::{BehaviorVersion, SdkConfig};

/// Shared SDK configuration from the default provider chain (environment, profile,
/// execution role).
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::load_defaults(BehaviorVersion::latest()).await
}
