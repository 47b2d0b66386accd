//! Function-call adapters between the conversational agent and Active Directory
//! backends.
//!
//! Two adapters sit behind the agent:
//! - [`command::CommandExecutionAdapter`] runs a managed command document on the
//!   management instance and returns its stdout (or stderr on failure).
//! - [`directory::DirectoryDataAdapter`] queries the directory-data service and returns
//!   the result as JSON text.
//!
//! Both consume an [`adbridge_core::AgentRequest`] and always return an
//! [`adbridge_core::AgentResponse`]; failures become response text, never errors.
//! Backends are reached through the traits in [`backend`], so adapters can run against
//! the AWS services or the in-memory doubles in [`memory`].

pub mod backend;
pub mod command;
pub mod directory;
pub mod memory;
pub mod registry;

pub use backend::{CommandService, DirectoryService};
pub use command::CommandExecutionAdapter;
pub use directory::{DirectoryDataAdapter, DirectoryOperation, DirectoryQueryError};
pub use registry::{Adapter, AdapterRegistry};
