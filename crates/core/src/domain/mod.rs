pub mod directory;
pub mod invocation;
