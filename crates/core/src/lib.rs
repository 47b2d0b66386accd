pub mod config;
pub mod domain;
pub mod envelope;
pub mod errors;

pub use domain::directory::{GroupRecord, UserDetails, UserRecord};
pub use domain::invocation::{
    CommandParameters, CommandRequest, InvocationId, InvocationResult, InvocationStatus,
    SubmittedCommand, WaitPolicy,
};
pub use envelope::{
    decode, encode, find_parameter, AgentIdentity, AgentRequest, AgentResponse, DecodedRequest,
    Parameter, MASKED_ERROR_BODY, TEXT_CONTENT_TYPE,
};
pub use errors::{CommandServiceError, DirectoryServiceError};
