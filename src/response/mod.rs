//! Response coordinator: synchronous request/response over the
//! asynchronous pipeline, with a bounded pending-request table.

pub mod coordinator;

pub use coordinator::{CompletionResult, Registration, RequestStatus, ResponseCoordinator};
