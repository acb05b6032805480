//! Core services - the adapter's orchestration layer.
//!
//! Services coordinate ports and domain logic. They never see a concrete
//! HTTP client or speech engine, only the traits in [`crate::ports`].

mod batch_dispatcher;
mod conversion;
mod forwarding;
mod voice_workflow;

pub use batch_dispatcher::{BatchDispatcher, DEFAULT_CONCURRENCY_LIMIT, validate_concurrency_limit};
pub use conversion::ConversionService;
pub use forwarding::{ForwardTarget, ForwardingService, VoiceOptions};
pub use voice_workflow::{
    VoiceWorkflow, WorkflowContext, WorkflowError, WorkflowReply, WorkflowRequest, WorkflowStage,
};
