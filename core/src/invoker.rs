//! Tool invocation boundary contract.
//!
//! The uniform call contract between the reasoning loop and concrete tool
//! capabilities. The boundary resolves names to behavior, wraps capability
//! failures into typed errors and owns per-call timeouts. It performs no
//! retries; a failed call degrades to a failure notice in the transcript
//! rather than blocking progress.

use async_trait::async_trait;

use crate::errors::InvokeError;
use crate::state::ToolParams;

/// Resolves a tool name to a concrete capability and executes it
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke a tool by name with the given parameters.
    ///
    /// Unknown names yield [`InvokeError::UnknownTool`]; capability-level
    /// failures are wrapped into [`InvokeError::Execution`] carrying the
    /// original cause.
    async fn invoke(&self, tool_name: &str, params: &ToolParams) -> Result<String, InvokeError>;
}
