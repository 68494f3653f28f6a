//! A chat session: a flow controller wired to a relay transport.

use std::sync::Arc;

use crate::controller::{FlowController, InputOutcome, PendingRequest};
use crate::error::FlowError;
use crate::message::ChatMessage;
use crate::transport::RelayTransport;

/// Runs submitted input through the controller and sends the resulting
/// requests one at a time.
pub struct ChatSession {
    controller: FlowController,
    transport: Arc<dyn RelayTransport>,
}

impl ChatSession {
    pub fn new(controller: FlowController, transport: Arc<dyn RelayTransport>) -> Self {
        Self {
            controller,
            transport,
        }
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FlowController {
        &mut self.controller
    }

    /// Send a pending request and record the reply.
    ///
    /// Transport failures become an `"Error: ..."` bot message. Fails with
    /// `NoRequestInFlight` if the controller has nothing outstanding.
    pub async fn dispatch(&mut self, request: PendingRequest) -> Result<&ChatMessage, FlowError> {
        if !self.controller.is_loading() {
            return Err(FlowError::NoRequestInFlight);
        }
        let result = self.transport.send(&request).await;
        self.controller.complete(result)
    }

    /// Submit a line of input and, if it produced a request, send it.
    ///
    /// Returns the messages appended by this call.
    pub async fn submit(&mut self, input: &str) -> Result<&[ChatMessage], FlowError> {
        let start = self.controller.messages().len();
        if let InputOutcome::Dispatch(request) = self.controller.submit_input(input)? {
            self.dispatch(request).await?;
        }
        Ok(&self.controller.messages()[start..])
    }
}
