//! Worker-to-UI events and error modeling for the wizard controller.

use shared::protocol::{AnalyzeResponse, GenerateResult};

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub enum UiEvent {
    BackendHealth {
        reachable: bool,
        message: String,
    },
    AnalysisReady {
        csv_text: String,
        response: AnalyzeResponse,
    },
    VisualizationReady {
        proposal_index: usize,
        result: GenerateResult,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Server,
    Transport,
    Malformed,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Analyze,
    Generate,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Server { .. } => UiErrorCategory::Server,
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::Decode(_) | ClientError::Shape(_) => UiErrorCategory::Malformed,
            ClientError::ReadFile { .. }
            | ClientError::InvalidServerUrl { .. }
            | ClientError::Config(_) => UiErrorCategory::Local,
        };
        Self::new(category, context, err.user_message())
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_keep_the_backend_detail_verbatim() {
        let err = UiError::from_client_error(
            UiErrorContext::Analyze,
            &ClientError::server(400, Some("bad csv".to_string())),
        );
        assert_eq!(err.category(), UiErrorCategory::Server);
        assert_eq!(err.context(), UiErrorContext::Analyze);
        assert_eq!(err.message(), "bad csv");
    }

    #[test]
    fn server_errors_without_detail_fall_back_to_generic_text() {
        let err = UiError::from_client_error(
            UiErrorContext::Generate,
            &ClientError::server(502, None),
        );
        assert_eq!(err.message(), crate::error::GENERIC_SERVER_ERROR);
    }

    #[test]
    fn malformed_shapes_are_classified_as_response_errors() {
        let err = UiError::from_client_error(
            UiErrorContext::Generate,
            &ClientError::Shape(shared::error::ShapeError::malformed("no traces")),
        );
        assert_eq!(err.category(), UiErrorCategory::Malformed);
        assert_eq!(err.message(), "malformed response: no traces");
    }
}
