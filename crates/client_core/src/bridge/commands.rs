//! Backend commands queued from the wizard controller to the backend worker.

use std::path::PathBuf;

use shared::protocol::GenerateRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    CheckHealth,
    Analyze {
        problem: String,
        file: PathBuf,
    },
    Generate {
        proposal_index: usize,
        request: GenerateRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckHealth => "check_health",
            Self::Analyze { .. } => "analyze",
            Self::Generate { .. } => "generate",
        }
    }
}
