use std::path::{Path, PathBuf};

use shared::{
    domain::{DataSummary, Proposal},
    protocol::GenerateResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Upload = 1,
    Proposals = 2,
    Result = 3,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Upload, Step::Proposals, Step::Result];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Upload),
            2 => Some(Self::Proposals),
            3 => Some(Self::Result),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Data & problem",
            Self::Proposals => "Proposals",
            Self::Result => "Visualization",
        }
    }

    /// Target of the explicit "back" action, if the step has one.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Upload => None,
            Self::Proposals => Some(Self::Upload),
            Self::Result => Some(Self::Proposals),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Pending,
    Active,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub step: Step,
    pub selected_file: Option<SelectedFile>,
    pub problem: String,
    pub csv_text: Option<String>,
    pub proposals: Vec<Proposal>,
    pub data_summary: Option<DataSummary>,
    pub selected_proposal: Option<usize>,
    pub result: Option<GenerateResult>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: Step::Upload,
            selected_file: None,
            problem: String::new(),
            csv_text: None,
            proposals: Vec::new(),
            data_summary: None,
            selected_proposal: None,
            result: None,
        }
    }
}

impl WizardState {
    pub fn indicator(&self, step: Step) -> IndicatorState {
        if step < self.step {
            IndicatorState::Done
        } else if step == self.step {
            IndicatorState::Active
        } else {
            IndicatorState::Pending
        }
    }

    pub fn indicators(&self) -> [(Step, IndicatorState); 3] {
        Step::ALL.map(|step| (step, self.indicator(step)))
    }

    pub fn is_view_active(&self, step: Step) -> bool {
        self.step == step
    }

    pub fn file_name(&self) -> &str {
        self.selected_file
            .as_ref()
            .map(|file| file.name.as_str())
            .unwrap_or_default()
    }

    pub fn can_submit(&self) -> bool {
        self.selected_file.is_some() && !self.problem.trim().is_empty()
    }

    pub fn selected(&self) -> Option<&Proposal> {
        self.selected_proposal
            .and_then(|index| self.proposals.get(index))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
