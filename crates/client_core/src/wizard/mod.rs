//! Three-step wizard: explicit state, the controller that mutates it, view
//! models for front ends, and the action dispatch table.

pub mod controller;
pub mod dispatch;
pub mod state;
pub mod view;

pub use controller::{BackendStatus, Notification, WizardController};
pub use dispatch::{dispatch, ActionOutcome, ActionSpec, DispatchError, ACTIONS};
pub use state::{IndicatorState, SelectedFile, Step, WizardState};
pub use view::{chart_view, code_view, proposal_cards, summary_view, ProposalCard, SummaryView};
