//! Action dispatch table for non-GUI front ends: one entry per action name,
//! each bound to a controller operation.

use thiserror::Error;

use crate::wizard::{controller::WizardController, state::Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// State changed locally; nothing was sent to the backend.
    Updated,
    /// A backend request was queued; wait for its event.
    Queued,
    /// Preconditions were not met; nothing happened.
    Ignored,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("empty command")]
    Empty,
    #[error("unknown action '{0}' (type 'help' for the list)")]
    UnknownAction(String),
    #[error("{action}: {reason} (usage: {usage})")]
    InvalidArgument {
        action: &'static str,
        usage: &'static str,
        reason: String,
    },
}

pub type ActionHandler =
    fn(&ActionSpec, &mut WizardController, &str) -> Result<ActionOutcome, DispatchError>;

pub struct ActionSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    handler: ActionHandler,
}

impl ActionSpec {
    fn invalid(&self, reason: impl Into<String>) -> DispatchError {
        DispatchError::InvalidArgument {
            action: self.name,
            usage: self.usage,
            reason: reason.into(),
        }
    }
}

pub const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "file",
        usage: "file <path>",
        summary: "select the CSV file to analyze",
        handler: select_file,
    },
    ActionSpec {
        name: "problem",
        usage: "problem <text>",
        summary: "describe what you want to learn from the data",
        handler: set_problem,
    },
    ActionSpec {
        name: "analyze",
        usage: "analyze",
        summary: "send file and problem to the backend (step 1 -> 2)",
        handler: submit_analysis,
    },
    ActionSpec {
        name: "select",
        usage: "select <n>",
        summary: "pick proposal n (1-based) and generate the chart (step 2 -> 3)",
        handler: select_proposal,
    },
    ActionSpec {
        name: "back",
        usage: "back",
        summary: "go back one step",
        handler: back,
    },
    ActionSpec {
        name: "step",
        usage: "step <1|2|3>",
        summary: "show the given step",
        handler: go_to_step,
    },
    ActionSpec {
        name: "restart",
        usage: "restart",
        summary: "clear everything and return to step 1",
        handler: restart,
    },
    ActionSpec {
        name: "show",
        usage: "show",
        summary: "print the current step",
        handler: show,
    },
    ActionSpec {
        name: "help",
        usage: "help",
        summary: "list actions",
        handler: help,
    },
    ActionSpec {
        name: "quit",
        usage: "quit",
        summary: "exit",
        handler: quit,
    },
];

pub fn find_action(name: &str) -> Option<&'static ActionSpec> {
    ACTIONS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

/// Splits `line` into an action name and its argument text, then runs the
/// matching handler.
pub fn dispatch(
    controller: &mut WizardController,
    line: &str,
) -> Result<ActionOutcome, DispatchError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DispatchError::Empty);
    }
    let (name, args) = line
        .split_once(char::is_whitespace)
        .map(|(name, args)| (name, args.trim()))
        .unwrap_or((line, ""));
    let spec = find_action(name).ok_or_else(|| DispatchError::UnknownAction(name.to_string()))?;
    (spec.handler)(spec, controller, args)
}

pub fn help_text() -> String {
    let width = ACTIONS
        .iter()
        .map(|spec| spec.usage.len())
        .max()
        .unwrap_or_default();
    ACTIONS
        .iter()
        .map(|spec| format!("  {:width$}  {}", spec.usage, spec.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

fn select_file(
    spec: &ActionSpec,
    controller: &mut WizardController,
    args: &str,
) -> Result<ActionOutcome, DispatchError> {
    let path = args.trim_matches(|c| c == '"' || c == '\'');
    if path.is_empty() {
        return Err(spec.invalid("missing path"));
    }
    controller.select_file(path);
    Ok(ActionOutcome::Updated)
}

fn set_problem(
    _spec: &ActionSpec,
    controller: &mut WizardController,
    args: &str,
) -> Result<ActionOutcome, DispatchError> {
    controller.set_problem(args);
    Ok(ActionOutcome::Updated)
}

fn submit_analysis(
    _spec: &ActionSpec,
    controller: &mut WizardController,
    _args: &str,
) -> Result<ActionOutcome, DispatchError> {
    Ok(if controller.submit_analysis() {
        ActionOutcome::Queued
    } else {
        ActionOutcome::Ignored
    })
}

fn select_proposal(
    spec: &ActionSpec,
    controller: &mut WizardController,
    args: &str,
) -> Result<ActionOutcome, DispatchError> {
    let number: usize = args
        .parse()
        .map_err(|_| spec.invalid(format!("'{args}' is not a proposal number")))?;
    let count = controller.state().proposals.len();
    if number == 0 || number > count {
        return Err(spec.invalid(format!("choose a proposal between 1 and {count}")));
    }
    Ok(if controller.select_proposal(number - 1) {
        ActionOutcome::Queued
    } else {
        ActionOutcome::Ignored
    })
}

fn back(
    _spec: &ActionSpec,
    controller: &mut WizardController,
    _args: &str,
) -> Result<ActionOutcome, DispatchError> {
    controller.back();
    Ok(ActionOutcome::Updated)
}

fn go_to_step(
    spec: &ActionSpec,
    controller: &mut WizardController,
    args: &str,
) -> Result<ActionOutcome, DispatchError> {
    let step = args
        .parse::<u8>()
        .ok()
        .and_then(Step::from_number)
        .ok_or_else(|| spec.invalid(format!("'{args}' is not a step")))?;
    controller.go_to_step(step);
    Ok(ActionOutcome::Updated)
}

fn restart(
    _spec: &ActionSpec,
    controller: &mut WizardController,
    _args: &str,
) -> Result<ActionOutcome, DispatchError> {
    controller.restart();
    Ok(ActionOutcome::Updated)
}

fn show(
    _spec: &ActionSpec,
    _controller: &mut WizardController,
    _args: &str,
) -> Result<ActionOutcome, DispatchError> {
    Ok(ActionOutcome::Show)
}

fn help(
    _spec: &ActionSpec,
    _controller: &mut WizardController,
    _args: &str,
) -> Result<ActionOutcome, DispatchError> {
    Ok(ActionOutcome::Help)
}

fn quit(
    _spec: &ActionSpec,
    _controller: &mut WizardController,
    _args: &str,
) -> Result<ActionOutcome, DispatchError> {
    Ok(ActionOutcome::Quit)
}
