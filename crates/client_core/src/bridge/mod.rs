//! Backend bridge: commands queued by the controller, events posted back by the worker.

pub mod commands;
pub mod events;
pub mod runtime;

pub use commands::BackendCommand;
pub use events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
pub use runtime::{launch, launch_with_backend};
