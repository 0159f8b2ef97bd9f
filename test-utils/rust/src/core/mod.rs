//! Reconciliation engine core

pub mod actions;
pub mod compare;
pub mod reconciler;

pub use actions::{Action, ActionBuilder, Dispatch, RejectionInfo};
pub use reconciler::{Phase, Reconciler};
