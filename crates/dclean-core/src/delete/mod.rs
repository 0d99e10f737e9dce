//! Deletion of a user selection.
//!
//! [`planner::plan`] reduces a selection to its top-level paths,
//! [`DeletionPlan`] attaches the bytes each one is credited with, and
//! [`executor::execute`] removes them one by one through the trash or
//! permanently.

pub mod executor;
pub mod planner;
pub mod trash;

pub use executor::{execute, DeletionMode, DeletionOutcome, DeletionResult};
pub use planner::{plan, DeletionPlan, DeletionTarget};
pub use trash::{NoTrash, SystemTrash, TrashCan};
