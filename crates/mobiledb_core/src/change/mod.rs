//! Change sets and their application to a record table.

mod apply;
mod set;

pub use apply::apply_change_set;
pub use set::{ChangeKind, ChangeOperation, ChangeSet};
