//! Change detection between successive deployment snapshots

pub mod diff;

pub use diff::{diff, ChangeSet, Transition};
