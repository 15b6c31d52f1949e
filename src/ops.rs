//! Operator implementations, one family per file.
//!
//! Operators are reached through [`ObservableExt`](crate::observable::ObservableExt);
//! the op and observer types here are what those methods return.

pub mod catch;
pub mod concat;
pub mod delay;
pub mod distinct_until_changed;
pub mod filter;
pub mod finalize;
pub mod map;
pub mod merge;
pub mod on_error_resume_next;
pub mod publish;
pub mod ref_count;
pub mod skip;
pub mod skip_last;
pub mod skip_until;
pub mod take;
pub mod take_last;
pub mod take_time;
pub mod take_until;
pub mod tap;
pub mod throttle;
pub mod throttle_with;

mod sequence;
