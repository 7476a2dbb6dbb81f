//! # glsync-git
//!
//! Local side of the reconciliation: discovery of git working copies under a
//! directory root, and the clone / pull / delete actions executed against
//! them via the `git` binary.

pub mod actions;
pub mod error;
pub mod scan;

pub use actions::{clone, delete, pull};
pub use error::GitError;
pub use scan::scan_working_copies;
