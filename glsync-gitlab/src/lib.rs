//! # glsync-gitlab
//!
//! Remote-side discovery: a blocking GitLab REST v4 client and a concurrent
//! group-tree walker that flattens a nested group hierarchy into the set of
//! active projects beneath it, aggregating per-node failures instead of
//! aborting sibling work.

pub mod client;
pub mod error;
pub mod walker;

pub use client::GitlabClient;
pub use error::GitlabError;
pub use walker::{walk_group, GroupDirectory, GroupProject, GroupRef, WALKER_THREADS};
