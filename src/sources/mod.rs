//! # Sources
//!
//! Which regional back-ends exist, in what order they are tried, and how one
//! of them is asked for an article.
//!
//! - [`SourceRegistry`]: static lookup built from configuration
//! - [`PriorityBuilder`]: ordered candidate lists, memoized in a [`PriorityCache`]
//! - [`SourceClient`]: the fetch collaborator, optionally wrapped in [`GuardedSourceClient`]

pub mod client;
pub mod priority;
pub mod registry;

pub use crate::models::{ContentKey, Source};
pub use client::{FetchOutcome, GuardedSourceClient, SourceClient};
pub use priority::{PriorityBuilder, PriorityCache, PriorityList};
pub use registry::{Signature, SourceRegistry};
