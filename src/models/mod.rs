//! # Data Model
//!
//! Identifiers for regional back-ends and requested items, the article payload
//! a back-end returns, and the resolved/cached forms the engine derives from it.

pub mod article;
pub mod identifiers;

pub use article::{Article, CachedPayload, ResolvedItem};
pub use identifiers::{ContentKey, Source};
