//! Shared fixtures and mocks for integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;
