//! Command handlers for the Sift CLI

pub mod clean;
pub mod rules;
pub mod sources;
