//! navdrop installer library.
//!
//! This crate provides the archive distribution pipeline behind the
//! `navdrop-installer` CLI: a dropped archive is extracted, its nested
//! sub-package archives are matched against a rule table, and each match is
//! extracted and merged into the directory its rule names. It can be consumed
//! programmatically for testing or custom installation workflows.
//!
//! # Modules
//!
//! - [`archiver`] - Extraction adapter trait and external archiver backend
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Persistent settings and rule table storage
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Semantic error types
//! - [`executor`] - External process execution seam
//! - [`install`] - The install command over dropped archives
//! - [`manage`] - The rules and settings commands
//! - [`merge`] - Overwriting directory-tree merge
//! - [`output`] - Status and listing formatting
//! - [`pipeline`] - Archive distribution pipeline orchestration
//! - [`resolver`] - Nested archive discovery and wrapper-folder unwrapping
//! - [`rules`] - Sub-package routing rules
//! - [`staging`] - Scoped scratch directories

pub mod archiver;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod executor;
pub mod install;
pub mod manage;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod rules;
pub mod staging;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
