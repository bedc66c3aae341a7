//! CLI command implementations.
//!
//! Each subcommand has its own module with its handler.
//!
//! # Command Modules
//!
//! - [`init`] - Configuration initialization
//! - [`manifest`] - Print the precache manifest
//! - [`install`] - Populate the current cache generation
//! - [`activate`] - Delete stale generations
//! - [`fetch`] - Route one request through the cache
//! - [`status`] - List stored generations

pub mod activate;
pub mod fetch;
pub mod init;
pub mod install;
pub mod manifest;
pub mod status;
