//! Client state layer of the job-board admin console.
//!
//! `admin::AdminContext` is the entry point: it restores the session, builds
//! the `ApiClient`, opens the local stores, and hands out list pages for
//! every resource the console manages.

pub mod admin;
pub mod config;
pub mod errors;
pub mod http_client;
pub mod models;
pub mod notify;
pub mod resources;
pub mod session;
pub mod storage;
pub mod stores;
pub mod timing;

#[cfg(test)]
mod test_support;

pub use admin::AdminContext;
pub use config::DashboardConfig;
pub use errors::{ApiError, ListError};
