//! Finova - gadget store and bank statement search
//!
//! Two small web services sharing one binary:
//!
//! - `finova store`: gadget catalog, accounts, checkout, purchase
//!   export/import and an image proxy (server-rendered HTML)
//! - `finova statements`: JSON search API over bank statements
//!
//! Handlers call services, services call the storage traits from
//! `finova-store`.

pub mod config;
pub mod error;
pub mod logging;
pub mod password;
pub mod sealing;
pub mod services;
pub mod session;
pub mod web;

/// Application name
pub const APP_NAME: &str = "finova";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
