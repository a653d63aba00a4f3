//! Browser and REST API checks for the Goodbudget budgeting app.
//!
//! - [`pages`]: page objects for the landing, sign-up, login, home and
//!   envelope screens, driven through the [`browser::Browser`] capability
//! - [`api`]: typed client for `/transactions` plus response schemas and
//!   teardown tracking
//! - [`logger`]: structured, per-context test logging
//!
//! Suites that need the live site, a WebDriver server or an API token live in
//! `tests/` and are `#[ignore]`d; run them with `cargo test -- --ignored`.

pub mod api;
pub mod browser;
pub mod config;
pub mod fixtures;
pub mod logger;
pub mod pages;
pub mod testing;
