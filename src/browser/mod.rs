//! Browser session management
//!
//! Launches or attaches to a Chrome/Chromium instance over the DevTools protocol and
//! exposes the handful of page operations the scraper needs.

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
