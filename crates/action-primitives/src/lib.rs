//! Action primitives for scripted browser runs
//!
//! This crate provides:
//! - The bounded polling wait ([`FluentWait`]) used before every interaction
//! - Browser capability traits ([`BrowserSession`], [`ElementHandle`])
//! - Five primitives: navigate, click, type, select, check
//! - A WebDriver-backed session and an in-memory simulated one

pub mod errors;
mod locator;
mod primitives;
pub mod session;
pub mod simulated;
pub mod types;
mod waiting;
pub mod webdriver;

pub use errors::*;
pub use locator::*;
pub use primitives::*;
pub use session::*;
pub use types::*;
pub use waiting::*;
