//! HTTP endpoint handlers.
//!
//! Each handler is a plain axum handler over [`AppState`](crate::state::AppState).
//! Failures are typed per endpoint family (see [`crate::error`]) so every
//! handler body can use `?` and still render its own JSON envelope.

pub mod analyze;
pub mod catalog;
pub mod login;
pub mod notify;
pub mod webhook;

pub use analyze::analyze_pdf;
pub use login::line_login;
pub use notify::notify;
pub use webhook::line_webhook;
