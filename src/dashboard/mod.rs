//! Dashboard state, orchestration and text rendering
//!
//! The state is a plain value changed only through [`apply`]; the
//! [`Dashboard`] service runs the fetches and publishes every new state on a
//! `watch` channel that presentation code subscribes to.

pub mod report;
pub mod service;
pub mod state;

pub use report::{Report, email_summary, loading_message, share_text};
pub use service::Dashboard;
pub use state::{Action, AppState, DashboardView, Event, Panel, apply, is_current};
