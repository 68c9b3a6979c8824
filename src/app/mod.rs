//! Application layer coordinating state, events, and actions.
//!
//! ```text
//! Key/Timer/Web/Worker events → handle_event → FeedStore + AppState → Actions
//!                                    ↑                                  ↓
//!                                    └────── outcomes and responses ─────┘
//! ```
//!
//! - [`actions`]: Side effects emitted by the event handler
//! - [`handler`]: Event processing and request routing
//! - [`modes`]: Input modes and browser sections
//! - [`state`]: Application state and view model computation

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, route_fetch, Event};
pub use modes::{InputMode, SearchFocus, Section};
pub use state::{AppState, StatusLine, LOAD_AHEAD, STATUS_CLEAR_SECS};
