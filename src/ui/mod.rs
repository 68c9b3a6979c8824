//! Terminal rendering.
//!
//! ```text
//! AppState → compute_viewmodel → UIViewModel → render → ANSI Output
//! ```
//!
//! - [`viewmodel`]: Render-ready snapshot types
//! - [`renderer`]: Entry point called by the plugin
//! - [`components`]: Header, search, table, empty, detail and footer
//! - [`helpers`]: Cursor positioning, padding and highlighting
//! - [`theme`]: Color schemes and ANSI escape sequences

pub mod components;
pub mod helpers;
pub mod renderer;
pub mod theme;
pub mod viewmodel;

pub use renderer::render;
pub use theme::Theme;
pub use viewmodel::{
    DetailInfo, DisplayItem, EmptyState, FooterInfo, HeaderInfo, SearchBarInfo, StatusInfo,
    TabInfo, UIViewModel,
};
