//! Top-level rendering entry point.
//!
//! Computes the view model from application state and hands it to the
//! component layout. Nothing here reads state directly.

use crate::app::AppState;
use crate::ui::components;

/// Renders the plugin UI to stdout for a `rows` x `cols` pane.
pub fn render(state: &AppState, rows: usize, cols: usize) {
    let viewmodel = state.compute_viewmodel(rows, cols);
    tracing::trace!(
        items = viewmodel.display_items.len(),
        detail = viewmodel.detail.is_some(),
        "rendering"
    );
    components::render_layout(&viewmodel, &state.theme, cols, rows);
}
