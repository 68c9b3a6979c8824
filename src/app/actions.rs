//! Side effects requested by the event handler.
//!
//! [`handle_event`](crate::app::handle_event) never performs IO. It returns
//! a list of [`Action`]s which the plugin runtime executes in order.

use crate::feed::FetchRequest;
use crate::worker::WorkerMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Hides the plugin pane.
    CloseFocus,

    /// Fetches the live catalog from the configured catalog service.
    ///
    /// Only catalog reloads go over the network. The outcome comes back as
    /// [`Event::FetchCompleted`](crate::app::Event::FetchCompleted).
    RequestCatalog(FetchRequest),

    /// Posts a message to the background worker.
    PostToWorker(WorkerMessage),

    /// Downloads a model file to the local download directory.
    DownloadModel {
        id: String,
        url: String,
        /// Destination path relative to the host root.
        destination: String,
    },

    /// Arms a timer that clears the status line after `seconds`.
    ScheduleStatusClear(f64),
}
