//! Notification endpoints and launch-queue processor for the Marinex push
//! service.
//!
//! The crate owns everything between the HTTP boundary and the delivery
//! crates: recipient resolution, token registry lookups, the shared delivery
//! pipeline, best-effort persistence of notification records and the batch
//! transition processor.

pub mod error;
pub mod events;
pub mod handlers;
pub mod persister;
pub mod pipeline;
pub mod processor;
pub mod recipients;
pub mod registry;
pub mod routes;
pub mod state;
pub mod status;

pub use error::NotifyError;
pub use events::{sanitize_data, EventKind, NotificationEvent};
pub use pipeline::{dispatch_event, PipelineOutcome};
pub use routes::routes;
pub use state::{AppState, PushContext};
pub use status::QueueStatus;
