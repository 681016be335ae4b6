use std::sync::Arc;

use axum::{routing::post, Router};
use tracing::info;

use crate::handlers::{
    admin_broadcast_handler, launch_request_handler, queue_status_handler, wall_post_handler,
};
use crate::processor::process_transitions_handler;
use crate::state::AppState;

/// All notification and queue-processor routes. Non-POST methods answer 405
/// through axum's method routing.
pub fn routes(state: Arc<AppState>) -> Router {
    info!("Notification routes initialized");

    Router::new()
        .route("/notify/admin-broadcast", post(admin_broadcast_handler))
        .route("/notify/launch-request", post(launch_request_handler))
        .route("/notify/wall-post", post(wall_post_handler))
        .route("/notify/queue-status", post(queue_status_handler))
        .route("/queue/process-transitions", post(process_transitions_handler))
        .with_state(state)
}
