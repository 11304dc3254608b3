use crate::handlers::{self, AppState};
use crate::ui;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Form page and JSON API. Rate limiting and tracing are layered on in `main`.
pub fn app_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Form
        .route("/", get(ui::form_page))
        // Generation
        .route("/api/v1/profiles", post(handlers::generate_profiles))
        .route("/api/v1/profiles/csv", post(handlers::generate_profiles_csv))
        .route("/api/v1/profiles/export", post(handlers::export_profiles))
        .route("/api/v1/iban/:country", get(handlers::next_iban))
        // Mailboxes
        .route("/api/v1/providers", get(handlers::list_providers))
        .route(
            "/api/v1/providers/mailtm/domains",
            get(handlers::mailtm_domains),
        )
        .route("/api/v1/inbox", post(handlers::check_inbox))
}

/// Full router without rate limiting, used by tests and embedding callers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(app_routes())
        .with_state(state)
}
