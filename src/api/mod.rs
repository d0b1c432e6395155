pub mod compute;
pub mod health;
pub mod seasonal;
pub mod stock;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest(
            "/api",
            stock::router()
                .merge(seasonal::router())
                .merge(compute::router()),
        )
}
