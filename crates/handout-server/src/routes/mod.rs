pub mod download;
pub mod pages;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(pages::router(state.clone()))
        .merge(download::router(state))
}
