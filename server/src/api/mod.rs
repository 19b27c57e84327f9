pub mod artists;
pub mod documents;
pub mod error;
pub mod shows;
pub mod venues;

use axum::{
    http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    routing::get,
    Json, Router,
};
pub use error::Error;
use sea_orm::DbConn;
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState(pub DbConn);

#[derive(Serialize, Deserialize)]
pub struct Home {
    pub name: String,
    pub version: String,
}

async fn home() -> Json<Home> {
    Json(Home {
        name: base::CLI_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn fallback() -> Error {
    Error::NotFound(None)
}

pub fn router(conn: DbConn) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);
    let tracing = TraceLayer::new_for_http();
    Router::new()
        .route("/", get(home))
        .route("/venues", get(venues::venues))
        .route("/venues/search", get(venues::search_venues))
        .route(
            "/venues/create",
            get(venues::create_venue_form).post(venues::create_venue_submission),
        )
        .route(
            "/venues/:venue_id",
            get(venues::show_venue).delete(venues::delete_venue),
        )
        .route(
            "/venues/:venue_id/edit",
            get(venues::edit_venue).post(venues::edit_venue_submission),
        )
        .route("/artists", get(artists::artists))
        .route("/artists/search", get(artists::search_artists))
        .route(
            "/artists/create",
            get(artists::create_artist_form).post(artists::create_artist_submission),
        )
        .route("/artists/:artist_id", get(artists::show_artist))
        .route(
            "/artists/:artist_id/edit",
            get(artists::edit_artist).post(artists::edit_artist_submission),
        )
        .route("/shows", get(shows::shows))
        .route(
            "/shows/create",
            get(shows::create_show_form).post(shows::create_show_submission),
        )
        .fallback(fallback)
        .layer(cors)
        .layer(tracing)
        .with_state(AppState(conn))
}

/// The free-text search parameter, shared by the venue and artist search
/// endpoints. A missing term matches everything.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search_term: String,
}
