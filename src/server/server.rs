use anyhow::Result;
use std::time::{Duration, Instant};

use crate::catalog::MovieUpdate;
use crate::library::MovieLibrary;

use axum::{
    extract::{Path, Query, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::property_routes::{
    make_actor_routes, make_category_routes, make_series_routes, make_studio_routes,
};
use super::responses::{error_response, json_or_error, message_response};
use super::state::ServerState;
use super::{log_requests, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let secs = duration.as_secs();
    let in_day = secs % 86_400;
    format!(
        "{}d {:02}:{:02}:{:02}",
        secs / 86_400,
        in_day / 3600,
        (in_day % 3600) / 60,
        in_day % 60
    )
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn get_movies(State(library): State<MovieLibrary>) -> Response {
    json_or_error(library.all_movies())
}

async fn import_movies(State(library): State<MovieLibrary>) -> Response {
    json_or_error(library.import_movies())
}

async fn get_movie(State(library): State<MovieLibrary>, Path(id): Path<usize>) -> Response {
    json_or_error(library.get_movie(id))
}

async fn put_movie(
    State(library): State<MovieLibrary>,
    Path(id): Path<usize>,
    Json(body): Json<MovieUpdate>,
) -> Response {
    json_or_error(library.update_movie(id, &body))
}

async fn delete_movie(State(library): State<MovieLibrary>, Path(id): Path<usize>) -> Response {
    match library.delete_movie(id) {
        Ok(_) => message_response(format!("Deleted movie with ID {}", id)),
        Err(err) => error_response(&err),
    }
}

#[derive(Deserialize, Debug)]
struct MovieActorParams {
    pub movie_id: usize,
    pub actor_id: usize,
}

#[derive(Deserialize, Debug)]
struct MovieCategoryParams {
    pub movie_id: usize,
    pub category_id: usize,
}

async fn post_movie_actor(
    State(library): State<MovieLibrary>,
    Query(params): Query<MovieActorParams>,
) -> Response {
    json_or_error(library.add_movie_actor(params.movie_id, params.actor_id))
}

async fn delete_movie_actor(
    State(library): State<MovieLibrary>,
    Query(params): Query<MovieActorParams>,
) -> Response {
    json_or_error(library.remove_movie_actor(params.movie_id, params.actor_id))
}

async fn post_movie_category(
    State(library): State<MovieLibrary>,
    Query(params): Query<MovieCategoryParams>,
) -> Response {
    json_or_error(library.add_movie_category(params.movie_id, params.category_id))
}

async fn delete_movie_category(
    State(library): State<MovieLibrary>,
    Query(params): Query<MovieCategoryParams>,
) -> Response {
    json_or_error(library.remove_movie_category(params.movie_id, params.category_id))
}

impl ServerState {
    fn new(config: ServerConfig, library: MovieLibrary) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            library,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(config: ServerConfig, library: MovieLibrary) -> Result<Router> {
    let state = ServerState::new(config, library);

    let movie_routes: Router = Router::new()
        .route("/", get(get_movies).post(import_movies))
        .route("/{id}", get(get_movie).put(put_movie).delete(delete_movie))
        .with_state(state.clone());

    let relation_routes: Router = Router::new()
        .route(
            "/movie_actor",
            post(post_movie_actor).delete(delete_movie_actor),
        )
        .route(
            "/movie_category",
            post(post_movie_category).delete(delete_movie_category),
        )
        .with_state(state.clone());

    let home_router: Router = Router::new().route("/", get(home)).with_state(state.clone());

    let app = home_router
        .nest("/movies", movie_routes)
        .nest("/actors", make_actor_routes(state.clone()))
        .nest("/categories", make_category_routes(state.clone()))
        .nest("/series", make_series_routes(state.clone()))
        .nest("/studios", make_studio_routes(state.clone()))
        .merge(relation_routes)
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub async fn run_server(
    library: MovieLibrary,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };
    let app = make_app(config, library)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
