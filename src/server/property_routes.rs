//! CRUD endpoints for the four property collections. All four routers share
//! one set of handlers, each route pins its own kind.

use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::catalog::PropertyKind;
use crate::library::MovieLibrary;

use super::responses::{error_response, json_or_error, message_response};
use super::state::ServerState;

#[derive(Deserialize, Debug)]
struct PropertyBody {
    pub name: String,
}

fn create_property(library: &MovieLibrary, kind: PropertyKind, body: &PropertyBody) -> Response {
    json_or_error(library.add_property(kind, body.name.trim()))
}

fn list_properties(library: &MovieLibrary, kind: PropertyKind) -> Response {
    json_or_error(library.all_properties(kind))
}

fn rename_property(
    library: &MovieLibrary,
    kind: PropertyKind,
    id: usize,
    body: &PropertyBody,
) -> Response {
    json_or_error(library.rename_property(kind, id, body.name.trim()))
}

fn delete_property(library: &MovieLibrary, kind: PropertyKind, id: usize) -> Response {
    match library.delete_property(kind, id) {
        Ok(_) => message_response(format!("{} with ID {} deleted", kind.label(), id)),
        Err(err) => error_response(&err),
    }
}

async fn post_actor(
    State(library): State<MovieLibrary>,
    Json(body): Json<PropertyBody>,
) -> Response {
    create_property(&library, PropertyKind::Actor, &body)
}

async fn get_actors(State(library): State<MovieLibrary>) -> Response {
    list_properties(&library, PropertyKind::Actor)
}

async fn put_actor(
    State(library): State<MovieLibrary>,
    Path(id): Path<usize>,
    Json(body): Json<PropertyBody>,
) -> Response {
    rename_property(&library, PropertyKind::Actor, id, &body)
}

async fn delete_actor(State(library): State<MovieLibrary>, Path(id): Path<usize>) -> Response {
    delete_property(&library, PropertyKind::Actor, id)
}

pub(super) fn make_actor_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(get_actors).post(post_actor))
        .route("/{id}", put(put_actor).delete(delete_actor))
        .with_state(state)
}

async fn post_category(
    State(library): State<MovieLibrary>,
    Json(body): Json<PropertyBody>,
) -> Response {
    create_property(&library, PropertyKind::Category, &body)
}

async fn get_categories(State(library): State<MovieLibrary>) -> Response {
    list_properties(&library, PropertyKind::Category)
}

async fn put_category(
    State(library): State<MovieLibrary>,
    Path(id): Path<usize>,
    Json(body): Json<PropertyBody>,
) -> Response {
    rename_property(&library, PropertyKind::Category, id, &body)
}

async fn delete_category(State(library): State<MovieLibrary>, Path(id): Path<usize>) -> Response {
    delete_property(&library, PropertyKind::Category, id)
}

pub(super) fn make_category_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(get_categories).post(post_category))
        .route("/{id}", put(put_category).delete(delete_category))
        .with_state(state)
}

async fn post_series(
    State(library): State<MovieLibrary>,
    Json(body): Json<PropertyBody>,
) -> Response {
    create_property(&library, PropertyKind::Series, &body)
}

async fn get_series(State(library): State<MovieLibrary>) -> Response {
    list_properties(&library, PropertyKind::Series)
}

async fn put_series(
    State(library): State<MovieLibrary>,
    Path(id): Path<usize>,
    Json(body): Json<PropertyBody>,
) -> Response {
    rename_property(&library, PropertyKind::Series, id, &body)
}

async fn delete_series(State(library): State<MovieLibrary>, Path(id): Path<usize>) -> Response {
    delete_property(&library, PropertyKind::Series, id)
}

pub(super) fn make_series_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(get_series).post(post_series))
        .route("/{id}", put(put_series).delete(delete_series))
        .with_state(state)
}

async fn post_studio(
    State(library): State<MovieLibrary>,
    Json(body): Json<PropertyBody>,
) -> Response {
    create_property(&library, PropertyKind::Studio, &body)
}

async fn get_studios(State(library): State<MovieLibrary>) -> Response {
    list_properties(&library, PropertyKind::Studio)
}

async fn put_studio(
    State(library): State<MovieLibrary>,
    Path(id): Path<usize>,
    Json(body): Json<PropertyBody>,
) -> Response {
    rename_property(&library, PropertyKind::Studio, id, &body)
}

async fn delete_studio(State(library): State<MovieLibrary>, Path(id): Path<usize>) -> Response {
    delete_property(&library, PropertyKind::Studio, id)
}

pub(super) fn make_studio_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(get_studios).post(post_studio))
        .route("/{id}", put(put_studio).delete(delete_studio))
        .with_state(state)
}
