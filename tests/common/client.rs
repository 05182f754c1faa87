//! Typed HTTP client for the end-to-end suites
//!
//! A thin reqwest wrapper with one method per server route, so route and
//! payload changes only touch this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new client pointed at a test server
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Server Endpoints
    // ========================================================================

    /// GET /
    pub async fn get_stats(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Get stats request failed")
    }

    // ========================================================================
    // Movie Endpoints
    // ========================================================================

    /// GET /movies
    pub async fn list_movies(&self) -> Response {
        self.client
            .get(format!("{}/movies", self.base_url))
            .send()
            .await
            .expect("List movies request failed")
    }

    /// POST /movies
    pub async fn import_movies(&self) -> Response {
        self.client
            .post(format!("{}/movies", self.base_url))
            .send()
            .await
            .expect("Import movies request failed")
    }

    /// GET /movies/{id}
    pub async fn get_movie(&self, id: usize) -> Response {
        self.client
            .get(format!("{}/movies/{}", self.base_url, id))
            .send()
            .await
            .expect("Get movie request failed")
    }

    /// PUT /movies/{id}
    pub async fn update_movie(&self, id: usize, body: &serde_json::Value) -> Response {
        self.client
            .put(format!("{}/movies/{}", self.base_url, id))
            .json(body)
            .send()
            .await
            .expect("Update movie request failed")
    }

    /// DELETE /movies/{id}
    pub async fn delete_movie(&self, id: usize) -> Response {
        self.client
            .delete(format!("{}/movies/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete movie request failed")
    }

    // ========================================================================
    // Property Endpoints
    //
    // The same four routes exist for each collection: "actors",
    // "categories", "series" and "studios".
    // ========================================================================

    /// POST /{collection}
    pub async fn create_property(&self, collection: &str, name: &str) -> Response {
        self.client
            .post(format!("{}/{}", self.base_url, collection))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Create property request failed")
    }

    /// GET /{collection}
    pub async fn list_properties(&self, collection: &str) -> Response {
        self.client
            .get(format!("{}/{}", self.base_url, collection))
            .send()
            .await
            .expect("List properties request failed")
    }

    /// PUT /{collection}/{id}
    pub async fn rename_property(&self, collection: &str, id: usize, name: &str) -> Response {
        self.client
            .put(format!("{}/{}/{}", self.base_url, collection, id))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Rename property request failed")
    }

    /// DELETE /{collection}/{id}
    pub async fn delete_property(&self, collection: &str, id: usize) -> Response {
        self.client
            .delete(format!("{}/{}/{}", self.base_url, collection, id))
            .send()
            .await
            .expect("Delete property request failed")
    }

    // ========================================================================
    // Relation Endpoints
    // ========================================================================

    /// POST /movie_actor
    pub async fn add_movie_actor(&self, movie_id: usize, actor_id: usize) -> Response {
        self.client
            .post(format!(
                "{}/movie_actor?movie_id={}&actor_id={}",
                self.base_url, movie_id, actor_id
            ))
            .send()
            .await
            .expect("Add movie actor request failed")
    }

    /// DELETE /movie_actor
    pub async fn remove_movie_actor(&self, movie_id: usize, actor_id: usize) -> Response {
        self.client
            .delete(format!(
                "{}/movie_actor?movie_id={}&actor_id={}",
                self.base_url, movie_id, actor_id
            ))
            .send()
            .await
            .expect("Remove movie actor request failed")
    }

    /// POST /movie_category
    pub async fn add_movie_category(&self, movie_id: usize, category_id: usize) -> Response {
        self.client
            .post(format!(
                "{}/movie_category?movie_id={}&category_id={}",
                self.base_url, movie_id, category_id
            ))
            .send()
            .await
            .expect("Add movie category request failed")
    }

    /// DELETE /movie_category
    pub async fn remove_movie_category(&self, movie_id: usize, category_id: usize) -> Response {
        self.client
            .delete(format!(
                "{}/movie_category?movie_id={}&category_id={}",
                self.base_url, movie_id, category_id
            ))
            .send()
            .await
            .expect("Remove movie category request failed")
    }
}
