//! End-to-end tests for property endpoints
//!
//! The same four routes exist for actors, categories, series and studios.
//! Renames propagate to movie filenames and link directories, deletes are
//! rejected while movies still reference the property.

mod common;

use common::{TestClient, TestServer, ACTOR_1_NAME};
use movie_library_server::catalog::PropertyKind;
use reqwest::StatusCode;

// =============================================================================
// Create and List Tests
// =============================================================================

#[tokio::test]
async fn test_create_and_list_each_property_kind() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for collection in ["actors", "categories", "series", "studios"] {
        let name = format!("First of {}", collection);

        let response = client.create_property(collection, &name).await;
        assert_eq!(response.status(), StatusCode::OK);
        let created: serde_json::Value = response.json().await.unwrap();
        assert_eq!(created["name"], name);
        assert!(created["id"].as_u64().is_some());

        let response = client.list_properties(collection).await;
        assert_eq!(response.status(), StatusCode::OK);
        let list: serde_json::Value = response.json().await.unwrap();
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["name"], name);
    }
}

#[tokio::test]
async fn test_create_actor_trims_whitespace() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.create_property("actors", "  Al Pacino  ").await;

    assert_eq!(response.status(), StatusCode::OK);
    let created: serde_json::Value = response.json().await.unwrap();
    assert_eq!(created["name"], "Al Pacino");
}

#[tokio::test]
async fn test_create_duplicate_actor_returns_conflict() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.create_property("actors", ACTOR_1_NAME).await;

    let response = client.create_property("actors", ACTOR_1_NAME).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        error["detail"]["message"],
        format!("Actor {} already exists", ACTOR_1_NAME)
    );
}

#[tokio::test]
async fn test_list_properties_sorted_by_name() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.create_property("categories", "Zombie").await;
    client.create_property("categories", "Action").await;

    let list: serde_json::Value = client
        .list_properties("categories")
        .await
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Action", "Zombie"]);
}

// =============================================================================
// Rename Tests
// =============================================================================

#[tokio::test]
async fn test_rename_actor_updates_movie_filename() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let actor: serde_json::Value = client
        .create_property("actors", ACTOR_1_NAME)
        .await
        .json()
        .await
        .unwrap();
    let actor_id = actor["id"].as_u64().unwrap() as usize;
    server.add_import("Serpico (Al Pacino).mp4");
    let imported: serde_json::Value = client.import_movies().await.json().await.unwrap();
    let movie_id = imported[0]["id"].as_u64().unwrap() as usize;

    let response = client
        .rename_property("actors", actor_id, "Alfredo Pacino")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let renamed: serde_json::Value = response.json().await.unwrap();
    assert_eq!(renamed["name"], "Alfredo Pacino");

    let movie: serde_json::Value = client.get_movie(movie_id).await.json().await.unwrap();
    assert_eq!(movie["filename"], "Serpico (Alfredo Pacino).mp4");
    assert!(server.movie_file_exists("Serpico (Alfredo Pacino).mp4"));
    assert!(server.link_exists(
        PropertyKind::Actor,
        "Alfredo Pacino",
        "Serpico (Alfredo Pacino).mp4"
    ));
    assert!(!server.link_exists(PropertyKind::Actor, ACTOR_1_NAME, "Serpico (Al Pacino).mp4"));
}

#[tokio::test]
async fn test_rename_category_repoints_links_without_file_rename() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let category: serde_json::Value = client
        .create_property("categories", "Crime")
        .await
        .json()
        .await
        .unwrap();
    let category_id = category["id"].as_u64().unwrap() as usize;
    server.add_import("Heat.mp4");
    let imported: serde_json::Value = client.import_movies().await.json().await.unwrap();
    let movie_id = imported[0]["id"].as_u64().unwrap() as usize;
    client.add_movie_category(movie_id, category_id).await;

    let response = client
        .rename_property("categories", category_id, "Thriller")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let movie: serde_json::Value = client.get_movie(movie_id).await.json().await.unwrap();
    assert_eq!(movie["filename"], "Heat.mp4");
    assert!(server.link_exists(PropertyKind::Category, "Thriller", "Heat.mp4"));
    assert!(!server.link_exists(PropertyKind::Category, "Crime", "Heat.mp4"));
}

#[tokio::test]
async fn test_rename_missing_property_returns_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.rename_property("actors", 999, "Nobody").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(error["detail"]["message"], "Actor ID 999 does not exist");
}

#[tokio::test]
async fn test_rename_to_existing_name_returns_conflict() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.create_property("studios", "Warner").await;
    let other: serde_json::Value = client
        .create_property("studios", "Universal")
        .await
        .json()
        .await
        .unwrap();
    let other_id = other["id"].as_u64().unwrap() as usize;

    let response = client.rename_property("studios", other_id, "Warner").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        error["detail"]["message"],
        "Renaming studio Universal -> Warner conflicts with existing"
    );
}

// =============================================================================
// Delete Tests
// =============================================================================

#[tokio::test]
async fn test_delete_unused_property() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let actor: serde_json::Value = client
        .create_property("actors", ACTOR_1_NAME)
        .await
        .json()
        .await
        .unwrap();
    let actor_id = actor["id"].as_u64().unwrap() as usize;

    let response = client.delete_property("actors", actor_id).await;

    assert_eq!(response.status(), StatusCode::OK);
    let message: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        message["message"],
        format!("Actor with ID {} deleted", actor_id)
    );

    let list: serde_json::Value = client.list_properties("actors").await.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_property_in_use_returns_precondition_failed() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let actor: serde_json::Value = client
        .create_property("actors", ACTOR_1_NAME)
        .await
        .json()
        .await
        .unwrap();
    let actor_id = actor["id"].as_u64().unwrap() as usize;
    server.add_import("Serpico (Al Pacino).mp4");
    client.import_movies().await;

    let response = client.delete_property("actors", actor_id).await;

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        error["detail"]["message"],
        format!(
            "Actor {} (ID {}) has movies assigned to it",
            ACTOR_1_NAME, actor_id
        )
    );
}

#[tokio::test]
async fn test_delete_missing_property_returns_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.delete_property("series", 999).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
