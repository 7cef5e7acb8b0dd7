// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach roster tests: club scoping, search, archive/restore/delete and
//! the add/edit forms.

use axum::http::StatusCode;
use serde_json::Value;

mod common;
use common::*;

#[tokio::test]
async fn test_roster_is_club_scoped_and_ordered() {
    let app = create_test_app();

    let response = app.send(get("/coach/players", Some(COACH))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_json(response).await;
    assert_eq!(player_ids(&page), vec!["p-baker", "p-ng", "p-reyes"]);
    assert_eq!(page["status"], "");
    assert_eq!(page["show_archived"], false);

    let response = app.send(get("/coach/players", Some(OTHER_COACH))).await;
    let page = body_json(response).await;
    assert_eq!(player_ids(&page), vec!["p-zimmer"]);
}

#[tokio::test]
async fn test_show_archived_includes_archived_players() {
    let app = create_test_app();

    let response = app
        .send(get("/coach/players?show_archived=true", Some(COACH)))
        .await;
    let page = body_json(response).await;

    assert_eq!(
        player_ids(&page),
        vec!["p-adams", "p-baker", "p-ng", "p-reyes"]
    );
    assert_eq!(page["players"][0]["archived_at"], "2026-09-01T00:00:00Z");
}

#[tokio::test]
async fn test_search_filters_held_records_without_query() {
    let app = create_test_app();
    app.send(get("/coach/players", Some(COACH))).await;

    let mut seen = app.store.queried_tables().len();
    let response = app.send(get("/coach/players?q=ANA%20re", Some(COACH))).await;
    let page = body_json(response).await;

    assert_eq!(player_ids(&page), vec!["p-reyes"]);
    assert_eq!(page["search"], "ANA re");
    // Only the gate's profile lookup reached the store
    assert_eq!(app.drain_queries(&mut seen), vec!["users_profile"]);
}

#[tokio::test]
async fn test_archive_requires_confirmation() {
    let app = create_test_app();
    app.send(get("/coach/players", Some(COACH))).await;

    let response = app
        .send(post("/coach/players/p-ng/archive", Some(COACH)))
        .await;
    let page = body_json(response).await;

    assert_eq!(
        page["status"],
        "Archive Dee Ng? They will be hidden from the roster until restored."
    );
    assert_eq!(player_ids(&page), vec!["p-baker", "p-ng", "p-reyes"]);
    assert_eq!(app.player_row("p-ng").unwrap()["archived_at"], Value::Null);
}

#[tokio::test]
async fn test_confirmed_archive_drops_row_without_refetch() {
    let app = create_test_app();
    app.send(get("/coach/players", Some(COACH))).await;
    let mut seen = app.store.queried_tables().len();

    let response = app
        .send(post("/coach/players/p-ng/archive?confirm=true", Some(COACH)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;

    assert_eq!(player_ids(&page), vec!["p-baker", "p-reyes"]);
    assert_eq!(page["status"], "Archived Dee Ng.");
    assert!(!app.player_row("p-ng").unwrap()["archived_at"].is_null());

    // Profile lookup by the gate, then the single update
    assert_eq!(app.drain_queries(&mut seen), vec!["users_profile", "players"]);
}

#[tokio::test]
async fn test_archive_with_archived_shown_patches_in_place_then_restore() {
    let app = create_test_app();
    app.send(get("/coach/players?show_archived=true", Some(COACH)))
        .await;

    let response = app
        .send(post("/coach/players/p-ng/archive?confirm=true", Some(COACH)))
        .await;
    let page = body_json(response).await;
    assert_eq!(
        player_ids(&page),
        vec!["p-adams", "p-baker", "p-ng", "p-reyes"]
    );
    assert!(!page["players"][2]["archived_at"].is_null());

    let response = app
        .send(post("/coach/players/p-ng/restore", Some(COACH)))
        .await;
    let page = body_json(response).await;
    assert_eq!(page["players"][2]["archived_at"], Value::Null);
    assert_eq!(page["status"], "Restored Dee Ng.");
    assert_eq!(app.player_row("p-ng").unwrap()["archived_at"], Value::Null);
}

#[tokio::test]
async fn test_delete_of_active_player_is_rejected_without_write() {
    let app = create_test_app();
    app.send(get("/coach/players", Some(COACH))).await;
    let mut seen = app.store.queried_tables().len();

    let response = app
        .send(post("/coach/players/p-ng/delete?confirm=true", Some(COACH)))
        .await;
    let page = body_json(response).await;

    assert_eq!(page["status"], "Archive Dee Ng before deleting.");
    assert!(app.player_row("p-ng").is_some());
    assert_eq!(app.drain_queries(&mut seen), vec!["users_profile"]);
}

#[tokio::test]
async fn test_delete_archived_player_needs_confirmation_then_removes_row() {
    let app = create_test_app();
    app.send(get("/coach/players?show_archived=true", Some(COACH)))
        .await;

    let response = app
        .send(post("/coach/players/p-adams/delete", Some(COACH)))
        .await;
    let page = body_json(response).await;
    assert_eq!(
        page["status"],
        "Permanently delete Cy Adams? This cannot be undone."
    );
    assert!(app.player_row("p-adams").is_some());

    let response = app
        .send(post("/coach/players/p-adams/delete?confirm=true", Some(COACH)))
        .await;
    let page = body_json(response).await;
    assert_eq!(player_ids(&page), vec!["p-baker", "p-ng", "p-reyes"]);
    assert_eq!(page["status"], "Deleted Cy Adams.");
    assert!(app.player_row("p-adams").is_none());

    // A local search does not bring it back
    let response = app
        .send(get("/coach/players?q=&show_archived=true", Some(COACH)))
        .await;
    let page = body_json(response).await;
    assert!(!player_ids(&page).contains(&"p-adams".to_string()));
}

#[tokio::test]
async fn test_action_without_mounted_page_redirects_to_roster() {
    let app = create_test_app();

    let response = app
        .send(post("/coach/players/p-ng/archive?confirm=true", Some(COACH)))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/coach/players");
    assert_eq!(app.player_row("p-ng").unwrap()["archived_at"], Value::Null);
}

#[tokio::test]
async fn test_action_on_player_not_listed_reports_inline() {
    let app = create_test_app();
    app.send(get("/coach/players", Some(COACH))).await;

    let response = app
        .send(post("/coach/players/p-zimmer/archive?confirm=true", Some(COACH)))
        .await;
    let page = body_json(response).await;

    assert_eq!(page["status"], "That player is not in the current list.");
    assert_eq!(app.player_row("p-zimmer").unwrap()["archived_at"], Value::Null);
}

#[tokio::test]
async fn test_add_player_with_empty_level_stores_null() {
    let app = create_test_app();

    let response = app
        .send(post_form(
            "/coach/players",
            Some(COACH),
            "first_name=Ana&last_name=Reyes&dominant_hand=left&level=&notes=",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/coach/players");

    let rows = app.store.rows("players");
    let added = rows
        .iter()
        .find(|row| row["id"].as_str().unwrap().starts_with("mem-"))
        .unwrap();
    assert_eq!(added["club_id"], "club-1");
    assert_eq!(added["level"], Value::Null);
    assert_eq!(added["notes"], Value::Null);
    assert_eq!(added["dominant_hand"], "left");
}

#[tokio::test]
async fn test_add_player_with_blank_name_is_rejected_inline() {
    let app = create_test_app();
    let before = app.store.rows("players").len();

    let response = app
        .send(post_form(
            "/coach/players",
            Some(COACH),
            "first_name=%20%20&last_name=Reyes&dominant_hand=right",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["status"], "First name is required.");
    assert_eq!(app.store.rows("players").len(), before);
}

#[tokio::test]
async fn test_edit_form_is_prefilled_and_saves() {
    let app = create_test_app();

    let response = app.send(get("/coach/players/p-reyes", Some(COACH))).await;
    let page = body_json(response).await;
    assert_eq!(page["player_id"], "p-reyes");
    assert_eq!(page["form"]["first_name"], "Ana");
    assert_eq!(page["form"]["level"], "3.5");

    let response = app
        .send(post_form(
            "/coach/players/p-reyes",
            Some(COACH),
            "first_name=Ana&last_name=Reyes&dominant_hand=left&level=4.0&notes=Lefty%20serve",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let row = app.player_row("p-reyes").unwrap();
    assert_eq!(row["level"], "4.0");
    assert_eq!(row["notes"], "Lefty serve");
    assert_eq!(row["club_id"], "club-1");
}

#[tokio::test]
async fn test_other_clubs_player_cannot_be_edited() {
    let app = create_test_app();

    let response = app.send(get("/coach/players/p-zimmer", Some(COACH))).await;
    let page = body_json(response).await;
    assert_eq!(
        page["status"],
        "JSON object requested, multiple (or no) rows returned"
    );

    let response = app
        .send(post_form(
            "/coach/players/p-zimmer",
            Some(COACH),
            "first_name=Hijacked&last_name=Zimmer&dominant_hand=left",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.player_row("p-zimmer").unwrap()["first_name"], "Al");
}

#[tokio::test]
async fn test_club_sessions_newest_first() {
    let app = create_test_app();

    let response = app.send(get("/coach/sessions", Some(COACH))).await;
    let page = body_json(response).await;

    let ids: Vec<&str> = page["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["s2", "s1"]);
}
