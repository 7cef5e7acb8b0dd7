// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player inbox and evaluation detail tests.
//!
//! Handlers apply no client-side filter, so these exercise the store's
//! visibility rules end to end.

use axum::http::StatusCode;
use serde_json::Value;

mod common;
use common::*;

fn ids(values: &Value) -> Vec<String> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_inbox_lists_participated_sessions_newest_first() {
    let app = create_test_app();

    let response = app.send(get("/player", Some(PLAYER_P))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let inbox = body_json(response).await;

    assert_eq!(inbox["email"], "player-p@example.com");
    assert_eq!(ids(&inbox["sessions"]), vec!["s2", "s1"]);
    assert_eq!(inbox["sessions"][0]["coach_mode_label"], "Off-court");
    assert_eq!(inbox["sessions"][0]["opponent_name"], "Riverside TC");
    assert_eq!(inbox["sessions"][1]["coach_mode_label"], "On-court");
    assert_eq!(inbox["status"], "");

    let response = app.send(get("/player", Some(PLAYER_Q))).await;
    let inbox = body_json(response).await;
    assert_eq!(ids(&inbox["sessions"]), vec!["s1"]);
}

#[tokio::test]
async fn test_evaluation_shows_team_and_own_notes() {
    let app = create_test_app();

    let response = app
        .send(get("/player/evaluations/s1", Some(PLAYER_P)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;

    assert_eq!(detail["session"]["id"], "s1");
    assert_eq!(ids(&detail["team_feedback"]), vec!["f-team"]);
    assert_eq!(ids(&detail["personal_feedback"]), vec!["f-p"]);
    assert_eq!(ids(&detail["team_suggestions"]), vec!["sg-team"]);
    assert_eq!(ids(&detail["personal_suggestions"]), vec!["sg-p"]);
    assert_eq!(
        detail["personal_feedback"][0]["evaluation_items"]["name"],
        "Split step"
    );
    assert_eq!(detail["personal_notice"], Value::Null);
    assert_eq!(detail["status"], "");
}

#[tokio::test]
async fn test_evaluation_hides_other_players_notes() {
    let app = create_test_app();

    let response = app
        .send(get("/player/evaluations/s1", Some(PLAYER_Q)))
        .await;
    let detail = body_json(response).await;

    assert_eq!(ids(&detail["team_feedback"]), vec!["f-team"]);
    assert_eq!(ids(&detail["personal_feedback"]), vec!["f-q"]);
    assert!(ids(&detail["personal_suggestions"]).is_empty());

    let body = detail.to_string();
    assert!(!body.contains("f-p"));
    assert!(!body.contains("Great split step"));
}

#[tokio::test]
async fn test_evaluation_without_personal_feedback_shows_notice() {
    let app = create_test_app();

    let response = app
        .send(get("/player/evaluations/s2", Some(PLAYER_P)))
        .await;
    let detail = body_json(response).await;

    assert_eq!(detail["session"]["id"], "s2");
    assert!(ids(&detail["team_feedback"]).is_empty());
    assert_eq!(
        detail["personal_notice"],
        "No personal notes were shared for this session."
    );
}

#[tokio::test]
async fn test_evaluation_of_unjoined_session_is_an_error() {
    let app = create_test_app();

    let response = app
        .send(get("/player/evaluations/s2", Some(PLAYER_Q)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;

    assert_eq!(detail["session"], Value::Null);
    assert_eq!(
        detail["status"],
        "JSON object requested, multiple (or no) rows returned"
    );
    assert!(ids(&detail["team_feedback"]).is_empty());
}
