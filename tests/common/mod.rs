// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tennis_evals::auth::{AuthClient, Claims, IdentityResolver};
use tennis_evals::config::Config;
use tennis_evals::db::{tables, MemoryStore, SupabaseDb};
use tennis_evals::routes::create_router;
use tennis_evals::services::{PageStore, RosterPage};
use tennis_evals::AppState;
use tower::ServiceExt;

pub const COACH: &str = "coach-1";
pub const OTHER_COACH: &str = "coach-2";
pub const CLUBLESS_COACH: &str = "coach-nc";
pub const PLAYER_P: &str = "player-p";
pub const PLAYER_Q: &str = "player-q";
pub const PENDING: &str = "pending";

/// Router plus handles on its state and backing store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Tables queried since the last call.
    pub fn drain_queries(&self, seen: &mut usize) -> Vec<String> {
        let all = self.store.queried_tables();
        let fresh = all[*seen..].to_vec();
        *seen = all.len();
        fresh
    }

    pub fn player_row(&self, id: &str) -> Option<Value> {
        self.store
            .rows(tables::PLAYERS)
            .into_iter()
            .find(|row| row["id"] == id)
    }
}

/// Create a test app over an in-memory store seeded with two clubs.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let config = Config::test_default();
    let store = Arc::new(MemoryStore::new());
    seed_fixtures(&store);

    let auth = AuthClient::new(&config).unwrap();
    let rosters: PageStore<RosterPage> = PageStore::with_idle_limit(config.page_idle_timeout);
    rosters.spawn_eviction(auth.subscribe());

    let state = Arc::new(AppState {
        identity: IdentityResolver::new(&config.supabase_jwt_secret),
        db: SupabaseDb::in_memory(store.clone(), config.request_timeout),
        auth,
        rosters,
        config,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
    }
}

/// Sign an access token the way the auth provider does.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: Some(format!("{}@example.com", user_id)),
        aud: "authenticated".to_string(),
        exp: now + 3600,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&Config::test_default().supabase_jwt_secret),
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str, user_id: Option<&str>) -> Request<Body> {
    request("GET", uri, user_id, None)
}

#[allow(dead_code)]
pub fn post(uri: &str, user_id: Option<&str>) -> Request<Body> {
    request("POST", uri, user_id, None)
}

#[allow(dead_code)]
pub fn post_form(uri: &str, user_id: Option<&str>, form: &str) -> Request<Body> {
    request("POST", uri, user_id, Some(form))
}

fn request(method: &str, uri: &str, user_id: Option<&str>, form: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(
            header::COOKIE,
            format!("tennis_session={}", create_test_jwt(user_id)),
        );
    }
    match form {
        Some(form) => builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Ids of the players in a roster page model, in order.
#[allow(dead_code)]
pub fn player_ids(page: &Value) -> Vec<String> {
    page["players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

/// Wait (briefly) for a condition driven by a background task.
#[allow(dead_code)]
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..50 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

fn seed_fixtures(store: &MemoryStore) {
    store.seed(
        tables::PROFILES,
        [
            json!({"user_id": COACH, "role": "coach", "club_id": "club-1"}),
            json!({"user_id": OTHER_COACH, "role": "coach", "club_id": "club-2"}),
            json!({"user_id": CLUBLESS_COACH, "role": "coach", "club_id": null}),
            json!({"user_id": PLAYER_P, "role": "player", "club_id": "club-1"}),
            json!({"user_id": PLAYER_Q, "role": "player", "club_id": "club-1"}),
            json!({"user_id": PENDING, "role": null, "club_id": null}),
        ],
    );

    store.seed(
        tables::PLAYERS,
        [
            json!({"id": "p-reyes", "club_id": "club-1", "user_id": PLAYER_P,
                   "first_name": "Ana", "last_name": "Reyes", "dominant_hand": "left",
                   "level": "3.5", "notes": null, "archived_at": null}),
            json!({"id": "p-baker", "club_id": "club-1", "user_id": PLAYER_Q,
                   "first_name": "Bo", "last_name": "Baker", "dominant_hand": "right",
                   "level": null, "notes": null, "archived_at": null}),
            json!({"id": "p-adams", "club_id": "club-1", "user_id": null,
                   "first_name": "Cy", "last_name": "Adams", "dominant_hand": "right",
                   "level": null, "notes": "Moved away", "archived_at": "2026-09-01T00:00:00Z"}),
            json!({"id": "p-ng", "club_id": "club-1", "user_id": null,
                   "first_name": "Dee", "last_name": "Ng", "dominant_hand": "right",
                   "level": "4.0", "notes": null, "archived_at": null}),
            json!({"id": "p-zimmer", "club_id": "club-2", "user_id": null,
                   "first_name": "Al", "last_name": "Zimmer", "dominant_hand": "left",
                   "level": null, "notes": null, "archived_at": null}),
        ],
    );

    store.seed(
        tables::SESSIONS,
        [
            json!({"id": "s1", "club_id": "club-1", "date": "2026-09-10",
                   "play_format": "practice", "coach_mode": "on_court",
                   "location_name": "Court 3", "opponent_name": null}),
            json!({"id": "s2", "club_id": "club-1", "date": "2026-10-01",
                   "play_format": "singles", "coach_mode": "off_court",
                   "location_name": null, "opponent_name": "Riverside TC"}),
            json!({"id": "s3", "club_id": "club-2", "date": "2026-10-05",
                   "play_format": "doubles", "coach_mode": "on_court",
                   "location_name": null, "opponent_name": null}),
        ],
    );

    store.seed(
        tables::SESSION_PLAYERS,
        [
            json!({"session_id": "s1", "player_id": "p-reyes"}),
            json!({"session_id": "s1", "player_id": "p-baker"}),
            json!({"session_id": "s2", "player_id": "p-reyes"}),
        ],
    );

    store.seed(
        tables::FEEDBACK_ENTRIES,
        [
            json!({"id": "f-team", "session_id": "s1", "scope": "team", "player_id": null,
                   "rating": 3, "comment": "Good energy on drills",
                   "evaluation_items": {"category": "Movement", "name": "Footwork"}}),
            json!({"id": "f-p", "session_id": "s1", "scope": "individual", "player_id": "p-reyes",
                   "rating": 4, "comment": "Great split step",
                   "evaluation_items": {"category": "Movement", "name": "Split step"}}),
            json!({"id": "f-q", "session_id": "s1", "scope": "individual", "player_id": "p-baker",
                   "rating": 2, "comment": "Watch the toss",
                   "evaluation_items": {"category": "Serve", "name": "Toss"}}),
        ],
    );

    store.seed(
        tables::SUGGESTIONS,
        [
            json!({"id": "sg-team", "session_id": "s1", "scope": "team", "player_id": null,
                   "strength_text": "Communication", "priority_text": "Net approaches",
                   "drill_text": "Approach and volley"}),
            json!({"id": "sg-p", "session_id": "s1", "scope": "individual", "player_id": "p-reyes",
                   "strength_text": "Backhand", "priority_text": "Second serve",
                   "drill_text": null}),
        ],
    );
}
