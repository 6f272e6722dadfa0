/// API tests
///
/// The first group drives the router without a database: authentication,
/// request validation and static endpoints are all decided before any query
/// runs. The second group needs a migrated PostgreSQL database and is
/// ignored by default:
///
/// ```bash
/// TEST_DATABASE_URL=postgresql://localhost/swamp_test cargo test -p swamp-api -- --ignored
/// ```

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{expired_token_for, token_for, unique_username, TestContext};
use serde_json::json;
use swamp_shared::auth::jwt::{create_token, Claims};
use tower::Service as _;
use uuid::Uuid;

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let ctx = TestContext::offline();

    let (status, body) = ctx.request(Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["app"], "SwampScheduler");
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"]["connected"], false);
    assert!(body["database"]["message"].is_string());
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn test_levels_are_public() {
    let ctx = TestContext::offline();

    let (status, body) = ctx.request(Method::GET, "/api/levels", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let levels = body["levels"].as_array().unwrap();
    assert_eq!(levels.len(), 10);
    assert_eq!(levels[0]["name"], "Hatchling");
    assert_eq!(levels[9]["max_xp"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::offline();

    let routes = [
        (Method::GET, "/api/tasks"),
        (Method::POST, "/api/tasks"),
        (Method::GET, "/api/user/profile"),
        (Method::GET, "/api/xp"),
        (Method::GET, "/api/achievements"),
        (Method::POST, "/api/pomodoro/start"),
        (Method::GET, "/api/boards"),
        (Method::GET, "/api/invites"),
        (Method::GET, "/api/analytics/streak"),
        (Method::POST, "/api/auth/logout"),
    ];

    for (method, uri) in routes {
        let (status, body) = ctx.request(method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let ctx = TestContext::offline();
    let token = expired_token_for(Uuid::new_v4(), "albert@ufl.edu");

    let (status, body) = ctx.request(Method::GET, "/api/tasks", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let ctx = TestContext::offline();
    let claims = Claims::new(Uuid::new_v4(), Some("albert@ufl.edu".to_string()));
    let token = create_token(&claims, "some-other-project-secret-0123456789").unwrap();

    let (status, _) = ctx.request(Method::GET, "/api/xp", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let ctx = TestContext::offline();

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "chomp1234",
                "username": "al",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "username"]);
}

#[tokio::test]
async fn test_register_enforces_password_policy() {
    let ctx = TestContext::offline();

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "albert@ufl.edu",
                "password": "no-digits-here",
                "username": "albert",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "password");
    assert_eq!(body["details"][0]["message"], "Password must contain a digit");
}

#[tokio::test]
async fn test_login_and_refresh_validation() {
    let ctx = TestContext::offline();

    let (status, _) = ctx
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "albert", "password": "chomp1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = ctx
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_refresh_with_unknown_token_is_unauthorized() {
    let ctx = TestContext::offline();

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": "never-issued" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_logout_revokes_session_upstream() {
    let ctx = TestContext::offline();
    let token = token_for(Uuid::new_v4(), "albert@ufl.edu");

    let (status, body) = ctx
        .request(Method::POST, "/api/auth/logout", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
    assert_eq!(ctx.auth.signed_out.lock().unwrap().as_slice(), [token]);
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let ctx = TestContext::offline();

    let request = Request::builder()
        .uri("/api/levels")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("cache-control").unwrap(), "public, max-age=3600");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::offline();

    let (status, _) = ctx.request(Method::GET, "/api/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_gets_json_error() {
    let ctx = TestContext::offline();

    let (status, content_type, body) = ctx
        .request_raw(Method::POST, "/api/auth/login", None, "{\"email\": ")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, "application/json");
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("JSON"));
}

#[tokio::test]
async fn test_mistyped_json_field_gets_json_error() {
    let ctx = TestContext::offline();

    let (status, content_type, body) = ctx
        .request_raw(
            Method::POST,
            "/api/auth/login",
            None,
            "{\"email\": \"albert@ufl.edu\", \"password\": 1234}",
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, "application/json");
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_non_uuid_path_gets_json_error() {
    let ctx = TestContext::offline();
    let token = token_for(Uuid::new_v4(), "albert@ufl.edu");

    for (method, uri) in [
        (Method::GET, "/api/tasks/not-a-uuid"),
        (Method::POST, "/api/tasks/not-a-uuid/complete"),
        (Method::POST, "/api/pomodoro/42/complete"),
        (Method::GET, "/api/boards/nope/tasks"),
    ] {
        let (status, body) = ctx.request(method, uri, Some(&token), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "bad_request", "{}", uri);
    }
}

#[tokio::test]
async fn test_bad_query_value_gets_json_error() {
    let ctx = TestContext::offline();
    let token = token_for(Uuid::new_v4(), "albert@ufl.edu");

    let (status, body) = ctx
        .request(
            Method::GET,
            "/api/analytics/tasks?end_date=yesterday",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = ctx
        .request(Method::GET, "/api/pomodoro/sessions?limit=ten", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

// Database-backed tests

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_register_login_and_profile() {
    let ctx = TestContext::with_database().await.unwrap();
    let username = unique_username("albert");

    let (token, user) = ctx.register(&username).await;
    assert_eq!(user["username"], username.as_str());
    assert_eq!(user["major"], "Computer Science");

    // Same username again
    let (status, _) = ctx
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": format!("{}@ufl.edu", Uuid::new_v4().simple()),
                "password": "chomp1234",
                "username": username,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = ctx
        .request(Method::GET, "/api/user/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["xp"]["level"], 1);
    assert_eq!(body["xp"]["total_xp"], 0);

    let (status, body) = ctx
        .request(
            Method::PUT,
            "/api/user/profile",
            Some(&token),
            Some(json!({ "year": "Junior", "major": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["year"], "Junior");
    assert_eq!(body["user"]["major"], serde_json::Value::Null);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_first_token_use_creates_profile() {
    let ctx = TestContext::with_database().await.unwrap();
    let email = format!("walkin-{}@ufl.edu", Uuid::new_v4().simple());
    let token = token_for(Uuid::new_v4(), &email);

    let (status, body) = ctx
        .request(Method::GET, "/api/user/profile", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email.as_str());
    assert!(body["user"]["username"].as_str().unwrap().starts_with("walkin"));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_task_completion_awards_xp_once() {
    let ctx = TestContext::with_database().await.unwrap();
    let (token, _) = ctx.register(&unique_username("tasker")).await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": "COP3530 project", "priority": "High", "due_date": "2026-12-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = body["task"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["task"]["completed"], false);

    let uri = format!("/api/tasks/{}/complete", task_id);
    let (status, body) = ctx.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["completed"], true);
    // 10 for the task, 10 for First Steps
    assert_eq!(body["xp_awarded"], 20);
    assert_eq!(body["total_xp"], 20);
    assert_eq!(body["leveled_up"], false);
    assert_eq!(body["achievements_earned"][0]["code"], "first_steps");

    let (status, _) = ctx.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = ctx
        .request(Method::GET, "/api/tasks?completed=true", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (_, body) = ctx
        .request(Method::GET, "/api/achievements", Some(&token), None)
        .await;
    assert_eq!(body["total"], 12);
    assert_eq!(body["earned_count"], 1);

    let (_, body) = ctx
        .request(Method::GET, "/api/analytics/daily-completions", Some(&token), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 7);
    assert_eq!(body["data"][6], 1);

    let (_, body) = ctx
        .request(Method::GET, "/api/analytics/streak", Some(&token), None)
        .await;
    assert_eq!(body["current_streak"], 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_pomodoro_flow() {
    let ctx = TestContext::with_database().await.unwrap();
    let (token, _) = ctx.register(&unique_username("focus")).await;

    let (status, body) = ctx
        .request(Method::POST, "/api/pomodoro/start", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["duration_minutes"], 25);
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let uri = format!("/api/pomodoro/{}/complete", session_id);
    let (status, body) = ctx.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    // 5 for the session, 10 for Focus Initiate
    assert_eq!(body["xp_awarded"], 15);
    assert_eq!(body["session"]["completed"], true);

    let (status, _) = ctx.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = ctx
        .request(Method::GET, "/api/analytics/focus", Some(&token), None)
        .await;
    assert_eq!(body["completed_sessions"], 1);
    assert_eq!(body["total_focus_minutes"], 25);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_pomodoro_start_rejects_bad_bodies() {
    let ctx = TestContext::with_database().await.unwrap();
    let (token, _) = ctx.register(&unique_username("strict")).await;

    let (status, _, body) = ctx
        .request_raw(
            Method::POST,
            "/api/pomodoro/start",
            Some(&token),
            "{\"duration_minutes\":\"50\"}",
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    for duration in [0, 121] {
        let (status, body) = ctx
            .request(
                Method::POST,
                "/api/pomodoro/start",
                Some(&token),
                Some(json!({ "duration_minutes": duration })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "duration_minutes");
    }

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/pomodoro/start",
            Some(&token),
            Some(json!({ "duration_minutes": 50 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["duration_minutes"], 50);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_analytics_extreme_dates_are_rejected() {
    let ctx = TestContext::with_database().await.unwrap();
    let (token, _) = ctx.register(&unique_username("calendar")).await;

    let (status, body) = ctx
        .request(
            Method::GET,
            "/api/analytics/tasks?end_date=-262143-01-01",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_board_invite_and_tasks() {
    let ctx = TestContext::with_database().await.unwrap();
    let (owner, _) = ctx.register(&unique_username("owner")).await;
    let member_name = unique_username("member");
    let (member, member_user) = ctx.register(&member_name).await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/boards",
            Some(&owner),
            Some(json!({ "name": "Group project" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let board_id = body["board"]["id"].as_str().unwrap().to_string();
    let board_uri = format!("/api/boards/{}", board_id);

    // Not a member yet
    let (status, _) = ctx.request(Method::GET, &board_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let invite_uri = format!("{}/invite", board_uri);
    let (status, _) = ctx
        .request(
            Method::POST,
            &invite_uri,
            Some(&owner),
            Some(json!({ "username": member_name })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = ctx
        .request(
            Method::POST,
            &invite_uri,
            Some(&owner),
            Some(json!({ "username": member_name })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = ctx.request(Method::GET, "/api/invites", Some(&member), None).await;
    let invite_id = body["invites"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request(
            Method::POST,
            &format!("/api/invites/{}/accept", invite_id),
            Some(&member),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .request(
            Method::POST,
            &format!("{}/tasks", board_uri),
            Some(&member),
            Some(json!({ "title": "Slides", "status": "in_progress", "assigned_to": member_name })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["task"]["status"], "in_progress");
    assert_eq!(body["task"]["assigned_username"], member_name.as_str());
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    // Board tasks stay off the personal list
    let (_, body) = ctx.request(Method::GET, "/api/tasks", Some(&member), None).await;
    assert_eq!(body["total"], 0);

    let (status, body) = ctx
        .request(
            Method::PUT,
            &format!("{}/tasks/{}", board_uri, task_id),
            Some(&owner),
            Some(json!({ "status": "done", "assigned_to": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "done");
    assert_eq!(body["task"]["assigned_to"], serde_json::Value::Null);

    let (_, body) = ctx
        .request(Method::GET, &format!("{}/members", board_uri), Some(&member), None)
        .await;
    assert_eq!(body["members"].as_array().unwrap().len(), 2);
    assert_eq!(body["is_owner"], false);

    // Members cannot delete the board
    let (status, _) = ctx.request(Method::DELETE, &board_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let member_id = member_user["id"].as_str().unwrap();
    let (status, _) = ctx
        .request(
            Method::DELETE,
            &format!("{}/members/{}", board_uri, member_id),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.request(Method::GET, &board_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.request(Method::DELETE, &board_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.request(Method::GET, &board_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
