mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, feedback_survey};
use serde_json::json;
use survey_core::domain::{Role, UserId};
use survey_server::{ServerConfig, auth::JwtKeys};

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn registered_admin_can_log_in() {
    let app = TestApp::new().await;
    app.admin_token().await;

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({"idNumber": "T-001", "password": "secret-pass"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["token"].as_str().is_some_and(|token| !token.is_empty()));

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({"idNumber": "T-001", "password": "wrong-pass"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_rejections() {
    let app = TestApp::new().await;
    app.admin_token().await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "Teacher Wu", "idNumber": "T-001", "password": "another-pass"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ID_NUMBER_TAKEN");

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "Teacher Wu", "idNumber": "T-002", "password": "123"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_can_be_disabled() {
    let config = ServerConfig {
        allow_registration: false,
        ..ServerConfig::default()
    };
    let app = TestApp::with_config(config).await;

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "Teacher Li", "idNumber": "T-001", "password": "secret-pass"}),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn students_cannot_log_in() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    app.submit(
        survey["id"].as_i64().expect("survey id"),
        "Zhang",
        "001",
        json!([{"questionId": survey["questions"][0]["id"], "value": 4}]),
    )
    .await;

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({"idNumber": "001", "password": "whatever"}),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_routes_require_admin_token() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/api/surveys", None, feedback_survey(1)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app
        .post("/api/surveys", Some("not-a-jwt"), feedback_survey(1))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let student_token = JwtKeys::new(&ServerConfig::default().jwt_secret, 1)
        .issue(UserId::new(1), Role::Student)
        .expect("token should be issued");
    let (status, _) = app
        .post("/api/surveys", Some(&student_token), feedback_survey(1))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::DELETE, "/api/surveys/1", Some(&student_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_look_up_users_by_id_number() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .get("/api/users/by-id-number/T-001", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Teacher Li");

    let (status, _) = app
        .get("/api/users/by-id-number/nobody", Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
