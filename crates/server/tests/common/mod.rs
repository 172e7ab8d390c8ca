#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use survey_server::{AppState, ServerConfig, create_router, db, entity};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(ServerConfig::default()).await
    }

    pub async fn with_config(config: ServerConfig) -> Self {
        Self::with_database("sqlite::memory:", config).await
    }

    pub async fn with_database(database_url: &str, config: ServerConfig) -> Self {
        let db = db::init_pool_and_migrate(database_url)
            .await
            .expect("database should migrate");
        let router = create_router(Arc::new(AppState::new(db.clone(), config)));
        Self { router, db }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send(self.router.clone(), method, uri, token, body).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    /// Registers an admin and returns its bearer token.
    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({"name": "Teacher Li", "idNumber": "T-001", "password": "secret-pass"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"]
            .as_str()
            .expect("token should be a string")
            .to_string()
    }

    /// Creates a survey and returns its JSON representation.
    pub async fn create_survey(&self, token: &str, body: Value) -> Value {
        let (status, body) = self.post("/api/surveys", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "create survey failed: {body}");
        body
    }

    pub async fn submit(
        &self,
        survey_id: i64,
        name: &str,
        id_number: &str,
        answers: Value,
    ) -> (StatusCode, Value) {
        self.post(
            "/api/submissions",
            None,
            json!({
                "surveyId": survey_id,
                "user": {"name": name, "idNumber": id_number},
                "answers": answers,
            }),
        )
        .await
    }

    pub async fn count_users(&self) -> u64 {
        entity::user::Entity::find()
            .count(&self.db)
            .await
            .expect("count users")
    }

    pub async fn count_submissions(&self) -> u64 {
        entity::submission::Entity::find()
            .count(&self.db)
            .await
            .expect("count submissions")
    }

    pub async fn count_answers(&self) -> u64 {
        entity::answer::Entity::find()
            .count(&self.db)
            .await
            .expect("count answers")
    }
}

/// Drives one request through `router`; usable from spawned tasks.
pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = router.oneshot(request).await.expect("router should respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be json")
    };
    (status, json)
}

/// SQLite file under the temp dir, removed on drop.
pub struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    pub fn new(label: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "survey-{label}-{}-{nanos}.db",
            std::process::id()
        ));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// A survey with a 5-star question followed by a free-text question.
pub fn feedback_survey(week: i64) -> Value {
    json!({
        "title": format!("Week {week} feedback"),
        "description": "Weekly lecture feedback",
        "year": 2025,
        "semester": 1,
        "week": week,
        "questions": [
            {"description": "Rate the lecture", "config": {"type": "star", "maxRating": 5}},
            {"description": "Anything to add?", "config": {"type": "input", "maxLength": 20}}
        ]
    })
}

pub fn question_ids(survey: &Value) -> Vec<i64> {
    survey["questions"]
        .as_array()
        .expect("questions should be an array")
        .iter()
        .map(|question| question["id"].as_i64().expect("question id"))
        .collect()
}
