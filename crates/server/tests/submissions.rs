mod common;

use axum::http::{Method, StatusCode};
use common::{TempDatabase, TestApp, feedback_survey, question_ids};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use survey_server::{ServerConfig, entity, error::is_unique_violation};

#[tokio::test]
async fn second_submission_for_same_id_number_conflicts() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    let survey_id = survey["id"].as_i64().expect("survey id");
    let ids = question_ids(&survey);
    let (star, input) = (ids[0], ids[1]);
    let answers = json!([
        {"questionId": star, "value": 5},
        {"questionId": input, "value": "clear slides"}
    ]);

    let (first, body) = app.submit(survey_id, "Zhang", "001", answers.clone()).await;
    assert_eq!(first, StatusCode::CREATED, "{body}");
    assert_eq!(body["user"]["idNumber"], "001");
    assert_eq!(body["answers"][0]["value"], "5");

    let (second, body) = app.submit(survey_id, "Zhang", "001", answers).await;
    assert_eq!(second, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], "CONFLICT");

    // Admin plus one student.
    assert_eq!(app.count_users().await, 2);
    assert_eq!(app.count_submissions().await, 1);
    assert_eq!(app.count_answers().await, 2);
}

#[tokio::test]
async fn name_mismatch_is_rejected_without_writes() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let first = app.create_survey(&token, feedback_survey(1)).await;
    let second = app.create_survey(&token, feedback_survey(2)).await;

    let (status, _) = app
        .submit(
            first["id"].as_i64().expect("survey id"),
            "Zhang",
            "001",
            json!([{"questionId": question_ids(&first)[0], "value": "4"}]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .submit(
            second["id"].as_i64().expect("survey id"),
            "Wang",
            "001",
            json!([{"questionId": question_ids(&second)[0], "value": "3"}]),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NAME_MISMATCH");
    assert_eq!(app.count_users().await, 2);
    assert_eq!(app.count_submissions().await, 1);
    assert_eq!(app.count_answers().await, 1);
}

#[tokio::test]
async fn overlong_input_is_rejected_and_leaves_no_rows() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    let ids = question_ids(&survey);

    let (status, body) = app
        .submit(
            survey["id"].as_i64().expect("survey id"),
            "Zhao",
            "002",
            json!([
                {"questionId": ids[0], "value": "5"},
                {"questionId": ids[1], "value": "x".repeat(21)}
            ]),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], "VALIDATION_FAILED");
    // The student row created during admission is rolled back too.
    assert_eq!(app.count_users().await, 1);
    assert_eq!(app.count_submissions().await, 0);
    assert_eq!(app.count_answers().await, 0);
}

#[tokio::test]
async fn submission_rejections() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    let survey_id = survey["id"].as_i64().expect("survey id");
    let ids = question_ids(&survey);

    let (status, _) = app
        .submit(999, "Zhang", "001", json!([{"questionId": ids[0], "value": "5"}]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.submit(survey_id, "Zhang", "001", json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .submit(survey_id, "  ", "001", json!([{"questionId": ids[0], "value": "5"}]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .submit(survey_id, "Zhang", "001", json!([{"questionId": ids[0], "value": "6"}]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .submit(survey_id, "Zhang", "001", json!([{"questionId": 4242, "value": "3"}]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .submit(
            survey_id,
            "Zhang",
            "001",
            json!([
                {"questionId": ids[0], "value": "3"},
                {"questionId": ids[0], "value": "4"}
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.count_submissions().await, 0);
}

#[tokio::test]
async fn check_reports_existing_submission() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    let survey_id = survey["id"].as_i64().expect("survey id");
    let check_uri = format!("/api/surveys/{survey_id}/check");

    let (status, body) = app
        .post(&check_uri, None, json!({"name": "Zhang", "idNumber": "001"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submitted"], false);

    app.submit(
        survey_id,
        "Zhang",
        "001",
        json!([{"questionId": question_ids(&survey)[0], "value": 4}]),
    )
    .await;

    let (_, body) = app
        .post(&check_uri, None, json!({"name": "Zhang", "idNumber": "001"}))
        .await;
    assert_eq!(body["submitted"], true);

    let (_, body) = app
        .post(&check_uri, None, json!({"name": "Wang", "idNumber": "001"}))
        .await;
    assert_eq!(body["submitted"], false);
}

#[tokio::test]
async fn admin_override_replaces_answers() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    let survey_id = survey["id"].as_i64().expect("survey id");
    let ids = question_ids(&survey);

    app.submit(
        survey_id,
        "Zhang",
        "001",
        json!([{"questionId": ids[0], "value": 2}]),
    )
    .await;

    let body = json!({
        "surveyId": survey_id,
        "user": {"name": "Zhang", "idNumber": "001"},
        "answers": [
            {"questionId": ids[0], "value": 5},
            {"questionId": ids[1], "value": "much better"}
        ]
    });

    let (status, _) = app.put("/api/submissions", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, response) = app.put("/api/submissions", Some(&token), body).await;
    assert_eq!(status, StatusCode::OK, "{response}");
    assert_eq!(response["answers"].as_array().map(Vec::len), Some(2));
    assert_eq!(app.count_submissions().await, 1);
    assert_eq!(app.count_answers().await, 2);

    let (status, _) = app
        .put(
            "/api/submissions",
            Some(&token),
            json!({
                "surveyId": survey_id,
                "user": {"name": "Qian", "idNumber": "404"},
                "answers": [{"questionId": ids[0], "value": 1}]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_rows_hit_unique_constraints() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    let survey_id = survey["id"].as_i64().expect("survey id");
    let ids = question_ids(&survey);

    let (status, body) = app
        .submit(survey_id, "Zhang", "001", json!([{"questionId": ids[0], "value": 4}]))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let user_id = body["user"]["id"].as_i64().expect("user id") as i32;
    let now = chrono::Utc::now().naive_utc();

    let err = entity::submission::ActiveModel {
        survey_id: Set(survey_id as i32),
        user_id: Set(user_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .expect_err("second submission row should be rejected");
    assert!(is_unique_violation(&err), "unexpected error: {err}");

    let err = entity::user::ActiveModel {
        name: Set("Zhang".to_string()),
        id_number: Set("001".to_string()),
        role: Set(0),
        password_hash: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .expect_err("duplicate id number should be rejected");
    assert!(is_unique_violation(&err), "unexpected error: {err}");

    assert_eq!(app.count_submissions().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_admit_exactly_one() {
    let database = TempDatabase::new("concurrent-submit");
    let app = TestApp::with_database(&database.url(), ServerConfig::default()).await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    let survey_id = survey["id"].as_i64().expect("survey id");
    let star = question_ids(&survey)[0];
    let payload = json!({
        "surveyId": survey_id,
        "user": {"name": "Same", "idNumber": "001"},
        "answers": [{"questionId": star, "value": 3}],
    });

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let router = app.router.clone();
            let payload = payload.clone();
            tokio::spawn(async move {
                common::send(router, Method::POST, "/api/submissions", None, Some(payload)).await
            })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        let (status, body) = task.await.expect("submission task should finish");
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT | StatusCode::BAD_REQUEST => {}
            other => panic!("unexpected status {other}: {body}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(app.count_submissions().await, 1);
    // Admin plus one student.
    assert_eq!(app.count_users().await, 2);
}

#[tokio::test]
async fn star_answers_are_stored_canonically() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let survey = app.create_survey(&token, feedback_survey(1)).await;
    let survey_id = survey["id"].as_i64().expect("survey id");
    let ids = question_ids(&survey);

    let (status, body) = app
        .submit(
            survey_id,
            "Zhang",
            "001",
            json!([
                {"questionId": ids[0], "value": "+5"},
                {"questionId": ids[1], "value": " keep spacing "}
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["answers"][0]["value"], "5");
    assert_eq!(body["answers"][1]["value"], " keep spacing ");
}
