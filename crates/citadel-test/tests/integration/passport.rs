//! Passport integration tests: login, profile, logout and token refresh.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;
use citadel_test::component::model::Status;

#[test_log::test(tokio::test)]
async fn login_returns_token_and_profile() {
    let app = TestApp::new().await.expect("Failed to build app");

    let response = TestRequest::post("/admin/passport/login")
        .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);

    let data = response.data();
    assert_eq!(data["token"].as_str().map(str::len), Some(43));
    assert_eq!(data["expires_in"], 3600);
    assert_eq!(data["user"]["username"], ADMIN_USERNAME);
    assert!(
        data["user"].get("password_hash").is_none(),
        "password hash must never be serialized"
    );
}

#[test_log::test(tokio::test)]
async fn bad_credentials_share_one_message() {
    let app = TestApp::new().await.expect("Failed to build app");
    app.seed_user_with_status("frozen", "frozen-password", Status::Disable)
        .await
        .expect("Failed to seed user");

    let mut messages = Vec::new();
    for (username, password) in [
        (ADMIN_USERNAME, "wrong"),
        ("nobody", "whatever"),
        ("frozen", "frozen-password"),
    ] {
        let response = TestRequest::post("/admin/passport/login")
            .json(&json!({ "username": username, "password": password }))
            .send(app.service())
            .await
            .assert_envelope(StatusCode::UNAUTHORIZED);
        assert!(response.data().is_null());
        messages.push(response.message());
    }

    assert_eq!(messages[0], "Invalid username or password");
    assert!(messages.iter().all(|m| *m == messages[0]));
}

#[test_log::test(tokio::test)]
async fn login_validates_body() {
    let app = TestApp::new().await.expect("Failed to build app");

    TestRequest::post("/admin/passport/login")
        .json(&json!({ "username": "", "password": "x" }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);

    TestRequest::post("/admin/passport/login")
        .json(&json!({ "username": ADMIN_USERNAME }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);

    TestRequest::post("/admin/passport/login")
        .content_type("application/json")
        .body("{not json")
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);
}

#[test_log::test(tokio::test)]
async fn get_info_reports_super_admin_wildcard() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;

    let data = TestRequest::get("/admin/passport/getInfo")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK)
        .data();

    assert_eq!(data["user"]["username"], ADMIN_USERNAME);
    assert_eq!(data["codes"], json!(["*"]));
}

#[test_log::test(tokio::test)]
async fn get_info_lists_inherited_codes() {
    let app = TestApp::new().await.expect("Failed to build app");
    app.seed_user("alice", "alice-password")
        .await
        .expect("Failed to seed user");
    app.assign_role("alice", "auditor")
        .await
        .expect("Failed to assign role");
    let token = app.login("alice", "alice-password").await;

    let data = TestRequest::get("/admin/passport/getInfo")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK)
        .data();

    assert_eq!(data["roles"], json!(["auditor"]));
    let codes: Vec<&str> = data["codes"]
        .as_array()
        .expect("codes array")
        .iter()
        .filter_map(|c| c.as_str())
        .collect();
    assert!(codes.contains(&"role:list"));
    assert!(!codes.contains(&"role:delete"));
}

#[test_log::test(tokio::test)]
async fn missing_or_invalid_token_is_401() {
    let app = TestApp::new().await.expect("Failed to build app");

    TestRequest::get("/admin/passport/getInfo")
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNAUTHORIZED);

    TestRequest::get("/admin/passport/getInfo")
        .bearer("not-a-real-token")
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn token_is_accepted_from_query() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;

    TestRequest::get(&format!("/admin/passport/getInfo?token={token}"))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn logout_invalidates_token() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;
    let other = app.login_admin().await;

    let response = TestRequest::post("/admin/passport/logout")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);
    assert!(response.data().is_null());

    TestRequest::get("/admin/passport/getInfo")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNAUTHORIZED);
    TestRequest::post("/admin/passport/logout")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNAUTHORIZED);

    // Sessions are independent
    TestRequest::get("/admin/passport/getInfo")
        .bearer(&other)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn refresh_rotates_token() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;

    let data = TestRequest::post("/admin/passport/refresh")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK)
        .data();
    let fresh = data["token"].as_str().expect("new token").to_string();
    assert_ne!(fresh, token);

    TestRequest::get("/admin/passport/getInfo")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNAUTHORIZED);
    TestRequest::get("/admin/passport/getInfo")
        .bearer(&fresh)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_refresh_has_single_winner() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;

    let (first, second) = tokio::join!(
        TestRequest::post("/admin/passport/refresh")
            .bearer(&token)
            .send(app.service()),
        TestRequest::post("/admin/passport/refresh")
            .bearer(&token)
            .send(app.service()),
    );

    let mut statuses = [first.status, second.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::UNAUTHORIZED]);
    assert_eq!(app.state.sessions.active_count().await, 1);
}
