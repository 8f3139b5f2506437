//! Role management integration tests.
//!
//! Every `/admin/role` route is guarded by its own permission code. The
//! super-admin bypasses the check; everyone else needs the code directly or
//! through a role.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;
use citadel_test::component::auth::Subject;
use citadel_test::component::constants::permission_codes;

async fn app_with_alice() -> (TestApp, String) {
    let app = TestApp::new().await.expect("Failed to build app");
    app.seed_user("alice", "alice-password")
        .await
        .expect("Failed to seed user");
    let token = app.login("alice", "alice-password").await;
    (app, token)
}

// ============================================================================
// Guard Tests
// ============================================================================

#[test_log::test(tokio::test)]
async fn list_requires_token() {
    let app = TestApp::new().await.expect("Failed to build app");

    TestRequest::get("/admin/role/list")
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn list_follows_grant_and_revoke() {
    let (app, token) = app_with_alice().await;

    TestRequest::get("/admin/role/list")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::FORBIDDEN);

    app.grant("alice", permission_codes::ROLE_LIST)
        .await
        .expect("Failed to grant");
    TestRequest::get("/admin/role/list")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);

    app.revoke("alice", permission_codes::ROLE_LIST)
        .await
        .expect("Failed to revoke");
    TestRequest::get("/admin/role/list")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn grants_flow_through_roles() {
    let (app, token) = app_with_alice().await;
    app.assign_role("alice", "auditor")
        .await
        .expect("Failed to assign role");

    TestRequest::get("/admin/role/list")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);
    TestRequest::delete("/admin/role")
        .bearer(&token)
        .json(&json!([1]))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn authorization_precedes_validation() {
    let (app, token) = app_with_alice().await;

    TestRequest::post("/admin/role")
        .bearer(&token)
        .content_type("application/json")
        .body("{broken")
        .send(app.service())
        .await
        .assert_envelope(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn deleted_role_stops_granting() {
    let (app, token) = app_with_alice().await;
    app.assign_role("alice", "auditor")
        .await
        .expect("Failed to assign role");
    let admin_token = app.login_admin().await;
    let auditor_id = app.role_id("auditor").await.expect("auditor role");

    TestRequest::delete("/admin/role")
        .bearer(&admin_token)
        .json(&json!([auditor_id]))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);

    TestRequest::get("/admin/role/list")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::FORBIDDEN);
    assert!(
        app.state
            .policy
            .permissions(&Subject::role("auditor"))
            .await
            .is_empty()
    );
}

// ============================================================================
// CRUD Tests
// ============================================================================

#[test_log::test(tokio::test)]
async fn super_admin_manages_roles() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;

    TestRequest::post("/admin/role")
        .bearer(&token)
        .json(&json!({ "name": "Editor", "code": "editor", "sort": 3, "remark": "edits" }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);

    let page = TestRequest::get("/admin/role/list?code=editor")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK)
        .data();
    assert_eq!(page["total"], 1);
    assert_eq!(page["list"][0]["name"], "Editor");
    assert_eq!(page["list"][0]["status"], 1);
    let id = page["list"][0]["id"].as_u64().expect("role id");

    TestRequest::put(&format!("/admin/role/{id}"))
        .bearer(&token)
        .json(&json!({ "name": "Writer", "code": "writer", "status": 2 }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);

    let page = TestRequest::get("/admin/role/list?status=2")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK)
        .data();
    assert_eq!(page["total"], 1);
    assert_eq!(page["list"][0]["code"], "writer");

    TestRequest::delete("/admin/role")
        .bearer(&token)
        .json(&json!([id]))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);

    let page = TestRequest::get("/admin/role/list")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK)
        .data();
    assert_eq!(page["total"], 2);
}

#[test_log::test(tokio::test)]
async fn list_paginates() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;

    let page = TestRequest::get("/admin/role/list?page=2&page_size=1")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK)
        .data();
    assert_eq!(page["total"], 2);
    assert_eq!(page["page"], 2);
    assert_eq!(page["list"][0]["code"], "auditor");

    TestRequest::get("/admin/role/list?page=0")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);
    TestRequest::get("/admin/role/list?status=7")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);
}

#[test_log::test(tokio::test)]
async fn invalid_role_changes_are_rejected() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;

    TestRequest::post("/admin/role")
        .bearer(&token)
        .json(&json!({ "name": "Dup", "code": "admin" }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);

    TestRequest::post("/admin/role")
        .bearer(&token)
        .json(&json!({ "name": "", "code": "blank" }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);

    TestRequest::put("/admin/role/9999")
        .bearer(&token)
        .json(&json!({ "name": "Ghost", "code": "ghost" }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::NOT_FOUND);

    TestRequest::put("/admin/role/abc")
        .bearer(&token)
        .json(&json!({ "name": "Ghost", "code": "ghost" }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);

    TestRequest::delete("/admin/role")
        .bearer(&token)
        .json(&json!([]))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);
}

#[test_log::test(tokio::test)]
async fn renaming_a_role_keeps_its_grants() {
    let (app, token) = app_with_alice().await;
    app.assign_role("alice", "auditor")
        .await
        .expect("Failed to assign role");
    let admin_token = app.login_admin().await;
    let auditor_id = app.role_id("auditor").await.expect("auditor role");

    TestRequest::put(&format!("/admin/role/{auditor_id}"))
        .bearer(&admin_token)
        .json(&json!({ "name": "Reviewer", "code": "reviewer" }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);

    TestRequest::get("/admin/role/list")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);
}

// ============================================================================
// Role Permission Tests
// ============================================================================

#[test_log::test(tokio::test)]
async fn role_permissions_round_trip() {
    let (app, token) = app_with_alice().await;
    app.assign_role("alice", "auditor")
        .await
        .expect("Failed to assign role");
    let admin_token = app.login_admin().await;
    let auditor_id = app.role_id("auditor").await.expect("auditor role");
    let delete_menu = app
        .menu_id(permission_codes::ROLE_DELETE)
        .await
        .expect("delete menu");

    TestRequest::put(&format!("/admin/role/setRolePermission/{auditor_id}"))
        .bearer(&admin_token)
        .json(&json!({ "permission_ids": [delete_menu] }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK);

    let menus = TestRequest::get(&format!("/admin/role/getRolePermission/{auditor_id}"))
        .bearer(&admin_token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::OK)
        .data();
    assert_eq!(menus.as_array().map(Vec::len), Some(1));
    assert_eq!(menus[0]["code"], permission_codes::ROLE_DELETE);

    // The previous grant set was replaced
    TestRequest::get("/admin/role/list")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn role_permissions_reject_unknown_ids() {
    let app = TestApp::new().await.expect("Failed to build app");
    let token = app.login_admin().await;
    let admin_id = app.role_id("admin").await.expect("admin role");

    TestRequest::put(&format!("/admin/role/setRolePermission/{admin_id}"))
        .bearer(&token)
        .json(&json!({ "permission_ids": [424_242] }))
        .send(app.service())
        .await
        .assert_envelope(StatusCode::UNPROCESSABLE_ENTITY);

    TestRequest::get("/admin/role/getRolePermission/9999")
        .bearer(&token)
        .send(app.service())
        .await
        .assert_envelope(StatusCode::NOT_FOUND);
}
