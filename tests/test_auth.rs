mod common;

#[tokio::test]
async fn demo_login_issues_token() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let response = server
        .post("/api/users/login")
        .json(&serde_json::json!({ "username": "reader", "password": "reader" }))
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "reader");
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
}

#[tokio::test]
async fn demo_login_wrong_password() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    let response = server
        .post("/api/users/login")
        .json(&serde_json::json!({ "username": "reader", "password": "wrong" }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn me_returns_profile() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.login(&server, "reader").await;

    let response = server
        .get("/api/users/me")
        .authorization_bearer(&token)
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["username"], "reader");
    assert_eq!(body["user"]["email"], "reader@demo.talebook.dev");
    assert!(body["fictions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn me_without_token() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    let response = server.get("/api/users/me").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    env.login(&server, "reader").await;
    let user = env.users.find_by_username("reader").await.unwrap().unwrap();
    let forged =
        talebook::auth::token::issue_token(&user.id, "other-secret", chrono::Duration::hours(1))
            .unwrap();

    let response = server
        .get("/api/users/me")
        .authorization_bearer(&forged)
        .await;
    response.assert_status_unauthorized();
}
