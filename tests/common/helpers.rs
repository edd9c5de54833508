//! Shared test helper functions

use serde_json::json;

use crate::common::TestApp;

/// Short random suffix for names that must be unique across runs.
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, nanoid::nanoid!(8, &nanoid::alphabet::SAFE[2..]))
}

/// Registers a user over HTTP and returns `(access_token, refresh_token)`.
pub async fn register_and_login(app: &TestApp, username: &str, email: &str) -> (String, String) {
    let response = app
        .client
        .post(app.url("/api/register/"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "SecurePass123!",
            "password2": "SecurePass123!"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let login: serde_json::Value = app
        .client
        .post(app.url("/api/login/"))
        .json(&json!({ "username": username, "password": "SecurePass123!" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    (
        login["token"]["access"].as_str().unwrap().to_string(),
        login["token"]["refresh"].as_str().unwrap().to_string(),
    )
}
