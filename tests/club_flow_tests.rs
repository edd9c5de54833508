//! End-to-end HTTP flow over a live database.

mod common;

use common::{TestApp, TestDb, register_and_login};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_club_flow_over_http() {
    let test_db = TestDb::new("test_club_flow_over_http").await;
    let app = TestApp::new().await;
    let club_name = test_db.name("film");

    let (owner_token, _) =
        register_and_login(&app, &test_db.name("owner"), &test_db.email("owner")).await;
    let (member_token, refresh) =
        register_and_login(&app, &test_db.name("member"), &test_db.email("member")).await;

    // Refresh yields a working access token
    let refreshed: Value = app
        .client
        .post(app.url("/api/token/refresh/"))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let response = app
        .client
        .get(app.url("/api/user/"))
        .bearer_auth(refreshed["access"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .post(app.url("/api/clubs/"))
        .bearer_auth(&owner_token)
        .json(&json!({ "name": club_name, "description": "Weekly screenings" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = app
        .client
        .post(app.url(&format!("/api/clubs/{}/add-member/", club_name)))
        .bearer_auth(&owner_token)
        .json(&json!({ "email": test_db.email("member") }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        format!("User {} added to {}", test_db.email("member"), club_name)
    );

    let members: Vec<Value> = app
        .client
        .get(app.url(&format!("/api/clubs/{}/members/", club_name)))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(members.len(), 2);

    let response = app
        .client
        .post(app.url(&format!("/api/clubs/{}/events/", club_name)))
        .bearer_auth(&member_token)
        .json(&json!({ "name": "Noir night", "date": "2031-05-02T19:00:00Z" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let event: Value = response.json().await.unwrap();

    let events: Vec<Value> = app
        .client
        .get(app.url(&format!(
            "/api/clubs/{}/events/?year=2031&month=5",
            club_name
        )))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(events.len(), 1);

    let response = app
        .client
        .delete(app.url(&format!("/api/events/{}", event["id"].as_str().unwrap())))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = app
        .client
        .get(app.url("/api/search-users/?query="))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
