use rollcall_users::{
    queries::{get_users, GetUsers},
    user_store, Outcome, User
};
use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Match, Mock, MockServer, Request, ResponseTemplate
};

/// Matches GraphQL requests by their `operationName`.
struct Operation(&'static str);

impl Match for Operation {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .map(|body| body["operationName"] == self.0)
            .unwrap_or(false)
    }
}

fn user(id: &str, name: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string()
    }
}

async fn mount(server: &MockServer, operation: &'static str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("content-type", "application/json"))
        .and(Operation(operation))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GetUsers",
        ResponseTemplate::new(200).set_body_json(json!({
            "data": { "users": [{ "id": "1", "name": "Ann", "email": "ann@x.com" }] }
        }))
    )
    .await;
    mount(
        &server,
        "CreateUser",
        ResponseTemplate::new(200).set_body_json(json!({
            "data": { "createUser": { "id": "2", "name": "Bob", "email": "bob@x.com" } }
        }))
    )
    .await;
    mount(
        &server,
        "UpdateUser",
        ResponseTemplate::new(200).set_body_json(json!({
            "data": { "updateUser": { "id": "2", "name": "Bobby", "email": "bob@x.com" } }
        }))
    )
    .await;
    mount(
        &server,
        "DeleteUser",
        ResponseTemplate::new(200).set_body_json(json!({ "data": { "deleteUser": true } }))
    )
    .await;
    let store = user_store(format!("{}/graphql", server.uri()));

    assert_eq!(store.fetch_users().await, Outcome::Committed);
    assert_eq!(store.create_user("Bob", "bob@x.com").await, Outcome::Committed);
    assert_eq!(
        store.update_user("2", "Bobby", "bob@x.com").await,
        Outcome::Committed
    );
    assert_eq!(store.delete_user("1").await, Outcome::Committed);

    let expected = vec![user("2", "Bobby", "bob@x.com")];
    assert_eq!(store.users(), expected);
    let cached = store
        .client()
        .cache()
        .read_query(GetUsers, &get_users::Variables)
        .unwrap();
    assert_eq!(
        cached.users.into_iter().map(User::from).collect::<Vec<_>>(),
        expected
    );
}

#[tokio::test]
async fn fetch_always_goes_to_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(Operation("GetUsers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "users": [] }
        })))
        .expect(2)
        .mount(&server)
        .await;
    let store = user_store(format!("{}/graphql", server.uri()));

    store.fetch_users().await;
    store.fetch_users().await;
}

#[tokio::test]
async fn server_errors_end_up_in_the_error_state() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GetUsers",
        ResponseTemplate::new(500).set_body_string("Internal Server Error")
    )
    .await;
    mount(
        &server,
        "CreateUser",
        ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "email already taken", "path": ["createUser"] }]
        }))
    )
    .await;
    let store = user_store(format!("{}/graphql", server.uri()));

    assert_eq!(store.fetch_users().await, Outcome::Failed);
    let error = store.error().unwrap();
    assert!(error.contains("500"), "unexpected error: {}", error);

    assert_eq!(store.create_user("Ann", "ann@x.com").await, Outcome::Failed);
    assert_eq!(store.error().as_deref(), Some("email already taken"));
    assert!(store.users().is_empty());
    assert!(!store.loading());
}

#[tokio::test]
async fn error_status_with_a_json_body_is_a_failure() {
    let server = MockServer::start().await;
    for &operation in &["GetUsers", "CreateUser"] {
        mount(
            &server,
            operation,
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Internal Server Error" }))
        )
        .await;
    }
    let store = user_store(format!("{}/graphql", server.uri()));

    assert_eq!(store.fetch_users().await, Outcome::Failed);
    let error = store.error().unwrap();
    assert!(error.contains("500"), "unexpected error: {}", error);

    assert_eq!(store.create_user("Ann", "ann@x.com").await, Outcome::Failed);
    let error = store.error().unwrap();
    assert!(error.contains("500"), "unexpected error: {}", error);
    assert!(store.users().is_empty());
    assert!(!store.loading());
}
