mod common;

use common::mock_api::{MockApi, MockResponse};
use common::signed_in_session;
use user_console::config::ApiConfig;
use user_console::gateway::{AuthGateway, ErrorKind, HttpGateway, UserGateway};
use user_console::model::{UserId, UserInput, UserStatus};
use user_console::session::{Credentials, SessionEvent, SessionStore};

const USERS_BODY: &str = r#"{"status":200,"result":{"data":{"users":[
    {"id":"1","firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","status":"active","dateOfBirth":"1815-12-10"},
    {"id":"7","firstName":"Grace","email":"grace@example.com","status":"locked","dateOfBirth":"1906-12-09"}
]}}}"#;

const USER_BODY: &str = r#"{"status":200,"result":{"data":{"user":
    {"id":"42","firstName":"Alan","lastName":"Turing","email":"alan@example.com","status":"active","dateOfBirth":"1912-06-23"}
},"message":"ok"}}"#;

fn gateway(api: &MockApi, session: SessionStore) -> HttpGateway {
    let config = ApiConfig {
        base_url: api.base_url(),
        ..ApiConfig::default()
    };
    HttpGateway::new(&config, session).unwrap()
}

fn alan_input() -> UserInput {
    UserInput {
        first_name: "Alan".to_string(),
        last_name: Some("Turing".to_string()),
        email: "alan@example.com".to_string(),
        status: UserStatus::Locked,
        date_of_birth: "1912-06-23".to_string(),
    }
}

#[tokio::test]
async fn test_list_sends_bearer_and_search() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::json(USERS_BODY)).await;
    let gw = gateway(&api, signed_in_session());

    let users = gw.list(Some("ada")).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].full_name(), "Ada Lovelace");
    assert_eq!(users[1].last_name, None);
    assert_eq!(users[1].status, UserStatus::Locked);

    let requests = api.captured_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/users");
    assert_eq!(requests[0].query.as_deref(), Some("search=ada"));
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-token"));
}

#[tokio::test]
async fn test_list_without_search_has_no_query() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::json(USERS_BODY)).await;
    api.enqueue(MockResponse::json(USERS_BODY)).await;
    let gw = gateway(&api, signed_in_session());

    gw.list(None).await.unwrap();
    gw.list(Some("")).await.unwrap();

    let requests = api.captured_requests().await;
    assert!(requests.iter().all(|r| r.query.is_none()));
}

#[tokio::test]
async fn test_get_update_and_create_paths() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::json(USER_BODY)).await;
    api.enqueue(MockResponse::json(USER_BODY)).await;
    api.enqueue(MockResponse::json(USER_BODY)).await;
    let gw = gateway(&api, signed_in_session());

    let user = gw.get(&UserId::new("42")).await.unwrap();
    assert_eq!(user.id.as_str(), "42");
    gw.update(&UserId::new("42"), &alan_input()).await.unwrap();
    gw.create(&alan_input()).await.unwrap();

    let requests = api.captured_requests().await;
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/users/42");
    assert_eq!(requests[1].method, "PUT");
    assert_eq!(requests[1].path, "/api/users/42");
    assert_eq!(requests[2].method, "POST");
    assert_eq!(requests[2].path, "/api/users");

    let body = requests[1].json();
    assert_eq!(body["firstName"], "Alan");
    assert_eq!(body["status"], "locked");
    assert_eq!(body["dateOfBirth"], "1912-06-23");
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::empty(204)).await;
    let gw = gateway(&api, signed_in_session());

    gw.delete(&UserId::new("7")).await.unwrap();

    let requests = api.captured_requests().await;
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].path, "/api/users/7");
}

#[tokio::test]
async fn test_unauthorized_invalidates_session() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::error(401, "Token expired")).await;
    let session = signed_in_session();
    let mut events = session.subscribe();
    events.borrow_and_update();
    let gw = gateway(&api, session.clone());

    let err = gw.list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.message(), "Token expired");
    assert!(!session.is_authenticated());
    assert!(events.has_changed().unwrap());
    assert_eq!(*events.borrow_and_update(), SessionEvent::Expired);

    // No request goes out without a session.
    let err = gw.list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(api.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn test_status_codes_map_to_kinds() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::error(422, "Email already taken")).await;
    api.enqueue(MockResponse::empty(503)).await;
    api.enqueue(MockResponse::error(404, "User not found")).await;
    api.enqueue(MockResponse::empty(500)).await;
    let gw = gateway(&api, signed_in_session());

    let err = gw.create(&alan_input()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Email already taken");

    let err = gw.list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_retryable());
    assert_eq!(err.message(), ErrorKind::Network.default_message());

    let err = gw.get(&UserId::new("404")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), "User not found");

    let err = gw.delete(&UserId::new("1")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_malformed_success_body_is_unknown() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::json(r#"{"result":{"data":{"people":[]}}}"#))
        .await;
    let gw = gateway(&api, signed_in_session());

    let err = gw.list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(err.message().starts_with("Malformed response"));
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiConfig {
        base_url: format!("http://{}", addr),
        ..ApiConfig::default()
    };
    let gw = HttpGateway::new(&config, signed_in_session()).unwrap();

    let err = gw.list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_login_returns_grant_without_session() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::json(
        r#"{"status":200,"result":{"data":{"accessToken":"abc","expiresIn":3600},"message":"Login successful"}}"#,
    ))
    .await;
    let gw = gateway(&api, SessionStore::in_memory());

    let grant = gw
        .login(&Credentials::new("ada@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(grant.access_token.expose(), "abc");
    assert_eq!(grant.expires_in, 3600);
    assert_eq!(grant.message.as_deref(), Some("Login successful"));

    let requests = api.captured_requests().await;
    assert_eq!(requests[0].path, "/api/login");
    assert_eq!(requests[0].header("authorization"), None);
    let body = requests[0].json();
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["password"], "pw");
}

#[tokio::test]
async fn test_login_rejection_message() {
    let api = MockApi::start().await;
    api.enqueue(MockResponse::empty(401)).await;
    api.enqueue(MockResponse::error(401, "Account locked")).await;
    let session = signed_in_session();
    let gw = gateway(&api, session.clone());

    let err = gw
        .login(&Credentials::new("ada@example.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.to_string(), "Invalid Credentials!");

    let err = gw
        .login(&Credentials::new("ada@example.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Account locked");

    // A failed login leaves the current session alone.
    assert!(session.is_authenticated());
}
