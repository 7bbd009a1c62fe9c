use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use elite_client::{
    AuthApi, AuthorizedClient, ClientConfig, ClientError, LoginRequest, RegistrationRequest,
    RestClient,
};
use elite_session::{FileTokenStorage, SessionError, SessionStore, TOKEN_KEY, TokenStorage};

const JWT_SECRET: &str = "backend-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app = Router::new()
            .route("/auth/login", post(login))
            .route(
                "/auth/registration",
                post(|Json(body): Json<Value>| async move { Json(json!(body["username"] != "taken")) }),
            )
            .route("/echo", get(echo_authorization));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn rest(&self) -> RestClient {
        RestClient::new(&ClientConfig::new(&self.base_url)).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: &str, exp: chrono::DateTime<Utc>) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({"sub": sub, "exp": exp.timestamp(), "roles": ["ADMIN"]}),
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    match (body["username"].as_str(), body["password"].as_str()) {
        (Some("alice"), Some("x")) => Json(json!(mint_jwt("alice", Utc::now() + Duration::days(30)))),
        (Some("stale"), _) => Json(json!(mint_jwt("stale", Utc::now() - Duration::minutes(1)))),
        _ => Json(Value::Null),
    }
}

async fn echo_authorization(headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "authorization": auth }))
}

fn temp_storage() -> (tempfile::TempDir, FileTokenStorage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileTokenStorage::new(dir.path().join(TOKEN_KEY));
    (dir, storage)
}

#[tokio::test]
async fn login_persists_token_and_authenticates() {
    let srv = TestServer::spawn().await;
    let (_dir, storage) = temp_storage();
    let store = SessionStore::restore(AuthApi::new(srv.rest()), storage.clone());

    assert!(store.login(&LoginRequest::new("alice", "x")).await.unwrap());

    let persisted = storage.load().unwrap().unwrap();
    assert_eq!(Some(persisted.as_str()), store.token().as_ref().map(|t| t.as_str()));

    let session = store.validate_and_refresh();
    assert!(session.is_authenticated);
    assert_eq!(session.user.unwrap().username, "alice");
}

#[tokio::test]
async fn falsy_login_leaves_storage_unchanged() {
    let srv = TestServer::spawn().await;
    let (_dir, storage) = temp_storage();
    storage.save("previous-token").unwrap();
    let store = SessionStore::restore(AuthApi::new(srv.rest()), storage.clone());

    assert!(!store.login(&LoginRequest::new("alice", "wrong")).await.unwrap());
    assert_eq!(storage.load().unwrap().as_deref(), Some("previous-token"));
}

#[tokio::test]
async fn session_survives_reload() {
    let srv = TestServer::spawn().await;
    let (_dir, storage) = temp_storage();

    let first = SessionStore::restore(AuthApi::new(srv.rest()), storage.clone());
    assert!(first.login(&LoginRequest::new("alice", "x")).await.unwrap());
    let before = first.validate_and_refresh();
    drop(first);

    let reloaded = SessionStore::restore(AuthApi::new(srv.rest()), storage.clone());
    assert_eq!(reloaded.validate_and_refresh(), before);
}

#[tokio::test]
async fn expired_token_from_backend_is_demoted_on_validation() {
    let srv = TestServer::spawn().await;
    let (_dir, storage) = temp_storage();
    let store = SessionStore::restore(AuthApi::new(srv.rest()), storage.clone());

    // the backend handed out a token that is already expired
    assert!(store.login(&LoginRequest::new("stale", "x")).await.unwrap());
    assert!(!store.is_authenticated());
    assert!(store.token().is_none());
    assert_eq!(storage.load().unwrap(), None);
}

#[tokio::test]
async fn logout_strips_authorization_from_later_requests() {
    let srv = TestServer::spawn().await;
    let (_dir, storage) = temp_storage();
    let store = SessionStore::restore(AuthApi::new(srv.rest()), storage.clone());
    let client = AuthorizedClient::new(srv.rest(), store.handle());

    assert!(store.login(&LoginRequest::new("alice", "x")).await.unwrap());
    let body: Value = client.request(elite_client::Method::GET, "/echo").send_json().await.unwrap();
    let expected = format!("Bearer {}", store.token().unwrap().as_str());
    assert_eq!(body["authorization"], json!(expected));

    store.logout();
    assert!(!store.is_authenticated());
    let body: Value = client.request(elite_client::Method::GET, "/echo").send_json().await.unwrap();
    assert!(body["authorization"].is_null());
    assert_eq!(storage.load().unwrap(), None);
}

#[tokio::test]
async fn handle_observes_login_and_logout() {
    let srv = TestServer::spawn().await;
    let (_dir, storage) = temp_storage();
    let store = SessionStore::restore(AuthApi::new(srv.rest()), storage);
    let mut handle = store.handle();

    assert!(store.login(&LoginRequest::new("alice", "x")).await.unwrap());
    assert!(handle.changed().await);
    assert!(handle.current().is_some());

    store.logout();
    assert!(handle.changed().await);
    assert!(handle.current().is_none());
}

#[tokio::test]
async fn registration_returns_backend_boolean() {
    let srv = TestServer::spawn().await;
    let (_dir, storage) = temp_storage();
    let store = SessionStore::restore(AuthApi::new(srv.rest()), storage.clone());

    let fresh = RegistrationRequest {
        username: "bob".to_string(),
        ..Default::default()
    };
    let taken = RegistrationRequest {
        username: "taken".to_string(),
        ..Default::default()
    };
    assert!(store.registration(&fresh).await.unwrap());
    assert!(!store.registration(&taken).await.unwrap());
    assert_eq!(storage.load().unwrap(), None);
}

#[tokio::test]
async fn network_failure_propagates_from_login() {
    let (_dir, storage) = temp_storage();
    // nothing listens on the discard port
    let rest = RestClient::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
    let store = SessionStore::restore(AuthApi::new(rest), storage.clone());

    let err = store.login(&LoginRequest::new("alice", "x")).await.unwrap_err();
    assert!(matches!(err, SessionError::Client(ClientError::Network(_))));
    assert_eq!(storage.load().unwrap(), None);
}
