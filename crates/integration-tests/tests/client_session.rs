//! Bearer token handling across requests, clients and processes.

#![allow(clippy::unwrap_used)]

use autopecas_client::{FileTokenStore, LoginRequest, MemoryTokenStore, Method, Session};
use autopecas_core::Email;
use autopecas_integration_tests::{MockBackend, MockRoute};
use serde_json::json;

fn profile_route() -> MockRoute {
    MockRoute::json(
        "GET",
        "/api/auth/profile",
        200,
        json!({"success": true, "data": {"id": 7, "name": "Ana", "email": "ana@loja.com"}}),
    )
}

#[tokio::test]
async fn test_bearer_header_follows_token() {
    let mock = MockBackend::start(vec![profile_route()]).await.unwrap();
    let client = mock.client(Session::in_memory()).unwrap();

    client.set_token("abc").unwrap();
    client
        .authenticated_request(Method::GET, "/auth/profile", None)
        .await
        .unwrap();
    assert_eq!(
        mock.last_request().unwrap().authorization.as_deref(),
        Some("Bearer abc")
    );

    client.remove_token().unwrap();
    client
        .authenticated_request(Method::GET, "/auth/profile", None)
        .await
        .unwrap();
    assert_eq!(mock.last_request().unwrap().authorization, None);
}

#[tokio::test]
async fn test_public_requests_never_send_token() {
    let mock = MockBackend::start(vec![MockRoute::json(
        "GET",
        "/api/categories",
        200,
        json!([]),
    )])
    .await
    .unwrap();
    let client = mock.client(Session::in_memory()).unwrap();
    client.set_token("abc").unwrap();

    client.get_categories().await.unwrap();
    assert_eq!(mock.last_request().unwrap().authorization, None);
}

#[tokio::test]
async fn test_login_stores_token_for_next_request() {
    let mock = MockBackend::start(vec![
        MockRoute::json(
            "POST",
            "/api/auth/login",
            200,
            json!({
                "success": true,
                "data": {
                    "token": "jwt-from-login",
                    "user": {"id": 7, "name": "Ana", "email": "ana@loja.com", "role": "customer"}
                }
            }),
        ),
        profile_route(),
    ])
    .await
    .unwrap();
    let client = mock.client(Session::in_memory()).unwrap();

    let email = Email::parse("ana@loja.com").unwrap();
    let user = client
        .login(&LoginRequest::new(email, "senha-secreta"))
        .await
        .unwrap();
    assert_eq!(user.name, "Ana");
    assert!(client.is_authenticated().unwrap());

    let login = mock.last_request().unwrap();
    assert_eq!(login.authorization, None);
    assert_eq!(
        login.body,
        Some(json!({"email": "ana@loja.com", "password": "senha-secreta"}))
    );

    let profile = client.get_profile().await.unwrap();
    assert_eq!(profile.id, user.id);
    assert_eq!(
        mock.last_request().unwrap().authorization.as_deref(),
        Some("Bearer jwt-from-login")
    );

    client.logout().unwrap();
    assert!(!client.is_authenticated().unwrap());
}

#[tokio::test]
async fn test_failed_login_keeps_previous_token() {
    let mock = MockBackend::start(vec![MockRoute::json(
        "POST",
        "/api/auth/login",
        401,
        json!({"success": false, "message": "Credenciais inválidas"}),
    )])
    .await
    .unwrap();
    let client = mock.client(Session::in_memory()).unwrap();
    client.set_token("old").unwrap();

    let email = Email::parse("ana@loja.com").unwrap();
    let err = client
        .login(&LoginRequest::new(email, "errada"))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Credenciais inválidas");
    assert!(client.is_authenticated().unwrap());
}

#[tokio::test]
async fn test_clients_sharing_a_store_see_each_others_token() {
    let mock = MockBackend::start(vec![profile_route()]).await.unwrap();
    let store = MemoryTokenStore::default();
    let first = mock.client(Session::new(store.clone())).unwrap();
    let second = mock.client(Session::new(store)).unwrap();

    first.set_token("shared").unwrap();
    second
        .authenticated_request(Method::GET, "/auth/profile", None)
        .await
        .unwrap();
    assert_eq!(
        mock.last_request().unwrap().authorization.as_deref(),
        Some("Bearer shared")
    );
}

#[tokio::test]
async fn test_file_token_survives_new_client() {
    let mock = MockBackend::start(vec![profile_route()]).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");

    let writer = mock.client(Session::new(FileTokenStore::new(&path))).unwrap();
    writer.set_token("persisted").unwrap();
    drop(writer);

    let reader = mock.client(Session::new(FileTokenStore::new(&path))).unwrap();
    reader
        .authenticated_request(Method::GET, "/auth/profile", None)
        .await
        .unwrap();
    assert_eq!(
        mock.last_request().unwrap().authorization.as_deref(),
        Some("Bearer persisted")
    );

    // Removal through one client is seen by the other on its next call.
    let other = mock.client(Session::new(FileTokenStore::new(&path))).unwrap();
    other.remove_token().unwrap();
    reader
        .authenticated_request(Method::GET, "/auth/profile", None)
        .await
        .unwrap();
    assert_eq!(mock.last_request().unwrap().authorization, None);
}
