//! Catalog secret API tests

mod common;

use armctl_client::models::CatalogSecretRequest;
use armctl_client::CatalogApi;
use common::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET_PATH: &str = "/catalog/usql/databases/master/secrets/dbcred";

fn request() -> CatalogSecretRequest {
    CatalogSecretRequest::new("dbcred", "p@ssw0rd", "https://sql.contoso.com:1433/")
}

#[tokio::test]
async fn test_create_secret() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(SECRET_PATH))
        .and(query_param("api-version", "2015-10-01-preview"))
        .and(body_json(json!({
            "password": "p@ssw0rd",
            "uri": "https://sql.contoso.com:1433/"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "databaseName": "master",
            "secretName": "dbcred",
            "creationTime": "2016-05-01T10:00:00Z",
            "uri": "https://sql.contoso.com:1433/"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let secret = client_for(&server)
        .create_secret("contosoadla", "master", &request())
        .await
        .unwrap();

    assert_eq!(secret.database_name.as_deref(), Some("master"));
    assert_eq!(secret.secret_name.as_deref(), Some("dbcred"));
    assert!(secret.creation_time.is_some());
}

#[tokio::test]
async fn test_create_secret_empty_acknowledgement() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(SECRET_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let secret = client_for(&server)
        .create_secret("contosoadla", "master", &request())
        .await
        .unwrap();

    assert_eq!(secret.secret_name.as_deref(), Some("dbcred"));
    assert_eq!(secret.uri.as_deref(), Some("https://sql.contoso.com:1433/"));
    assert!(secret.creation_time.is_none());
}

#[tokio::test]
async fn test_create_secret_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(SECRET_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": "SecretAlreadyExists", "message": "exists"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .create_secret("contosoadla", "master", &request())
        .await
        .unwrap_err();

    let remote = err.remote().expect("remote error");
    assert_eq!(remote.http_status(), Some(409));
    assert!(err.to_string().contains("SecretAlreadyExists"));
}
