//! Common test infrastructure for armctl-client tests
//!
//! Provides a client pointed at a wiremock server plus fixtures for the
//! compute and catalog endpoints.

#![allow(dead_code)]

use std::time::Duration;

use armctl_client::{ClientOptions, ManagementClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-0000000000aa";
pub const RESOURCE_GROUP: &str = "sql-rg";
pub const VM_NAME: &str = "sqlvm01";
pub const EXTENSION_NAME: &str = "Microsoft.SqlServer.Management.SqlIaaSAgent";
pub const TOKEN: &str = "test-bearer-token";
pub const COMPUTE_API_VERSION: &str = "2016-03-30";

pub fn options_for(server: &MockServer) -> ClientOptions {
    ClientOptions {
        resource_manager_url: server.uri(),
        catalog_url: Some(server.uri()),
        subscription_id: Some(SUBSCRIPTION.to_string()),
        timeout: Duration::from_secs(5),
        poll_interval: Duration::ZERO,
        ..ClientOptions::default()
    }
}

pub fn client_for(server: &MockServer) -> ManagementClient {
    ManagementClient::new(options_for(server))
        .expect("client should build")
        .with_token(TOKEN)
}

pub fn vm_path() -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/virtualMachines/{}",
        SUBSCRIPTION, RESOURCE_GROUP, VM_NAME
    )
}

pub fn extension_path() -> String {
    format!("{}/extensions/{}", vm_path(), EXTENSION_NAME)
}

pub fn extension_body(provisioning_state: &str) -> Value {
    json!({
        "id": extension_path(),
        "name": EXTENSION_NAME,
        "type": "Microsoft.Compute/virtualMachines/extensions",
        "location": "westus",
        "properties": {
            "publisher": "Microsoft.SqlServer.Management",
            "type": "SqlIaaSAgent",
            "typeHandlerVersion": "1.2",
            "provisioningState": provisioning_state
        }
    })
}

pub fn operation_failed_body(code: &str) -> Value {
    json!({
        "operationId": "op-1",
        "status": "Failed",
        "startTime": "2016-05-01T10:00:00Z",
        "endTime": "2016-05-01T10:00:05Z",
        "error": {"code": code, "message": "operation failed"}
    })
}

/// Mount `GET {vm_path}` returning a VM in `location`
pub async fn mock_virtual_machine(server: &MockServer, location: &str) {
    Mock::given(method("GET"))
        .and(path(vm_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": VM_NAME,
            "location": location,
            "properties": {"vmId": "1234"}
        })))
        .mount(server)
        .await;
}

/// Mount an extension PUT that fails `fail_count` times with `code`, then succeeds
pub async fn mock_flaky_extension_put(server: &MockServer, fail_count: u64, code: &str) {
    Mock::given(method("PUT"))
        .and(path(extension_path()))
        .respond_with(ResponseTemplate::new(500).set_body_json(operation_failed_body(code)))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(extension_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ms-request-id", "req-final")
                .set_body_json(extension_body("Succeeded")),
        )
        .mount(server)
        .await;
}
