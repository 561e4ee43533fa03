//! Wire models for the management APIs

mod catalog;
mod compute;
mod response;
mod sql_server;

pub use catalog::{CatalogSecret, CatalogSecretRequest};
pub use compute::{ExtensionProperties, VirtualMachine, VirtualMachineExtension};
pub use response::OperationResponse;
pub use sql_server::{
    AutoBackupSettings, AutoPatchingSettings, AutoTelemetrySettings, SqlServerExtension,
    SqlServerPrivateSettings, SqlServerPublicSettings,
};
