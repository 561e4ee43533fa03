//! # armctl-client
//!
//! HTTP client for the resource-management APIs armctl drives:
//! - Compute: virtual machines and VM extensions (with long-running operation polling)
//! - Data Lake Analytics: U-SQL catalog secrets
//!
//! All traffic is reported to a shared `TraceContext`, and failed calls
//! surface as classifiable `RemoteError`s so they can be retried by
//! `armctl_core::retry`.

mod catalog;
mod client;
mod compute;
pub mod error;
pub mod models;

pub use catalog::CatalogApi;
pub use client::{ClientOptions, ManagementClient};
pub use compute::ComputeApi;
pub use error::{ClientError, Result};
