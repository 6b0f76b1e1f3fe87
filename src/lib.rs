//! skiff
//!
//! Typed client for declarative, resource-oriented control plane APIs.
//! Resource objects are plain Rust structs that keep every field the schema
//! does not model, so a decode/encode round trip never loses data; a typed
//! handle drives them against an API server with create / update / patch /
//! delete semantics; an in-process mock server makes whole operation flows
//! scriptable in tests.
//!
//! ```ignore
//! let client = Client::from_config(&ClientConfig::load())?;
//! let policies = client.resources::<SandboxPolicy>().list(None).await?;
//! ```
//!
//! Module structure:
//! - `model`: the resource trait, metadata types, builders, merge patches
//! - `client`: root client, typed operation handles, HTTP transport
//! - `mock`: scripted in-process API server for tests
//! - `manifest`: multi-document YAML loading and ordered apply
//! - `config`: endpoint configuration on disk
//! - `error`: the error taxonomy every operation returns

pub mod client;
pub mod config;
pub mod error;
pub mod manifest;
pub mod mock;
pub mod model;

pub use client::{Client, OnConflict, ResourceClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use manifest::{KindRegistry, Manifest};
pub use mock::MockApiServer;
pub use model::{ObjectMeta, Resource};
