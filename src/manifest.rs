//! Manifest loader
//!
//! Multi-document YAML in, applied objects out. A [`KindRegistry`] maps each
//! document's `apiVersion`/`kind` pair onto a typed handler; [`Manifest`]
//! holds the decoded documents and applies them in file order through the
//! client that loaded them. Loading is strict: every document must name a
//! registered kind and decode against its schema before anything is sent.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::model::{RawResource, Resource};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Type-erased bridge between a manifest document and the typed client.
#[async_trait]
pub(crate) trait KindHandler: Send + Sync {
    /// Decode the document against the kind's schema, keeping nothing.
    fn check(&self, document: &Value) -> Result<()>;

    /// Apply the document idempotently and return the server's object.
    async fn apply(&self, client: &Client, document: &Value) -> Result<Value>;
}

struct TypedHandler<K> {
    _kind: PhantomData<fn() -> K>,
}

#[async_trait]
impl<K: Resource> KindHandler for TypedHandler<K> {
    fn check(&self, document: &Value) -> Result<()> {
        serde_json::from_value::<K>(document.clone())?;
        Ok(())
    }

    async fn apply(&self, client: &Client, document: &Value) -> Result<Value> {
        let object: K = serde_json::from_value(document.clone())?;
        let applied = client.resources::<K>().create_or_replace(&object).await?;
        Ok(serde_json::to_value(applied)?)
    }
}

/// The kinds a client can decode and apply from manifests.
#[derive(Default)]
pub struct KindRegistry {
    handlers: HashMap<(String, String), Box<dyn KindHandler>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register kind `K` under its `apiVersion`/`kind` pair. Registering the
    /// same pair again replaces the earlier handler.
    pub fn register<K: Resource>(&mut self) -> &mut Self {
        self.handlers.insert(
            (K::API_GROUP_VERSION.to_string(), K::KIND.to_string()),
            Box::new(TypedHandler::<K> { _kind: PhantomData }),
        );
        self
    }

    pub fn contains(&self, api_version: &str, kind: &str) -> bool {
        self.handlers
            .contains_key(&(api_version.to_string(), kind.to_string()))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn handler(&self, api_version: &str, kind: &str) -> Option<&dyn KindHandler> {
        self.handlers
            .get(&(api_version.to_string(), kind.to_string()))
            .map(Box::as_ref)
    }
}

#[derive(Debug)]
struct Document {
    api_version: String,
    kind: String,
    body: Value,
}

/// A parsed manifest bound to the client that loaded it.
///
/// Documents keep their file order; indexes in errors refer to positions
/// among the non-empty documents, matching [`items`](Manifest::items).
pub struct Manifest {
    client: Client,
    documents: Vec<Document>,
}

impl std::fmt::Debug for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manifest")
            .field("documents", &self.documents)
            .finish_non_exhaustive()
    }
}

impl Manifest {
    pub(crate) fn load(client: Client, input: &str) -> Result<Self> {
        let mut documents: Vec<Document> = Vec::new();

        for deserializer in serde_yaml::Deserializer::from_str(input) {
            let body = Value::deserialize(deserializer)?;
            if body.is_null() {
                continue;
            }
            let index = documents.len();

            let raw: RawResource = serde_json::from_value(body.clone()).map_err(|e| {
                Error::Decode(format!("manifest document {index}: {e}"))
            })?;

            let handler = client
                .registry()
                .handler(&raw.api_version, &raw.kind)
                .ok_or_else(|| Error::UnknownKind {
                    index,
                    api_version: raw.api_version.clone(),
                    kind: raw.kind.clone(),
                })?;

            // Fail the whole load on any schema mismatch, before anything
            // touches the server.
            handler.check(&body).map_err(|e| {
                Error::Decode(format!("manifest document {index} ({}): {e}", raw.kind))
            })?;

            documents.push(Document {
                api_version: raw.api_version,
                kind: raw.kind,
                body,
            });
        }

        Ok(Self { client, documents })
    }

    /// Decoded document bodies, in file order.
    pub fn items(&self) -> Vec<&Value> {
        self.documents.iter().map(|d| &d.body).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Apply every document in order via its kind handler. The first failure
    /// aborts the remainder and reports which item broke; items already
    /// applied stay applied.
    pub async fn create_or_replace(&self) -> Result<Vec<Value>> {
        let mut applied = Vec::with_capacity(self.documents.len());

        for (index, document) in self.documents.iter().enumerate() {
            let handler = self
                .client
                .registry()
                .handler(&document.api_version, &document.kind)
                .ok_or_else(|| Error::UnknownKind {
                    index,
                    api_version: document.api_version.clone(),
                    kind: document.kind.clone(),
                })?;

            tracing::info!("applying manifest item {index}: {}", document.kind);
            match handler.apply(&self.client, &document.body).await {
                Ok(value) => applied.push(value),
                Err(source) => {
                    return Err(Error::ManifestApply {
                        index,
                        kind: document.kind.clone(),
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(applied)
    }
}
