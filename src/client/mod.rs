//! Client
//!
//! The root [`Client`] pairs a transport with a registry of manifest-applicable
//! kinds. All typed work goes through [`ResourceClient`], a cheap per-kind
//! handle narrowed with [`within`](ResourceClient::within) and
//! [`named`](ResourceClient::named) before issuing operations:
//!
//! ```ignore
//! let policy = client.resources::<SandboxPolicy>().named("restricted").get().await?;
//! ```
//!
//! Module structure:
//! - `transport`: the abstract request/response boundary and the HTTP impl

mod transport;

pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::manifest::{KindRegistry, Manifest};
use crate::model::{diff, Resource, ResourceList};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Root client: a transport plus the kinds known to the manifest loader.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    registry: Arc<KindRegistry>,
}

impl Client {
    /// Create a client over any transport, with no manifest-applicable kinds.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_registry(transport, KindRegistry::new())
    }

    /// Create a client over any transport with the given kind registry.
    pub fn with_registry(transport: Arc<dyn Transport>, registry: KindRegistry) -> Self {
        Self {
            transport,
            registry: Arc::new(registry),
        }
    }

    /// Create a client speaking real HTTP per the given configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Typed operation handle for kind `K`, initially unscoped.
    pub fn resources<K: Resource>(&self) -> ResourceClient<K> {
        ResourceClient {
            client: self.clone(),
            namespace: None,
            name: None,
            _kind: PhantomData,
        }
    }

    /// Parse a multi-document manifest into an applicable set. Every document
    /// is decoded against the registry up front, so a bad manifest fails here
    /// rather than halfway through an apply.
    pub fn load(&self, input: &str) -> Result<Manifest> {
        Manifest::load(self.clone(), input)
    }

    pub(crate) fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub(crate) async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.send(request).await
    }
}

/// What `create_or` does when the object already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Replace the existing object wholesale.
    Update,
    /// Merge the serialized object over the existing one.
    MergePatch,
}

enum Verb {
    Read,
    Create,
    Write,
}

/// Typed operation handle for one kind, optionally narrowed to a namespace
/// and an object name. Handles are throwaway values; scoping methods take
/// `self` and each operation borrows the handle it was chained from.
#[derive(Clone)]
pub struct ResourceClient<K> {
    client: Client,
    namespace: Option<String>,
    name: Option<String>,
    _kind: PhantomData<K>,
}

impl<K: Resource> ResourceClient<K> {
    /// Narrow the handle to a namespace.
    pub fn within(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Narrow the handle to an object name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fetch the named object.
    pub async fn get(&self) -> Result<K> {
        let name = self.require_name("get", None)?;
        let path = K::named_path(self.namespace.as_deref(), &name);
        let response = self.client.send(ApiRequest::new(Method::Get, path)).await?;
        if !response.is_success() {
            return Err(Self::error_for(&response, Verb::Read, Some(&name)));
        }
        Self::decode(response.body)
    }

    /// List objects in scope, optionally filtered by a label selector such
    /// as `app=web,tier!=db`. No matches is an empty list, not an error.
    pub async fn list(&self, label_selector: Option<&str>) -> Result<ResourceList<K>> {
        let path = K::list_path(self.namespace.as_deref(), label_selector);
        let response = self.client.send(ApiRequest::new(Method::Get, path)).await?;
        if !response.is_success() {
            return Err(Self::error_for(&response, Verb::Read, None));
        }
        match response.body {
            Some(body) => Ok(serde_json::from_value(body)?),
            None => Ok(ResourceList::default()),
        }
    }

    /// Create the object. Fails with [`Error::AlreadyExists`] if the server
    /// already has one under this name.
    pub async fn create(&self, object: &K) -> Result<K> {
        let body = Self::to_wire(object)?;
        let path = K::collection_path(self.scope_namespace(object));
        tracing::debug!("create {} at {path}", K::KIND);
        let response = self
            .client
            .send(ApiRequest::with_body(Method::Post, path, body))
            .await?;
        if !response.is_success() {
            let name = object.metadata().name.as_deref();
            return Err(Self::error_for(&response, Verb::Create, name));
        }
        Self::decode(response.body)
    }

    /// Replace the server's object with this one. The target name comes from
    /// the handle scope, falling back to the object's own metadata.
    pub async fn update(&self, object: &K) -> Result<K> {
        let name = self.require_name("update", object.metadata().name.as_deref())?;
        let body = Self::to_wire(object)?;
        let path = K::named_path(self.scope_namespace(object), &name);
        tracing::debug!("update {} at {path}", K::KIND);
        let response = self
            .client
            .send(ApiRequest::with_body(Method::Put, path, body))
            .await?;
        if !response.is_success() {
            return Err(Self::error_for(&response, Verb::Write, Some(&name)));
        }
        Self::decode(response.body)
    }

    /// Create the object, falling back to the chosen strategy when the
    /// server reports it already exists. Exactly one extra request is made
    /// on the fallback path.
    pub async fn create_or(&self, object: &K, on_conflict: OnConflict) -> Result<K> {
        match self.create(object).await {
            Err(Error::AlreadyExists { .. }) => match on_conflict {
                OnConflict::Update => self.update(object).await,
                OnConflict::MergePatch => {
                    let body = Self::to_wire(object)?;
                    self.patch(&body).await
                }
            },
            other => other,
        }
    }

    /// Idempotent apply: create, or replace whatever is already there.
    pub async fn create_or_replace(&self, object: &K) -> Result<K> {
        self.create_or(object, OnConflict::Update).await
    }

    /// Send a merge-style partial update. Only keys present in `body` change;
    /// an explicit null clears a field, objects merge recursively, and
    /// arrays replace wholesale. Nothing is read before writing.
    pub async fn patch(&self, body: &Value) -> Result<K> {
        let doc_name = body
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let name = self.require_name("patch", doc_name.as_deref())?;
        let doc_namespace = body.pointer("/metadata/namespace").and_then(Value::as_str);
        let namespace = self.namespace.as_deref().or(doc_namespace);
        let path = K::named_path(namespace, &name);
        tracing::debug!("patch {} at {path}", K::KIND);
        let response = self
            .client
            .send(ApiRequest::with_body(Method::Patch, path, body.clone()))
            .await?;
        if !response.is_success() {
            return Err(Self::error_for(&response, Verb::Write, Some(&name)));
        }
        Self::decode(response.body)
    }

    /// Read-modify-write: fetch the named object, run `mutate` over it, and
    /// send only the resulting delta as a merge patch. Exactly two requests;
    /// a concurrent server-side change surfaces as [`Error::Conflict`]
    /// rather than being retried.
    pub async fn edit<F>(&self, mutate: F) -> Result<K>
    where
        F: FnOnce(K) -> K,
    {
        let current = self.get().await?;
        let before = serde_json::to_value(&current)?;
        let after = serde_json::to_value(mutate(current))?;
        self.patch(&diff(&before, &after)).await
    }

    /// Delete the named object, or with no name bound, every object in the
    /// scoped collection. Returns how many objects the server actually
    /// removed; deleting what is already gone is a success with count 0.
    pub async fn delete(&self) -> Result<usize> {
        match &self.name {
            Some(name) => {
                let path = K::named_path(self.namespace.as_deref(), name);
                tracing::debug!("delete {} at {path}", K::KIND);
                let response = self.client.send(ApiRequest::new(Method::Delete, path)).await?;
                match response.status {
                    404 => Ok(0),
                    _ if response.is_success() => Ok(1),
                    _ => Err(Self::error_for(&response, Verb::Write, Some(name))),
                }
            }
            None => {
                let path = K::collection_path(self.namespace.as_deref());
                tracing::debug!("delete all {} at {path}", K::PLURAL);
                let response = self.client.send(ApiRequest::new(Method::Delete, path)).await?;
                match response.status {
                    404 => Ok(0),
                    _ if response.is_success() => {
                        let count = response
                            .body
                            .as_ref()
                            .and_then(|b| b.get("items"))
                            .and_then(Value::as_array)
                            .map_or(0, Vec::len);
                        Ok(count)
                    }
                    _ => Err(Self::error_for(&response, Verb::Write, None)),
                }
            }
        }
    }

    /// Namespace the operation runs in: handle scope wins, then the object's
    /// own metadata. Cluster-scoped kinds ignore this entirely.
    fn scope_namespace<'a>(&'a self, object: &'a K) -> Option<&'a str> {
        self.namespace
            .as_deref()
            .or(object.metadata().namespace.as_deref())
    }

    fn require_name(&self, operation: &'static str, fallback: Option<&str>) -> Result<String> {
        self.name
            .as_deref()
            .or(fallback)
            .map(str::to_owned)
            .ok_or(Error::Scope { operation })
    }

    /// Serialize for the wire, stamping `apiVersion` and `kind` so callers
    /// never carry them on the typed value.
    fn to_wire(object: &K) -> Result<Value> {
        let mut value = serde_json::to_value(object)?;
        if let Value::Object(map) = &mut value {
            if !map.contains_key("apiVersion") {
                map.insert("apiVersion".into(), Value::String(K::API_GROUP_VERSION.into()));
            }
            if !map.contains_key("kind") {
                map.insert("kind".into(), Value::String(K::KIND.into()));
            }
        }
        Ok(value)
    }

    fn decode(body: Option<Value>) -> Result<K> {
        let body = body.ok_or_else(|| Error::Decode("empty response body".into()))?;
        Ok(serde_json::from_value(body)?)
    }

    /// Map a non-2xx response onto the error taxonomy. NotFound and the
    /// conflict pair only apply to named objects; everything else carries
    /// the raw status and whatever message the server sent.
    fn error_for(response: &ApiResponse, verb: Verb, name: Option<&str>) -> Error {
        let kind = K::KIND.to_string();
        match (response.status, name) {
            (404, Some(name)) => Error::NotFound {
                kind,
                name: name.to_string(),
            },
            (409, Some(name)) => match verb {
                Verb::Create => Error::AlreadyExists {
                    kind,
                    name: name.to_string(),
                },
                _ => Error::Conflict {
                    kind,
                    name: name.to_string(),
                },
            },
            _ => Error::Api {
                status: response.status,
                message: response
                    .body
                    .as_ref()
                    .and_then(|b| b.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("request failed")
                    .to_string(),
            },
        }
    }
}
