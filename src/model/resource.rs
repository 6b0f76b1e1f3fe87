//! Resource trait
//!
//! The interface every concrete kind implements. Kinds are defined outside
//! this crate (generated or hand-written); the client, mock server, and
//! manifest loader are all parameterized over this trait.

use super::meta::ObjectMeta;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A named, optionally namespaced, schema-typed object exchanged with the
/// control plane.
///
/// Implementations are plain serde structs whose unknown fields are captured
/// in flattened maps, so `decode(encode(obj)) == obj` holds for any wire
/// body of the right kind.
pub trait Resource:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Schema identity, e.g. `"SandboxPolicy"`.
    const KIND: &'static str;
    /// API group and version, e.g. `"policy.example.io/v1"`.
    const API_GROUP_VERSION: &'static str;
    /// Plural path segment, e.g. `"sandboxpolicies"`.
    const PLURAL: &'static str;
    /// Whether objects of this kind live inside a namespace.
    const NAMESPACED: bool;

    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    /// Collection path: `/apis/{groupVersion}/{plural}`, with
    /// `namespaces/{ns}/` inserted for namespaced kinds when a namespace is
    /// bound. The namespace is ignored for cluster-scoped kinds.
    fn collection_path(namespace: Option<&str>) -> String {
        match namespace {
            Some(ns) if Self::NAMESPACED => format!(
                "/apis/{}/namespaces/{}/{}",
                Self::API_GROUP_VERSION,
                ns,
                Self::PLURAL
            ),
            _ => format!("/apis/{}/{}", Self::API_GROUP_VERSION, Self::PLURAL),
        }
    }

    /// Path of a single named object.
    fn named_path(namespace: Option<&str>, name: &str) -> String {
        format!("{}/{}", Self::collection_path(namespace), name)
    }

    /// Collection path with an optional label selector in the query string.
    fn list_path(namespace: Option<&str>, label_selector: Option<&str>) -> String {
        let mut path = Self::collection_path(namespace);
        if let Some(selector) = label_selector {
            path.push_str("?labelSelector=");
            path.push_str(&urlencoding::encode(selector));
        }
        path
    }
}
