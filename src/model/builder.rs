//! Builders and editors
//!
//! Chainable, by-value builders over snapshots of model values. A builder
//! never mutates the object it was created from; `build()` hands off an
//! independent snapshot. Composite fields use nested builders that hold a
//! parent back-reference and merge on their `end_*` call; kind-specific
//! builders outside this crate follow the same pattern
//! ([`MetadataNested`] is the reusable piece for object metadata).

use super::meta::ObjectMeta;
use serde_json::Value;

/// Hands out a builder pre-populated with the value's current fields.
///
/// `edit().build()` on an untouched value is value-equal to the original.
pub trait Editable {
    type Builder;

    fn edit(&self) -> Self::Builder;
}

/// Chainable builder for [`ObjectMeta`].
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    meta: ObjectMeta,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.meta.name = Some(name.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.meta.namespace = Some(namespace.into());
        self
    }

    pub fn resource_version(mut self, version: impl Into<String>) -> Self {
        self.meta.resource_version = Some(version.into());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta
            .labels
            .get_or_insert_with(Default::default)
            .insert(key.into(), value.into());
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta
            .annotations
            .get_or_insert_with(Default::default)
            .insert(key.into(), value.into());
        self
    }

    /// Set a metadata key the schema does not model.
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.extra.insert(key.into(), value);
        self
    }

    pub fn build(self) -> ObjectMeta {
        self.meta
    }
}

impl From<ObjectMeta> for MetadataBuilder {
    fn from(meta: ObjectMeta) -> Self {
        Self { meta }
    }
}

impl Editable for ObjectMeta {
    type Builder = MetadataBuilder;

    fn edit(&self) -> MetadataBuilder {
        MetadataBuilder::from(self.clone())
    }
}

/// Metadata builder nested inside a parent builder.
///
/// Owns its working snapshot exclusively; the parent sees nothing until
/// [`end_metadata`](Self::end_metadata) merges the built value back through
/// the `attach` function. Kind builders create one via:
///
/// ```ignore
/// impl WidgetBuilder {
///     pub fn new_metadata(self) -> MetadataNested<Self> {
///         MetadataNested::wrap(self, |mut parent, meta| {
///             parent.obj.metadata = meta;
///             parent
///         })
///     }
/// }
/// ```
pub struct MetadataNested<P> {
    parent: P,
    attach: fn(P, ObjectMeta) -> P,
    builder: MetadataBuilder,
}

impl<P> MetadataNested<P> {
    /// Start from an empty metadata snapshot.
    pub fn wrap(parent: P, attach: fn(P, ObjectMeta) -> P) -> Self {
        Self::wrap_existing(parent, attach, ObjectMeta::default())
    }

    /// Start from an existing snapshot (edit flows).
    pub fn wrap_existing(parent: P, attach: fn(P, ObjectMeta) -> P, meta: ObjectMeta) -> Self {
        Self {
            parent,
            attach,
            builder: MetadataBuilder::from(meta),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.builder = self.builder.name(name);
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.builder = self.builder.namespace(namespace);
        self
    }

    pub fn resource_version(mut self, version: impl Into<String>) -> Self {
        self.builder = self.builder.resource_version(version);
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.label(key, value);
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.annotation(key, value);
        self
    }

    /// Merge the working snapshot back into the parent.
    pub fn end_metadata(self) -> P {
        (self.attach)(self.parent, self.builder.build())
    }
}
