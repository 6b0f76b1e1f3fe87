//! Resource data model
//!
//! Value types exchanged with the control plane and the machinery for
//! building and editing them. Concrete kinds live outside this crate and
//! plug in through the [`Resource`] trait.
//!
//! # Round-trip guarantee
//!
//! Every model struct captures keys it does not know about in a flattened,
//! order-preserving `extra` map. Decoding a wire body and encoding it again
//! loses nothing, fields added by newer servers included; unknown keys keep
//! their relative order. Equality compares typed fields and extras by value,
//! never by position.
//!
//! # Module Structure
//!
//! - `meta` - Object/list metadata and the type-erased [`RawResource`]
//! - `resource` - The [`Resource`] trait and REST path construction
//! - `builder` - Chainable builders, nested sub-builders, [`Editable`]
//! - `patch` - JSON merge-patch [`diff`]/[`apply`]

mod builder;
mod meta;
mod patch;
mod resource;

pub use builder::{Editable, MetadataBuilder, MetadataNested};
pub use meta::{ListMeta, ObjectMeta, RawResource, ResourceList};
pub use patch::{apply, diff};
pub use resource::Resource;
