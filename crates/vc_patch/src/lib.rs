#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

//! Path addressed reads and writes into message trees.
//!
//! A path such as `"list.message.0.string"` names a slot below a root
//! [`DynamicMessage`](vc_schema::DynamicMessage): segments select fields of
//! messages (by name, JSON name or number), elements of lists (by signed
//! index, negative counting from the end) and entries of maps (by key, parsed
//! per key kind). The empty path names the root itself.
//!
//! The operators read ([`get`], [`get_copy`], [`get_new`], [`get_mut`]),
//! write ([`set`], [`clear`], [`append`], [`insert`]) and transfer
//! ([`copy`], [`relocate`], [`swap`]) slots. Every write is type checked
//! against the schema. A [`Setup`] adds [`Converter`]s that reshape written
//! values and [`ContainerTransformer`]s that substitute the [`Container`]s
//! met on the way.
//!
//! Failures are [`PatchError`]s naming the failing location.
//!
//! # Examples
//!
//! ```
//! use vc_patch::{Item, NotFoundKind, PatchError};
//! use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MapKeyKind, MessageBuilder, Schema};
//!
//! let schema = Schema::builder()
//!     .message(
//!         MessageBuilder::new("demo.Team")
//!             .field(FieldBuilder::new("name", 1, FieldType::String))
//!             .field(FieldBuilder::new("members", 2, FieldType::message("demo.Member")).repeated())
//!             .field(FieldBuilder::new("scores", 3, FieldType::Int64).map(MapKeyKind::String)),
//!     )
//!     .message(MessageBuilder::new("demo.Member").field(FieldBuilder::new("nick", 1, FieldType::String)))
//!     .build()
//!     .unwrap();
//! let team = schema.message_by_name("demo.Team").unwrap();
//! let member = schema.message_by_name("demo.Member").unwrap();
//!
//! let mut root = DynamicMessage::new(team);
//! vc_patch::append(&mut root, "members", DynamicMessage::new(member)).unwrap();
//! vc_patch::set(&mut root, "members.0.nick", "ada").unwrap();
//! vc_patch::set(&mut root, "scores.ada", 3_i64).unwrap();
//! vc_patch::copy(&mut root, "name", "members.-1.nick").unwrap();
//!
//! assert_eq!(vc_patch::get(&root, "name"), Ok(Item::from("ada")));
//! assert_eq!(vc_patch::get(&root, "scores.ada"), Ok(Item::from(3_i64)));
//! assert_eq!(
//!     vc_patch::get(&root, "members.1.nick"),
//!     Err(PatchError::not_found(NotFoundKind::Index, "1").in_path("members")),
//! );
//! ```

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod access;
mod container;
mod convert;
mod error;
mod item;
mod ops;
mod path;
mod setup;

#[cfg(feature = "json")]
mod json;

#[cfg(test)]
mod testing;

// -----------------------------------------------------------------------------
// Exports

pub use container::{Container, ContainerDescriptor, ListContainer, MapContainer, RecordContainer};
pub use convert::{IdentityConverter, is_same_type};
pub use error::{ErrInPath, NotFoundKind, Operation, PatchError};
pub use item::{Item, List, Map, Opaque};
pub use path::{Path, SEPARATOR, Segment, Segments};
pub use setup::{ContainerTransformer, Converter, Setup, Transformed};

pub use ops::{
    access, access_mutable, append, clear, copy, get, get_copy, get_mut, get_new, insert,
    relocate, set, swap,
};

#[cfg(feature = "json")]
#[cfg_attr(docsrs, doc(cfg(feature = "json")))]
pub use json::JsonConverter;
