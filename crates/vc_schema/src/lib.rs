#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

//! Schema reflection runtime.
//!
//! This crate describes structured records ("messages") the way a protobuf
//! runtime does, without any generated code:
//!
//! - [`Schema`] is an immutable pool of message and enum descriptors,
//!   assembled through [`SchemaBuilder`]. Message types may refer to
//!   themselves or to each other recursively.
//! - [`MessageDescriptor`], [`FieldDescriptor`] and [`EnumDescriptor`] are
//!   cheap handles into that pool, comparable for type identity.
//! - [`DynamicMessage`] is a record instance with presence tracking,
//!   holding [`Value`]s keyed by field.
//!
//! # Examples
//!
//! ```
//! use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MessageBuilder, Schema, Value};
//!
//! let schema = Schema::builder()
//!     .message(
//!         MessageBuilder::new("demo.Node")
//!             .field(FieldBuilder::new("label", 1, FieldType::String))
//!             .field(FieldBuilder::new("children", 2, FieldType::message("demo.Node")).repeated()),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let node = schema.message_by_name("demo.Node").unwrap();
//! let label = node.field_by_name("label").unwrap();
//!
//! let mut msg = DynamicMessage::new(node);
//! assert!(!msg.has(&label));
//!
//! msg.set(&label, Value::from("root")).unwrap();
//! assert_eq!(msg.get(&label).as_str(), Some("root"));
//! ```

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod descriptor;
mod error;
mod hash;
mod kind;
mod message;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use builder::{EnumBuilder, FieldBuilder, FieldType, MessageBuilder, SchemaBuilder};
pub use descriptor::{EnumDescriptor, FieldDescriptor, MessageDescriptor, Schema};
pub use error::SchemaError;
pub use kind::{Cardinality, Kind, MapKeyKind};
pub use message::DynamicMessage;
pub use value::{MapKey, Value};
