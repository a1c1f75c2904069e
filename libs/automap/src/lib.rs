//! Field-by-field mapping between structurally similar records.
//!
//! Records describe themselves through `#[derive(Record)]`; a [`Config`]
//! caches both descriptor lists once, holds per-field overrides, and maps
//! values by matching destination fields to same-named source fields.

pub mod config;
pub mod converter;
pub mod error;
mod executor;
pub mod mapping;
pub mod record;
pub mod schema;
pub mod util;
pub mod value;

pub use automap_derive::{Alias, Record};

pub use config::{new, Config};
pub use error::{BoxError, ConfigError, MapError};
pub use mapping::{ignore_field, map_field, FieldOption, FieldPlan, MapPlan, Strategy};
pub use record::{DynRecord, Embedded, FieldHandle, Record, RecordShape, RecordValue};
pub use schema::{FieldDescriptor, FieldPath, Kind, TypeTag};
pub use util::map_slice;
pub use value::{Mappable, Value};
