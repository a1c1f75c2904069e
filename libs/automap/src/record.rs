use std::any::{Any, TypeId};
use std::fmt;
use std::ops::Deref;

use crate::schema::FieldDescriptor;
use crate::value::{Mappable, Value};

/// A struct the mapper can enumerate, read and populate field by field.
///
/// Implemented by `#[derive(Record)]`; the struct must also implement
/// `Default` (its zero value) and `Clone` (identical-type record copies).
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default, Clone)]
/// pub struct User {
///     pub name: String,
///     pub age: u32,
///     #[automap(embed)]
///     pub address: Address,
/// }
/// ```
pub trait Record: Mappable + Default + Clone {
    /// Generated accessor struct with one [`FieldHandle`] per declared field.
    type Fields;

    fn fields() -> Self::Fields;

    /// Declared fields in declaration order.
    fn descriptors() -> Vec<FieldDescriptor>;

    /// `None` if `index` is out of range.
    fn read_field(&self, index: usize) -> Option<Value>;

    /// `false` if `index` is out of range or `value` has the wrong kind.
    fn write_field(&mut self, index: usize, value: Value) -> bool;
}

/// Object-safe view of a record, used to populate records whose concrete
/// type is only known through a descriptor (embedded fields).
pub trait DynRecord: Any {
    fn get_field(&self, index: usize) -> Option<Value>;
    fn set_field(&mut self, index: usize, value: Value) -> bool;
    fn clone_record(&self) -> Box<dyn DynRecord>;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn record_name(&self) -> String;
}

impl<R: Record> DynRecord for R {
    fn get_field(&self, index: usize) -> Option<Value> {
        <R as Record>::read_field(self, index)
    }

    fn set_field(&mut self, index: usize, value: Value) -> bool {
        <R as Record>::write_field(self, index, value)
    }

    fn clone_record(&self) -> Box<dyn DynRecord> {
        Box::new(self.clone())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn record_name(&self) -> String {
        R::type_tag().name
    }
}

/// Type-erased record instance carried by [`Value::Record`].
pub struct RecordValue(Box<dyn DynRecord>);

impl RecordValue {
    pub fn new<R: Record>(record: R) -> Self {
        Self(Box::new(record))
    }

    pub fn from_boxed(record: Box<dyn DynRecord>) -> Self {
        Self(record)
    }

    pub(crate) fn as_dyn_mut(&mut self) -> &mut dyn DynRecord {
        &mut *self.0
    }

    /// Recover the concrete record. `None` if it is of another type.
    pub fn downcast<R: Record>(self) -> Option<R> {
        self.0.into_any().downcast::<R>().ok().map(|r| *r)
    }
}

impl Clone for RecordValue {
    fn clone(&self) -> Self {
        Self(self.0.clone_record())
    }
}

impl fmt::Debug for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordValue({})", self.0.record_name())
    }
}

/// Zero-value constructor of a record type, kept in its [`TypeTag`](crate::schema::TypeTag).
#[derive(Clone, Copy)]
pub struct RecordShape {
    pub zeroed: fn() -> Box<dyn DynRecord>,
}

impl RecordShape {
    pub fn of<R: Record>() -> Self {
        Self { zeroed: zeroed::<R> }
    }
}

fn zeroed<R: Record>() -> Box<dyn DynRecord> {
    Box::new(R::default())
}

impl fmt::Debug for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordShape")
    }
}

/// Opaque token naming one declared field of a record.
///
/// Obtained from the record's generated accessor struct
/// (`<D as Record>::fields()`) and resolved by
/// [`Config::for_field`](crate::config::Config::for_field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    owner: TypeId,
    owner_name: &'static str,
    index: usize,
    name: &'static str,
    ty: TypeId,
}

impl FieldHandle {
    /// Handle of field `index` (named `name`, declared type `T`) of record `O`.
    pub fn new<O: 'static, T: 'static>(owner_name: &'static str, index: usize, name: &'static str) -> Self {
        Self {
            owner: TypeId::of::<O>(),
            owner_name,
            index,
            name,
            ty: TypeId::of::<T>(),
        }
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn owner_name(&self) -> &'static str {
        self.owner_name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_type(&self) -> TypeId {
        self.ty
    }
}

/// Accessor entry for an `#[automap(embed)]` field.
///
/// Derefs to the embedded record's own accessor struct, so
/// `|f| f.address.street` selects a promoted field while
/// `|f| f.address.field()` selects the embedded field itself.
pub struct Embedded<F> {
    handle: FieldHandle,
    fields: F,
}

impl<F> Embedded<F> {
    pub fn new(handle: FieldHandle, fields: F) -> Self {
        Self { handle, fields }
    }

    pub fn field(&self) -> FieldHandle {
        self.handle
    }
}

impl<F> Deref for Embedded<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.fields
    }
}
