use crate::record::RecordValue;
use crate::schema::{Kind, TypeTag};

/// Kind-level value representation.
///
/// Every field read produces a `Value`; every field write consumes one and
/// rebuilds the field's exact declared type from it. Named aliases therefore
/// share the representation of the type they wrap:
/// - Scalars and `String`: one variant per kind
/// - `Vec<T>`: `Seq`, elements converted individually
/// - `Option<T>`: `Ref`, `None` is the absent reference
/// - Records: type-erased instance, only readable as its own type
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),

    Seq(Vec<Value>),
    Ref(Option<Box<Value>>),
    Record(RecordValue),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::I8(_) => Kind::I8,
            Value::I16(_) => Kind::I16,
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::I128(_) => Kind::I128,
            Value::Isize(_) => Kind::Isize,
            Value::U8(_) => Kind::U8,
            Value::U16(_) => Kind::U16,
            Value::U32(_) => Kind::U32,
            Value::U64(_) => Kind::U64,
            Value::U128(_) => Kind::U128,
            Value::Usize(_) => Kind::Usize,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Char(_) => Kind::Char,
            Value::String(_) => Kind::String,
            Value::Seq(_) => Kind::Sequence,
            Value::Ref(_) => Kind::Reference,
            Value::Record(_) => Kind::Record,
        }
    }
}

/// A type the mapper can read from and write into a record field.
///
/// Implemented here for primitives, `String`, `Vec<T>` and `Option<T>`;
/// `#[derive(Record)]` and `#[derive(Alias)]` implement it for user types.
pub trait Mappable: Sized + 'static {
    fn type_tag() -> TypeTag;

    fn to_value(&self) -> Value;

    /// Rebuild `Self` from a value of the same kind. `None` on kind mismatch.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_primitive {
    ($($ty:ident => $variant:ident),* $(,)?) => {$(
        impl Mappable for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::primitive::<$ty>(stringify!($ty), Kind::$variant)
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    )*};
}

impl_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
}

impl<T: Mappable> Mappable for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::sequence::<Self>(T::type_tag())
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Mappable::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: Mappable> Mappable for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::reference::<Self>(T::type_tag())
    }

    fn to_value(&self) -> Value {
        Value::Ref(self.as_ref().map(|v| Box::new(v.to_value())))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Ref(None) => Some(None),
            Value::Ref(Some(inner)) => T::from_value(*inner).map(Some),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_tags_name_their_elements() {
        assert_eq!(Vec::<String>::type_tag().name, "Vec<String>");
        assert_eq!(Option::<Vec<u8>>::type_tag().name, "Option<Vec<u8>>");
        assert_eq!(Option::<i32>::type_tag().kind, Kind::Reference);
    }

    #[test]
    fn option_round_trips_absent_reference() {
        let value = Option::<i64>::None.to_value();
        assert!(matches!(value, Value::Ref(None)));
        assert_eq!(Option::<i64>::from_value(value), Some(None));
    }

    #[test]
    fn from_value_rejects_other_kinds() {
        assert_eq!(i64::from_value(Value::I32(1)), None);
        assert_eq!(Vec::<bool>::from_value(Value::Seq(vec![Value::I64(1)])), None);
        assert_eq!(String::from_value(Value::Ref(None)), None);
    }
}
