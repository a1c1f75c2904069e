use crate::error::MapError;
use crate::mapping::Strategy;
use crate::schema::{Kind, TypeTag};
use crate::value::Value;

/// Convert a source field value to the representation of the destination field.
///
/// Dispatches on the destination kind:
/// - Record: only the identical record type is accepted
/// - Sequence: elements must share a kind, even when the sequence is empty
/// - Reference: `None` passes through, referents must share a kind
/// - Primitive: kinds must match; aliases convert in either direction
///
/// Failures anywhere below the field report the field-level type names.
pub fn convert(src: &TypeTag, value: Value, dest: &TypeTag) -> Result<Value, MapError> {
    convert_value(src, value, dest).ok_or_else(|| MapError::IncompatibleTypes {
        dest: dest.name.clone(),
        src: src.name.clone(),
    })
}

fn convert_value(src: &TypeTag, value: Value, dest: &TypeTag) -> Option<Value> {
    match dest.kind {
        Kind::Record => (src.kind == Kind::Record && src.is_identical(dest)).then_some(value),
        Kind::Sequence => {
            let (Kind::Sequence, Value::Seq(items)) = (src.kind, value) else {
                return None;
            };
            let (src_elem, dest_elem) = (src.elem.as_deref()?, dest.elem.as_deref()?);
            if src_elem.is_identical(dest_elem) {
                return Some(Value::Seq(items));
            }
            if src_elem.kind != dest_elem.kind {
                return None;
            }
            items
                .into_iter()
                .map(|item| convert_value(src_elem, item, dest_elem))
                .collect::<Option<Vec<_>>>()
                .map(Value::Seq)
        }
        Kind::Reference => {
            let (Kind::Reference, Value::Ref(inner)) = (src.kind, value) else {
                return None;
            };
            let Some(inner) = inner else {
                return Some(Value::Ref(None));
            };
            let (src_elem, dest_elem) = (src.elem.as_deref()?, dest.elem.as_deref()?);
            if src_elem.is_identical(dest_elem) {
                return Some(Value::Ref(Some(inner)));
            }
            if src_elem.kind != dest_elem.kind {
                return None;
            }
            convert_value(src_elem, *inner, dest_elem).map(|v| Value::Ref(Some(Box::new(v))))
        }
        _ => (src.kind == dest.kind).then_some(value),
    }
}

/// Static verdict for a (source, destination) field pair, as reported by
/// [`Config::plan`](crate::config::Config::plan).
///
/// Stricter than [`convert`]: an absent reference whose referent kinds
/// differ converts at run time but is `Incompatible` here.
pub fn classify(src: &TypeTag, dest: &TypeTag) -> Strategy {
    if src.is_identical(dest) {
        Strategy::Copy
    } else if compatible(src, dest) {
        Strategy::Convert
    } else {
        Strategy::Incompatible
    }
}

fn compatible(src: &TypeTag, dest: &TypeTag) -> bool {
    if src.is_identical(dest) {
        return true;
    }
    match dest.kind {
        Kind::Record => false,
        Kind::Sequence | Kind::Reference => {
            if src.kind != dest.kind {
                return false;
            }
            match (src.elem.as_deref(), dest.elem.as_deref()) {
                (Some(s), Some(d)) => s.kind == d.kind && compatible(s, d),
                _ => false,
            }
        }
        _ => src.kind == dest.kind,
    }
}
