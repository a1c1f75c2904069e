use std::any::TypeId;
use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;
use crate::record::{Record, RecordShape};
use crate::value::Mappable;

/// Structural category of a type.
///
/// Named aliases share the kind of the type they wrap, so `Celsius(f64)`
/// and `f64` are both `F64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Char,
    String,
    Record,
    /// `Vec<T>`.
    Sequence,
    /// `Option<T>`, the nullable reference.
    Reference,
}

impl Kind {
    pub fn is_primitive(self) -> bool {
        !matches!(self, Kind::Record | Kind::Sequence | Kind::Reference)
    }
}

/// Static description of a type as seen by the mapper.
///
/// - `id` decides identity: two tags denote the same declared type iff their ids match.
/// - `kind` decides compatibility between different declared types.
/// - `elem` is set for `Sequence` and `Reference`.
/// - `shape` is set for records (zero-value constructor used by embedded promotion).
#[derive(Debug, Clone, Serialize)]
pub struct TypeTag {
    pub name: String,
    pub kind: Kind,
    #[serde(skip)]
    pub id: TypeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Box<TypeTag>>,
    #[serde(skip)]
    pub shape: Option<RecordShape>,
}

impl TypeTag {
    pub fn primitive<T: 'static>(name: &str, kind: Kind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            id: TypeId::of::<T>(),
            elem: None,
            shape: None,
        }
    }

    pub fn record<R: Record>(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: Kind::Record,
            id: TypeId::of::<R>(),
            elem: None,
            shape: Some(RecordShape::of::<R>()),
        }
    }

    /// Tag of `T = Vec<elem>`.
    pub fn sequence<T: 'static>(elem: TypeTag) -> Self {
        Self {
            name: format!("Vec<{}>", elem.name),
            kind: Kind::Sequence,
            id: TypeId::of::<T>(),
            elem: Some(Box::new(elem)),
            shape: None,
        }
    }

    /// Tag of `T = Option<elem>`.
    pub fn reference<T: 'static>(elem: TypeTag) -> Self {
        Self {
            name: format!("Option<{}>", elem.name),
            kind: Kind::Reference,
            id: TypeId::of::<T>(),
            elem: Some(Box::new(elem)),
            shape: None,
        }
    }

    /// Tag of a named alias `T` over `inner`: own name and identity, inner's kind.
    pub fn alias<T: 'static>(name: &str, inner: TypeTag) -> Self {
        Self {
            name: name.to_string(),
            id: TypeId::of::<T>(),
            shape: None,
            ..inner
        }
    }

    pub fn is_identical(&self, other: &TypeTag) -> bool {
        self.id == other.id
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other)
    }
}

impl Eq for TypeTag {}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Static metadata about one declared field of a record.
///
/// Position in the owner's descriptor list equals `index`, which is also the
/// index accepted by [`Record::read_field`] / [`Record::write_field`].
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: TypeTag,
    /// Declared `pub`. Non-exported fields are never written by the mapper.
    pub exported: bool,
    pub index: usize,
    pub owner: &'static str,
    #[serde(skip)]
    pub owner_id: TypeId,
    /// Declared with `#[automap(embed)]`.
    pub embedded: bool,
    /// Descriptors of the embedded record, empty for ordinary fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub promoted: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    pub fn new<O: 'static, T: Mappable>(
        owner: &'static str,
        index: usize,
        name: &'static str,
        exported: bool,
    ) -> Self {
        Self {
            name,
            ty: T::type_tag(),
            exported,
            index,
            owner,
            owner_id: TypeId::of::<O>(),
            embedded: false,
            promoted: Vec::new(),
        }
    }

    pub fn embedded<O: 'static, R: Record>(
        owner: &'static str,
        index: usize,
        name: &'static str,
        exported: bool,
    ) -> Self {
        Self {
            embedded: true,
            promoted: R::descriptors(),
            ..Self::new::<O, R>(owner, index, name, exported)
        }
    }
}

/// Build the ordered descriptor list of `T`.
///
/// # Panics
///
/// If `T` does not describe itself as a record.
pub fn describe<T: Record>() -> Vec<FieldDescriptor> {
    let tag = T::type_tag();
    if tag.kind != Kind::Record {
        panic!("{}", ConfigError::NotARecord(tag.name));
    }
    T::descriptors()
}

/// Location of a destination field: its index, preceded by the indices of
/// the embedded records it is promoted through.
pub type FieldPath = Vec<usize>;

/// Find a field by name at the shallowest depth it occurs.
///
/// Direct fields are searched first, then fields promoted through embedded
/// records one level at a time. More than one result means the name is
/// ambiguous at that depth.
pub fn find_named<'a>(
    fields: &'a [FieldDescriptor],
    name: &str,
) -> Vec<(FieldPath, &'a FieldDescriptor)> {
    let mut level: Vec<(FieldPath, &'a FieldDescriptor)> =
        fields.iter().map(|f| (vec![f.index], f)).collect();
    while !level.is_empty() {
        let found: Vec<_> = level.iter().filter(|(_, f)| f.name == name).cloned().collect();
        if !found.is_empty() {
            return found;
        }
        level = level
            .into_iter()
            .filter(|(_, f)| f.embedded)
            .flat_map(|(path, f)| {
                f.promoted.iter().map(move |p| {
                    let mut path = path.clone();
                    path.push(p.index);
                    (path, p)
                })
            })
            .collect();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inner;
    struct Outer;

    fn inner() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new::<Inner, String>("Inner", 0, "created_by", true),
            FieldDescriptor::new::<Inner, u32>("Inner", 1, "revision", true),
        ]
    }

    fn embed(index: usize, name: &'static str) -> FieldDescriptor {
        FieldDescriptor {
            embedded: true,
            promoted: inner(),
            ..FieldDescriptor::new::<Outer, u64>("Outer", index, name, true)
        }
    }

    #[test]
    fn direct_field_shadows_promoted_one() {
        let fields = vec![
            FieldDescriptor::new::<Outer, u32>("Outer", 0, "revision", true),
            embed(1, "audit"),
        ];
        let found = find_named(&fields, "revision");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, vec![0]);

        let found = find_named(&fields, "created_by");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, vec![1, 0]);
    }

    #[test]
    fn same_depth_duplicates_are_all_reported() {
        let fields = vec![embed(0, "first"), embed(1, "second")];
        let paths: Vec<_> = find_named(&fields, "revision").into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec![vec![0, 1], vec![1, 1]]);
        assert!(find_named(&fields, "nope").is_empty());
    }
}
