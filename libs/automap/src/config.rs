use std::collections::HashMap;
use std::marker::PhantomData;

use crate::converter::classify;
use crate::error::ConfigError;
use crate::mapping::{FieldOption, FieldPlan, MapPlan, Override, Strategy};
use crate::record::{FieldHandle, Record};
use crate::schema::{describe, find_named, FieldDescriptor, FieldPath};

/// Mapper from record `S` to record `D`.
///
/// Descriptors of both records are built once in [`Config::new`]; overrides
/// are registered through the consuming builder methods. After that the
/// config is only read, so it can be shared between threads and reused for
/// any number of [`map`](Config::map) calls.
///
/// # Example
///
/// ```ignore
/// let users = Config::<UserModel, UserDto>::new()
///     .for_field_name("password", ignore_field())
///     .for_field(|f| f.display_name, map_field(|u: &UserModel| {
///         Ok::<_, BoxError>(format!("{} {}", u.first, u.last))
///     }));
/// let dto = users.map(&model)?;
/// ```
pub struct Config<S, D> {
    pub(crate) source: Vec<FieldDescriptor>,
    pub(crate) dest: Vec<FieldDescriptor>,
    pub(crate) source_name: String,
    pub(crate) dest_name: String,
    pub(crate) overrides: HashMap<FieldPath, Override<S>>,
    _types: PhantomData<fn(&S) -> D>,
}

/// Shorthand for [`Config::new`].
pub fn new<S: Record, D: Record>() -> Config<S, D> {
    Config::new()
}

impl<S: Record, D: Record> Config<S, D> {
    pub fn new() -> Self {
        let source = describe::<S>();
        let dest = describe::<D>();
        let source_name = S::type_tag().name;
        let dest_name = D::type_tag().name;
        tracing::debug!(
            source = %source_name,
            dest = %dest_name,
            source_fields = source.len(),
            dest_fields = dest.len(),
            "mapper configured"
        );
        Self {
            source,
            dest,
            source_name,
            dest_name,
            overrides: HashMap::new(),
            _types: PhantomData,
        }
    }

    /// Override the destination field `name` (direct or promoted).
    ///
    /// # Panics
    ///
    /// If the destination has no such field.
    pub fn for_field_name(self, name: &str, option: FieldOption<S>) -> Self {
        match self.try_for_field_name(name, option) {
            Ok(config) => config,
            Err(e) => panic!("{e}"),
        }
    }

    /// Override the destination field picked by `selector` from `D`'s field handles.
    ///
    /// # Panics
    ///
    /// If the handle does not denote exactly one field of the destination.
    pub fn for_field<F>(self, selector: F, option: FieldOption<S>) -> Self
    where
        F: FnOnce(&D::Fields) -> FieldHandle,
    {
        match self.try_for_field(selector, option) {
            Ok(config) => config,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`for_field_name`](Config::for_field_name). A name promoted
    /// from more than one embedded record at the same depth is ambiguous.
    pub fn try_for_field_name(
        self,
        name: &str,
        option: FieldOption<S>,
    ) -> Result<Self, ConfigError> {
        let mut found = find_named(&self.dest, name);
        let (path, field) = match found.len() {
            0 => {
                return Err(ConfigError::UnknownField {
                    dest: self.dest_name.clone(),
                    name: name.to_string(),
                })
            }
            1 => found.swap_remove(0),
            _ => {
                return Err(ConfigError::AmbiguousField {
                    dest: self.dest_name.clone(),
                    name: name.to_string(),
                })
            }
        };
        let field = field.name;
        Ok(self.register(path, field, option))
    }

    pub fn try_for_field<F>(self, selector: F, option: FieldOption<S>) -> Result<Self, ConfigError>
    where
        F: FnOnce(&D::Fields) -> FieldHandle,
    {
        let handle = selector(&D::fields());
        let (path, field) = self.resolve(&handle)?;
        Ok(self.register(path, field, option))
    }

    fn register(mut self, path: FieldPath, field: &'static str, option: FieldOption<S>) -> Self {
        tracing::debug!(
            dest = %self.dest_name,
            field,
            path = ?path,
            option = option.describe(),
            "field override"
        );
        self.overrides.entry(path).or_default().merge(option);
        self
    }

    /// Path of the destination field `handle` denotes.
    ///
    /// Searches direct fields and, recursively, the fields of embedded
    /// records. A field matches when owner and index agree and its declared
    /// type is the handle's type.
    fn resolve(&self, handle: &FieldHandle) -> Result<(FieldPath, &'static str), ConfigError> {
        let mut found = Vec::new();
        collect_matches(&self.dest, handle, &mut Vec::new(), &mut found);
        match found.len() {
            1 => Ok(found.swap_remove(0)),
            0 => Err(ConfigError::UnresolvedSelector {
                dest: self.dest_name.clone(),
                owner: handle.owner_name(),
                field: handle.name(),
            }),
            _ => Err(ConfigError::AmbiguousSelector {
                dest: self.dest_name.clone(),
                owner: handle.owner_name(),
                field: handle.name(),
            }),
        }
    }

    pub fn source_fields(&self) -> &[FieldDescriptor] {
        &self.source
    }

    pub fn dest_fields(&self) -> &[FieldDescriptor] {
        &self.dest
    }

    /// Describe what [`map`](Config::map) does for every destination field
    /// without running it.
    pub fn plan(&self) -> MapPlan {
        MapPlan {
            source: self.source_name.clone(),
            target: self.dest_name.clone(),
            fields: self.plan_fields(&self.dest, &mut Vec::new()),
        }
    }

    fn plan_fields(&self, fields: &[FieldDescriptor], path: &mut FieldPath) -> Vec<FieldPlan> {
        let mut plans = Vec::with_capacity(fields.len());
        for df in fields {
            path.push(df.index);
            let (source, strategy) = match self.step(path, df) {
                Step::Skip => (None, Strategy::Unexported),
                Step::Override(o) => (None, override_strategy(o)),
                Step::Match(sf) => (Some(sf.name), classify(&sf.ty, &df.ty)),
                Step::Patch(sf) => (
                    Some(sf.name),
                    match classify(&sf.ty, &df.ty) {
                        Strategy::Incompatible => Strategy::Incompatible,
                        _ => Strategy::Patched(self.plan_patch(&df.promoted, path)),
                    },
                ),
                Step::Promote => (None, Strategy::Promoted(self.plan_fields(&df.promoted, path))),
                Step::Missing => (None, Strategy::Missing),
            };
            path.pop();
            plans.push(FieldPlan {
                target: df.name,
                source,
                strategy,
            });
        }
        plans
    }

    /// Overridden fields of a copied embedded record.
    fn plan_patch(&self, fields: &[FieldDescriptor], path: &mut FieldPath) -> Vec<FieldPlan> {
        let mut plans = Vec::new();
        for pf in fields.iter().filter(|pf| pf.exported) {
            path.push(pf.index);
            let strategy = match self.active_override(path) {
                Some(o) => Some(override_strategy(o)),
                None if pf.embedded && self.has_nested_overrides(path) => {
                    Some(Strategy::Patched(self.plan_patch(&pf.promoted, path)))
                }
                None => None,
            };
            path.pop();
            if let Some(strategy) = strategy {
                plans.push(FieldPlan {
                    target: pf.name,
                    source: None,
                    strategy,
                });
            }
        }
        plans
    }

    /// Decide how the destination field at `path` is populated. Shared by
    /// `map` and `plan`.
    pub(crate) fn step<'a>(&'a self, path: &[usize], df: &FieldDescriptor) -> Step<'a, S> {
        if !df.exported {
            return Step::Skip;
        }
        if let Some(o) = self.active_override(path) {
            return Step::Override(o);
        }
        match self.source.iter().find(|sf| sf.name == df.name) {
            Some(sf) if df.embedded && self.has_nested_overrides(path) => Step::Patch(sf),
            Some(sf) => Step::Match(sf),
            None if df.embedded && df.ty.shape.is_some() => Step::Promote,
            None => Step::Missing,
        }
    }

    pub(crate) fn active_override(&self, path: &[usize]) -> Option<&Override<S>> {
        self.overrides.get(path).filter(|o| o.is_active())
    }

    /// Some field below `path` carries an override.
    pub(crate) fn has_nested_overrides(&self, path: &[usize]) -> bool {
        self.overrides
            .iter()
            .any(|(key, o)| key.len() > path.len() && key.starts_with(path) && o.is_active())
    }
}

fn override_strategy<S>(o: &Override<S>) -> Strategy {
    if o.ignore {
        Strategy::Ignored
    } else {
        Strategy::Transform
    }
}

fn collect_matches(
    fields: &[FieldDescriptor],
    handle: &FieldHandle,
    path: &mut FieldPath,
    found: &mut Vec<(FieldPath, &'static str)>,
) {
    for field in fields {
        path.push(field.index);
        if field.owner_id == handle.owner()
            && field.index == handle.index()
            && field.ty.id == handle.declared_type()
        {
            found.push((path.clone(), field.name));
        }
        if field.embedded {
            collect_matches(&field.promoted, handle, path, found);
        }
        path.pop();
    }
}

pub(crate) enum Step<'a, S> {
    Skip,
    Override(&'a Override<S>),
    Match(&'a FieldDescriptor),
    /// Same-named embedded record copied, then its overridden fields rewritten.
    Patch(&'a FieldDescriptor),
    Promote,
    Missing,
}

impl<S: Record, D: Record> Default for Config<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, D> Clone for Config<S, D> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            dest: self.dest.clone(),
            source_name: self.source_name.clone(),
            dest_name: self.dest_name.clone(),
            overrides: self.overrides.clone(),
            _types: PhantomData,
        }
    }
}
