use std::sync::Arc;

use serde::Serialize;

use crate::error::{BoxError, MapError};
use crate::value::{Mappable, Value};

pub(crate) type TransformFn<S> = dyn Fn(&S) -> Result<Value, BoxError> + Send + Sync;

/// Per-destination-field override.
///
/// `ignore` wins over `transform`. Neither set behaves like no override.
pub(crate) struct Override<S> {
    pub ignore: bool,
    pub transform: Option<Arc<TransformFn<S>>>,
}

impl<S> Default for Override<S> {
    fn default() -> Self {
        Self {
            ignore: false,
            transform: None,
        }
    }
}

impl<S> Clone for Override<S> {
    fn clone(&self) -> Self {
        Self {
            ignore: self.ignore,
            transform: self.transform.clone(),
        }
    }
}

impl<S> Override<S> {
    pub fn merge(&mut self, option: FieldOption<S>) {
        match option.0 {
            OptionKind::Ignore => self.ignore = true,
            OptionKind::Transform(f) => self.transform = Some(f),
        }
    }

    pub fn is_active(&self) -> bool {
        self.ignore || self.transform.is_some()
    }

    /// `Ok(None)` leaves the field at its zero value.
    pub fn apply(&self, source: &S) -> Result<Option<Value>, MapError> {
        if self.ignore {
            return Ok(None);
        }
        match &self.transform {
            Some(f) => f(source).map(Some).map_err(MapError::Transform),
            None => Ok(None),
        }
    }
}

/// Override applied to a destination field, built by [`ignore_field`] or [`map_field`].
pub struct FieldOption<S>(OptionKind<S>);

enum OptionKind<S> {
    Ignore,
    Transform(Arc<TransformFn<S>>),
}

impl<S> FieldOption<S> {
    pub(crate) fn describe(&self) -> &'static str {
        match self.0 {
            OptionKind::Ignore => "ignore",
            OptionKind::Transform(_) => "transform",
        }
    }
}

/// Leave the destination field at its zero value.
pub fn ignore_field<S>() -> FieldOption<S> {
    FieldOption(OptionKind::Ignore)
}

/// Populate the destination field from the whole source record.
///
/// The result is stored at kind level, so an alias field accepts the type it
/// wraps. Errors are passed through as [`MapError::Transform`].
pub fn map_field<S, V, E, F>(f: F) -> FieldOption<S>
where
    S: 'static,
    V: Mappable,
    E: Into<BoxError>,
    F: Fn(&S) -> Result<V, E> + Send + Sync + 'static,
{
    FieldOption(OptionKind::Transform(Arc::new(move |src: &S| {
        f(src).map(|v| v.to_value()).map_err(Into::into)
    })))
}

/// How `map` populates each destination field.
///
/// Built by [`Config::plan`](crate::config::Config::plan), in destination
/// declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPlan {
    pub source: String,
    pub target: String,
    pub fields: Vec<FieldPlan>,
}

impl MapPlan {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.target == name)
    }

    /// `true` if `map` can fail only through user transforms.
    pub fn is_complete(&self) -> bool {
        fn complete(fields: &[FieldPlan]) -> bool {
            fields.iter().all(|f| match &f.strategy {
                Strategy::Missing | Strategy::Incompatible => false,
                Strategy::Promoted(inner) | Strategy::Patched(inner) => complete(inner),
                _ => true,
            })
        }
        complete(&self.fields)
    }
}

/// One destination field: its source link and strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPlan {
    pub target: &'static str,
    /// `None` for overrides, promotions and missing fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum Strategy {
    /// Identical types, value copied as-is.
    Copy,
    /// Same kind, value reinterpreted under the destination type.
    Convert,
    /// User transform.
    Transform,
    /// Field left at its zero value.
    Ignored,
    /// Not `pub`, never written.
    Unexported,
    /// Embedded record built from its own fields.
    Promoted(Vec<FieldPlan>),
    /// Embedded record copied from the same-named source field, then the
    /// listed fields overridden.
    Patched(Vec<FieldPlan>),
    /// No source field and no override: `map` fails with `MissingField`.
    Missing,
    /// `map` fails with `IncompatibleTypes`.
    Incompatible,
}
