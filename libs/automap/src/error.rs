/// Error type accepted from and passed through by user transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Recoverable mapping error, returned by `map` / `map_slice`.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("destination type is {dest}, source is {src}")]
    IncompatibleTypes { dest: String, src: String },

    #[error("field '{field}' not found in source type '{source_type}'")]
    MissingField {
        field: &'static str,
        source_type: String,
    },

    #[error("transform for field '{field}' produced a value that does not fit type {expected}")]
    TransformOutput {
        field: &'static str,
        expected: String,
    },

    /// Error returned by a user transform, unchanged.
    #[error(transparent)]
    Transform(BoxError),
}

impl MapError {
    /// The transform's own error, if this is one.
    pub fn transform_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            MapError::Transform(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Programmer error in a mapper configuration.
///
/// The builder methods panic with this error's message; the `try_*`
/// variants return it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("type '{0}' is not a record")]
    NotARecord(String),

    #[error("destination '{dest}' has no field named {name}")]
    UnknownField { dest: String, name: String },

    #[error("destination '{dest}' has more than one field named {name}")]
    AmbiguousField { dest: String, name: String },

    #[error("selector '{owner}.{field}' does not resolve to a field of '{dest}'")]
    UnresolvedSelector {
        dest: String,
        owner: &'static str,
        field: &'static str,
    },

    #[error("selector '{owner}.{field}' matches more than one field of '{dest}'")]
    AmbiguousSelector {
        dest: String,
        owner: &'static str,
        field: &'static str,
    },
}
