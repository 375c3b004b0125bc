use std::path::PathBuf;

use crate::grammar::Kind;

/// Every failure the grammar model can raise. Nothing is retried or aggregated: the first
/// offending assignment, lookup or validation step returns one of these.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A field assignment whose runtime kind is not one of the declared kinds.
    #[error("{field} must be {}", describe_kinds(.expected))]
    TypeMismatch { field: String, expected: Vec<Kind> },

    /// A correctly-typed value rejected by the field's validator.
    #[error("{0}")]
    Invalid(String),

    /// A dynamically constructed object named a field its class does not declare.
    #[error("unknown field \"{field}\" for {class}{}", suggest(.suggestion))]
    UnknownField {
        class: &'static str,
        field: String,
        suggestion: Option<&'static str>,
    },

    /// Whole-tree validation found a missing collection, duplicate names or invalid contents.
    #[error("{0}")]
    Validation(String),

    #[error("duplicate keys found")]
    DuplicateKey,

    #[error("\"{0}\" is an invalid key")]
    KeyNotFound(String),

    #[error("object must have {0} attribute")]
    MissingKeyAttribute(String),

    #[error("key must be equal to '{0}' attribute")]
    KeyMismatch(String),

    #[error("index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A data adapter could not load its input.
    #[error("{0}")]
    Load(String),

    #[error("palette \"{0}\" not found")]
    PaletteNotFound(String),

    #[error("failed to access `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::Invalid(msg.into())
    }

    pub(crate) fn load(msg: impl Into<String>) -> Self {
        Error::Load(msg.into())
    }

    pub(crate) fn mismatch(field: impl Into<String>, expected: &[Kind]) -> Self {
        Error::TypeMismatch {
            field: field.into(),
            expected: expected.to_vec(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

fn describe_kinds(kinds: &[Kind]) -> String {
    match kinds {
        [single] => single.to_string(),
        many => {
            let names: Vec<String> = many.iter().map(ToString::to_string).collect();
            format!("one of ({})", names.join(", "))
        }
    }
}

fn suggest(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(name) => format!(", did you mean \"{name}\"?"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_names_every_expected_kind() {
        let single = Error::mismatch("width", &[Kind::Int]);
        assert_eq!(single.to_string(), "width must be int");

        let many = Error::mismatch("padding", &[Kind::Int, Kind::Map, Kind::Str]);
        assert_eq!(many.to_string(), "padding must be one of (int, dict, str)");

        let object = Error::mismatch("domain", &[Kind::List, Kind::Object("DataRef")]);
        assert_eq!(object.to_string(), "domain must be one of (list, DataRef)");
    }

    #[test]
    fn unknown_field_carries_suggestion() {
        let err = Error::UnknownField {
            class: "PropertySet",
            field: "fillopacity".to_owned(),
            suggestion: Some("fillOpacity"),
        };
        assert_eq!(
            err.to_string(),
            "unknown field \"fillopacity\" for PropertySet, did you mean \"fillOpacity\"?"
        );
    }
}
