use crate::condition::PropertyValue;
use thiserror::Error;

/// Errors that can occur while evaluating condition trees against bindings.
#[derive(Error, Debug, Clone)]
pub enum ConditionError {
    #[error(
        "Cannot compare {found} ({found_kind}) against {operand} ({operand_kind}): operand kinds must match"
    )]
    TypeMismatch {
        found: PropertyValue,
        found_kind: &'static str,
        operand: PropertyValue,
        operand_kind: &'static str,
    },

    #[error("Property '{0}' is not bound in the evaluation context")]
    UnboundProperty(String),

    #[error("State '{0}' is not bound in the evaluation context")]
    UnboundState(String),
}

/// Errors that can occur while parsing the condition language.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionParseError {
    #[error(
        "Invalid property name '{0}': names must start with a letter and contain only letters and digits"
    )]
    InvalidName(String),

    #[error("Unknown comparison '{comparison}' in condition term '{term}'")]
    UnknownComparison { comparison: String, term: String },

    #[error("Empty condition term in '{0}'")]
    EmptyTerm(String),

    #[error("Malformed condition term '{0}'")]
    Malformed(String),
}

/// Errors that can occur while parsing declarative source fragments (points,
/// path data, enum-valued attributes).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceParseError {
    #[error("Malformed point '{0}'")]
    Point(String),

    #[error("Malformed path data near '{0}'")]
    Path(String),

    #[error("Unknown edge kind '{0}'")]
    Edge(String),

    #[error("Unknown text alignment '{0}'")]
    Alignment(String),

    #[error("Unknown auto-rotate setting '{0}'")]
    AutoRotate(String),

    #[error("Malformed number '{0}'")]
    Number(String),
}

/// Errors that can occur during the flattening phase.
#[derive(Error, Debug, Clone)]
pub enum FlattenError {
    #[error("Offset template '${property}' refers to an undeclared property")]
    UnknownTemplateProperty { property: String },

    #[error(
        "Offset template '${property}' requires an enumerated property, but '{property}' declares no options"
    )]
    TemplateNotEnumerated { property: String },

    #[error("Enumerated option {value} of '${property}' cannot drive an offset: not a number")]
    TemplateOptionNotNumeric {
        property: String,
        value: PropertyValue,
    },
}

/// Errors raised while positioning connections for an instance.
#[derive(Error, Debug, Clone)]
pub enum LayoutError {
    #[error(transparent)]
    Flatten(#[from] FlattenError),

    #[error(transparent)]
    Condition(#[from] ConditionError),
}

/// Errors that can occur while encoding or decoding the binary artifact.
///
/// Every decode failure is whole-file: no partial contents are ever returned.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bad magic number: not a compiled component artifact")]
    BadMagic,

    #[error("Unsupported format version {0}")]
    UnsupportedVersion(u8),

    #[error("Artifact is truncated: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("Content hash does not match the header digest")]
    HashMismatch,

    #[error("Malformed {item} item: {message}")]
    MalformedItem { item: &'static str, message: String },

    #[error("Component payload could not be decoded: {0}")]
    Payload(String),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Errors raised by signer capabilities and key stores.
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Signing failed: {0}")]
    Signature(String),

    #[error("Key material for '{thumbprint}' could not be decoded: {message}")]
    BadKeyMaterial { thumbprint: String, message: String },

    #[error("Key store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
