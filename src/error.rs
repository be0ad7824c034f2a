use core::fmt;

use facet_core::Shape;
use facet_reflect::ReflectError;

/// An error raised while copying one struct into another.
///
/// When the failure is tied to a destination field, `field` names it.
#[derive(Debug)]
pub struct CopyError {
    /// Name of the destination field that could not be populated, if any.
    pub field: Option<&'static str>,

    /// What went wrong.
    pub kind: CopyErrorKind,
}

/// The different ways a copy can fail.
#[derive(Debug)]
#[non_exhaustive]
pub enum CopyErrorKind {
    /// The source value was `None` at the top level.
    NilSource,

    /// The source is not a struct.
    SourceNotStruct {
        /// The shape we were handed.
        got: &'static Shape,
    },

    /// The destination is not a struct.
    DestinationNotStruct {
        /// The shape we were handed.
        got: &'static Shape,
    },

    /// A forced field could not be coerced into the destination shape.
    TypeMismatch {
        /// Shape of the resolved source value.
        from: &'static Shape,
        /// Shape of the destination field.
        to: &'static Shape,
    },

    /// A value of this shape cannot be deep-copied.
    UnsupportedShape {
        /// The offending shape.
        got: &'static Shape,
    },

    /// Reflection refused to hand out the struct field at this index.
    FieldAccess {
        /// Index of the field in its struct.
        index: usize,
    },

    /// Error bubbled up from `facet-reflect`.
    Reflect(ReflectError),
}

impl CopyError {
    /// Creates an error that is not tied to a particular field.
    pub fn new(kind: CopyErrorKind) -> Self {
        Self { field: None, kind }
    }

    /// Attaches the destination field name, unless one is already set.
    pub fn in_field(mut self, field: &'static str) -> Self {
        self.field.get_or_insert(field);
        self
    }
}

impl From<CopyErrorKind> for CopyError {
    fn from(kind: CopyErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ReflectError> for CopyErrorKind {
    fn from(err: ReflectError) -> Self {
        CopyErrorKind::Reflect(err)
    }
}

impl From<ReflectError> for CopyError {
    fn from(err: ReflectError) -> Self {
        Self::new(CopyErrorKind::Reflect(err))
    }
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "field `{field}`: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl fmt::Display for CopyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyErrorKind::NilSource => write!(f, "source is None"),
            CopyErrorKind::SourceNotStruct { got } => {
                write!(f, "source must be a struct, got {got}")
            }
            CopyErrorKind::DestinationNotStruct { got } => {
                write!(f, "destination must be a struct, got {got}")
            }
            CopyErrorKind::TypeMismatch { from, to } => {
                write!(f, "cannot coerce {from} into {to}")
            }
            CopyErrorKind::UnsupportedShape { got } => {
                write!(f, "don't know how to copy a value of type {got}")
            }
            CopyErrorKind::FieldAccess { index } => {
                write!(f, "could not access struct field #{index}")
            }
            CopyErrorKind::Reflect(err) => write!(f, "reflection error: {err}"),
        }
    }
}

impl core::error::Error for CopyError {}
