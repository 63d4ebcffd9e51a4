//! Error types shared by every loader and by the frame graphs.
//!
//! Loading never stops at the first problem. Recoverable errors are
//! collected next to a partially populated value in [`Loaded`]; only a
//! fatal error (wrong element tag, unsupported version) short-circuits
//! through the `Err` side of [`Result`].

use std::fmt;

use thiserror::Error;

/// Discriminant for every error condition the loaders can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The element handed to a loader has the wrong tag.
    ElementIncorrectType,
    /// A child object failed to load cleanly.
    ElementInvalid,
    /// A required child element is absent.
    ElementMissing,
    /// A required attribute is absent.
    AttributeMissing,
    /// An attribute is present but its value is unusable.
    AttributeInvalid,
    /// A name is already taken in its scope.
    DuplicateName,
    /// A frame reference names nothing in reach.
    UnresolvedName,
    /// The attached-to graph contains a cycle.
    FrameAttachedToCycle,
    /// An attached-to chain ends somewhere other than a link or world.
    FrameAttachedToInvalid,
    /// The relative-to graph contains a cycle.
    PoseRelativeToCycle,
    /// A relative-to chain does not reach the root frame.
    PoseRelativeToInvalid,
    /// Two frames are not connected.
    NoPath,
    /// Mass or moments of inertia are not physically valid.
    LinkInertiaInvalid,
    /// The document file could not be read.
    FileRead,
    /// The document text could not be parsed.
    StringRead,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ElementIncorrectType => "ELEMENT_INCORRECT_TYPE",
            ErrorCode::ElementInvalid => "ELEMENT_INVALID",
            ErrorCode::ElementMissing => "ELEMENT_MISSING",
            ErrorCode::AttributeMissing => "ATTRIBUTE_MISSING",
            ErrorCode::AttributeInvalid => "ATTRIBUTE_INVALID",
            ErrorCode::DuplicateName => "DUPLICATE_NAME",
            ErrorCode::UnresolvedName => "UNRESOLVED_NAME",
            ErrorCode::FrameAttachedToCycle => "FRAME_ATTACHED_TO_CYCLE",
            ErrorCode::FrameAttachedToInvalid => "FRAME_ATTACHED_TO_INVALID",
            ErrorCode::PoseRelativeToCycle => "POSE_RELATIVE_TO_CYCLE",
            ErrorCode::PoseRelativeToInvalid => "POSE_RELATIVE_TO_INVALID",
            ErrorCode::NoPath => "NO_PATH",
            ErrorCode::LinkInertiaInvalid => "LINK_INERTIA_INVALID",
            ErrorCode::FileRead => "FILE_READ",
            ErrorCode::StringRead => "STRING_READ",
        };
        f.write_str(s)
    }
}

/// A single load or query error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a missing attribute error.
    pub fn attribute_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AttributeMissing, message)
    }

    /// Create an invalid attribute error.
    pub fn attribute_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AttributeInvalid, message)
    }

    /// Create an unresolved frame name error.
    pub fn unresolved(name: &str, scope: &str) -> Self {
        Self::new(
            ErrorCode::UnresolvedName,
            format!("frame name[{name}] does not exist in scope[{scope}] or its parent"),
        )
    }
}

/// Accumulated errors.
pub type Errors = Vec<Error>;

/// Result type for fallible single-error operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A loaded value together with the recoverable errors hit while loading it.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub errors: Errors,
}

impl<T> Loaded<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            errors: Errors::new(),
        }
    }

    pub fn with_errors(value: T, errors: Errors) -> Self {
        Self { value, errors }
    }

    /// True when no error was recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            value: f(self.value),
            errors: self.errors,
        }
    }

    /// Append the errors to `errors` and hand back the value.
    pub fn merge_into(self, errors: &mut Errors) -> T {
        errors.extend(self.errors);
        self.value
    }

    pub fn into_parts(self) -> (T, Errors) {
        (self.value, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_code_and_message() {
        let err = Error::unresolved("missing", "__model__");
        let text = err.to_string();
        assert!(text.starts_with("[UNRESOLVED_NAME]"));
        assert!(text.contains("missing"));
        assert!(text.contains("__model__"));
    }

    #[test]
    fn merge_into_appends_errors() {
        let mut errors = vec![Error::attribute_missing("first")];
        let loaded = Loaded::with_errors(7, vec![Error::attribute_invalid("second")]);
        assert!(!loaded.is_clean());
        let value = loaded.merge_into(&mut errors);
        assert_eq!(value, 7);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].code, ErrorCode::AttributeInvalid);
    }

    #[test]
    fn map_keeps_errors() {
        let loaded = Loaded::with_errors(2, vec![Error::attribute_missing("x")]).map(|v| v * 3);
        let (value, errors) = loaded.into_parts();
        assert_eq!(value, 6);
        assert_eq!(errors.len(), 1);
    }
}
