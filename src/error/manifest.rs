//! Manifest parsing errors

use super::{PinledgerError, impl_error_constructors};

impl_error_constructors!({
    NoRecipeClass as no_recipe_class(origin),
    ManifestNotFound as not_found(path),
});

/// Creates a parse error at a source position
pub fn parse_failed(
    origin: impl Into<String>,
    line: usize,
    column: usize,
    reason: impl Into<String>,
) -> PinledgerError {
    PinledgerError::ManifestParse {
        origin: origin.into(),
        line,
        column,
        reason: reason.into(),
    }
}

/// Creates an invalid attribute error
pub fn invalid_attribute(
    origin: impl Into<String>,
    attribute: impl Into<String>,
    line: usize,
    reason: impl Into<String>,
) -> PinledgerError {
    PinledgerError::InvalidAttribute {
        origin: origin.into(),
        attribute: attribute.into(),
        line,
        reason: reason.into(),
    }
}
