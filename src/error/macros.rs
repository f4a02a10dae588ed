//! Error constructor macros
//!
//! Each error domain module exposes small constructor functions so call sites
//! read as `fs::read_failed(path, e.to_string())` instead of spelling out the
//! variant with every field converted by hand.

/// Generate `impl Into<String>` constructor functions for string-only variants
///
/// # Example
/// ```rust,ignore
/// impl_error_constructors!({
///     ConfigInvalid as invalid(message),
/// });
/// ```
macro_rules! impl_error_constructors {
    ({ $($variant:ident as $fn_name:ident($($field:ident),* $(,)?)),* $(,)? }) => {
        $(
            #[doc = concat!("Creates a `", stringify!($variant), "` error")]
            #[allow(dead_code)]
            pub fn $fn_name($($field: impl Into<String>),*) -> PinledgerError {
                PinledgerError::$variant {
                    $($field: $field.into()),*
                }
            }
        )*
    };
}

pub(crate) use impl_error_constructors;
