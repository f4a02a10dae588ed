//! Package reference and option override errors

use super::{PinledgerError, impl_error_constructors};

impl_error_constructors!({
    InvalidReference as invalid(input, reason),
    InvalidOption as invalid_option(input, reason),
});
