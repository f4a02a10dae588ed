//! Configuration errors

use super::{PinledgerError, impl_error_constructors};

impl_error_constructors!({
    ConfigReadFailed as read_failed(path, reason),
    ConfigParseFailed as parse_failed(path, reason),
    ConfigInvalid as invalid(message),
});
