//! Pin lock errors

use super::{PinledgerError, impl_error_constructors};

impl_error_constructors!({
    LockOutdated as outdated(reason),
    LockMissing as missing(path),
    LockParseFailed as parse_failed(path, reason),
});
