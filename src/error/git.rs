//! Git history errors

use super::{PinledgerError, impl_error_constructors};

impl_error_constructors!({
    GitOperationFailed as operation_failed(message),
    GitOpenFailed as open_failed(path, reason),
    GitRevisionNotFound as revision_not_found(revision, reason),
    ManifestNotInRevision as not_in_revision(revision, path),
    HistoryEmpty as history_empty(path),
});
