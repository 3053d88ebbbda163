//! AWS SDK error classification
//!
//! Uses the error metadata `.code()` instead of string matching on the
//! Debug format, so "not found" detection survives SDK message changes.

use crate::error::ControlPlaneError;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};

/// Error codes that mean the resource does not exist.
const NOT_FOUND_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "NoSuchBucket",
    "NoSuchKey",
    "NotFound",
];

/// Whether an error code/message pair denotes an absent resource.
///
/// CloudFormation reports a missing stack as a `ValidationError` whose
/// message ends in "does not exist", so that combination is special-cased.
pub(crate) fn is_not_found_code(code: Option<&str>, message: Option<&str>) -> bool {
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code) => true,
        Some("ValidationError") => message.is_some_and(|m| m.contains("does not exist")),
        _ => false,
    }
}

/// Map an SDK operation error onto the control-plane taxonomy: absent
/// resources become `NotFound` for `kind`/`id`, everything else is `Api`.
pub(crate) fn classify<E, R>(kind: &'static str, id: &str, err: SdkError<E, R>) -> ControlPlaneError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let meta = ProvideErrorMetadata::meta(&err);
    if is_not_found_code(meta.code(), meta.message()) {
        ControlPlaneError::not_found(kind, id)
    } else {
        ControlPlaneError::Api(Box::new(err))
    }
}
