#![forbid(unsafe_code)]

use crate::{error::PathResult, path::StorePath};

/// Backend-specific naming rules, checked before any key derivation or
/// backend call.
///
/// [`StorePath`](crate::StorePath) construction already enforces structure
/// (non-empty segments, no embedded separators). Everything beyond that —
/// length limits, character sets, reserved prefixes, container case rules —
/// differs per backend and is supplied by the backend integration as an
/// implementation of this trait.
pub trait PathValidator: Send + Sync + 'static {
    /// Validate `path` against the backend's naming rules.
    fn validate(&self, path: &StorePath) -> PathResult<()>;
}

/// Validator that accepts every structurally valid path.
///
/// The default when a connector is built without an explicit validator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpValidator;

impl PathValidator for NoOpValidator {
    fn validate(&self, _path: &StorePath) -> PathResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;

    struct MaxSegmentLength(usize);

    impl PathValidator for MaxSegmentLength {
        fn validate(&self, path: &StorePath) -> PathResult<()> {
            for segment in path.segments() {
                if segment.len() > self.0 {
                    return Err(PathError::InvalidSegment {
                        segment: segment.clone(),
                        reason: "segment exceeds backend length limit",
                    });
                }
            }
            Ok(())
        }
    }

    #[test]
    fn no_op_accepts_everything() {
        let path = StorePath::new("store", ["a", "b"]).unwrap();
        assert!(NoOpValidator.validate(&path).is_ok());
    }

    #[test]
    fn custom_rules_reject_before_derivation() {
        let validator = MaxSegmentLength(4);
        let ok = StorePath::new("store", ["abc"]).unwrap();
        let too_long = StorePath::new("store", ["abcdef"]).unwrap();

        assert!(validator.validate(&ok).is_ok());
        assert!(validator.validate(&too_long).is_err());
    }
}
