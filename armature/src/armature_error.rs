use thiserror::Error;

/// Errors surfaced by the skinning core. All of these are deterministic
/// authoring or usage errors; nothing here is transient or retryable.
#[derive(Error, Debug)]
pub enum ArmatureError {
    /// A joint index was outside the skeleton's valid range
    #[error("joint index {index} is out of range (skeleton has {count} joints)")]
    JointIndexOutOfRange {
        /// The offending index
        index: usize,
        /// Number of joints in the skeleton
        count: usize,
    },
    /// A joint named a parent that has not been added to the skeleton yet
    #[error("joint \"{joint}\" references parent {parent}, which has not been added to the skeleton")]
    InvalidParent {
        /// Name of the joint being added
        joint: String,
        /// The parent index it referenced
        parent: usize,
    },
    /// A joint was constructed with a zero-length rotation axis
    #[error("joint \"{name}\" has a zero-length rotation axis")]
    DegenerateAxis {
        /// Name of the offending joint
        name: String,
    },
    /// A skin binding failed validation against the bound skeleton
    #[error("invalid skin binding at vertex {vertex}: {reason}")]
    InvalidBinding {
        /// Index of the first offending vertex
        vertex: usize,
        /// What was wrong with it
        reason: String,
    },
    /// A skinning operation was attempted before `set_skeleton`
    #[error("no skeleton bound; call set_skeleton first")]
    SkeletonNotBound,
    /// Two buffers that must describe the same vertices disagreed in length
    #[error("expected {expected} {what}, got {actual}")]
    CountMismatch {
        /// What was being counted
        what: &'static str,
        /// The required count
        expected: usize,
        /// The count actually supplied
        actual: usize,
    },
    /// A skinning mode string was neither "rigid" nor "linear"
    #[error("unknown skinning mode \"{0}\"")]
    UnknownSkinningMode(String),
    /// Anything else
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
