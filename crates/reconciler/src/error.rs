use std::fmt;

/// Failure reported by an [`OutputAdapter`](crate::OutputAdapter) backend.
#[derive(Debug)]
pub struct OutputError {
    op: &'static str,
    source: Box<dyn std::error::Error>,
}

impl OutputError {
    pub fn new(op: &'static str, source: impl Into<Box<dyn std::error::Error>>) -> Self {
        Self {
            op,
            source: source.into(),
        }
    }

    pub fn op(&self) -> &'static str {
        self.op
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output {} failed: {}", self.op, self.source)
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

#[derive(Debug)]
pub enum ReconcileError {
    /// The element's type is none of the recognized kinds (bad tag name).
    InvalidTag(String),
    /// Raised by component code: a render call or a lifecycle hook.
    Raised(String),
    /// A state update arrived while a render pass was already running.
    Reentrant { component: &'static str },
    /// A state update targeted a component that is no longer mounted.
    Unmounted { component: &'static str },
    /// A commit boundary rendered bare text, which has no node to swap.
    UnaddressableText,
    DepthExceeded { limit: usize },
    Output(OutputError),
}

impl ReconcileError {
    pub fn raised(message: impl Into<String>) -> Self {
        ReconcileError::Raised(message.into())
    }
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::InvalidTag(tag) => write!(f, "cannot classify element with tag {tag:?}"),
            ReconcileError::Raised(message) => f.write_str(message),
            ReconcileError::Reentrant { component } => {
                write!(f, "state update on {component} during an active render pass")
            }
            ReconcileError::Unmounted { component } => {
                write!(f, "state update on unmounted component {component}")
            }
            ReconcileError::UnaddressableText => {
                f.write_str("cannot commit bare text output in place of a node")
            }
            ReconcileError::DepthExceeded { limit } => {
                write!(f, "component tree deeper than {limit} levels")
            }
            ReconcileError::Output(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::Output(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OutputError> for ReconcileError {
    fn from(err: OutputError) -> Self {
        ReconcileError::Output(err)
    }
}
