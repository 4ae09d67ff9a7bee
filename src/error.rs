use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Error type shared by every collector, the pair and the sequence adapter
#[derive(Debug, Clone)]
pub enum CollectError {
    /// A required input was not supplied
    InvalidArgument {
        context: String,
    },
    /// A key appeared twice in a reduction that forbids it
    DuplicateKey {
        key: String,
    },
    /// A slot of an empty pair was read directly
    NoSuchElement {
        context: String,
    },
    /// A caller-supplied error that is not a `CollectError`, kept as the source
    Wrapped {
        message: String,
        source: Arc<dyn Error + Send + Sync>,
    },
    /// Failure reported by a caller closure
    Failed {
        context: String,
    },
}

impl CollectError {
    pub fn invalid_argument(context: impl Into<String>) -> Self {
        CollectError::InvalidArgument { context: context.into() }
    }

    pub fn duplicate_key(key: impl fmt::Debug) -> Self {
        CollectError::DuplicateKey { key: format!("{:?}", key) }
    }

    pub fn no_such_element(context: impl Into<String>) -> Self {
        CollectError::NoSuchElement { context: context.into() }
    }

    pub fn failed(context: impl Into<String>) -> Self {
        CollectError::Failed { context: context.into() }
    }

    /// Turn any error into a `CollectError`.
    ///
    /// An error that already is a `CollectError` comes back untouched, anything else is wrapped
    /// with its message copied and the original kept as `source()`.
    pub fn from_caller<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(error);
        match boxed.downcast::<CollectError>() {
            Ok(own) => *own,
            Err(other) => CollectError::Wrapped {
                message: other.to_string(),
                source: Arc::from(other),
            },
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, CollectError::DuplicateKey { .. })
    }
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::InvalidArgument { context } => write!(f, "Invalid argument: {}", context),
            CollectError::DuplicateKey { key } => write!(f, "Duplicate key {}", key),
            CollectError::NoSuchElement { context } => write!(f, "{}", context),
            CollectError::Wrapped { message, .. } => write!(f, "{}", message),
            CollectError::Failed { context } => write!(f, "Collector failed: {}", context),
        }
    }
}

impl Error for CollectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CollectError::Wrapped { source, .. } => Some(source.as_ref() as &(dyn Error + 'static)),
            _ => None,
        }
    }
}

/// Result type alias for collector operations
pub type CollectResult<T> = Result<T, CollectError>;

/// Extension trait for functional error handling
pub trait ResultExt<T> {
    /// Replace the context of an error that carries one
    fn context(self, context: impl Into<String>) -> CollectResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<CollectError>,
{
    fn context(self, context: impl Into<String>) -> CollectResult<T> {
        self.map_err(|e| {
            let mut err = e.into();
            match &mut err {
                CollectError::InvalidArgument { context: ctx } => *ctx = context.into(),
                CollectError::NoSuchElement { context: ctx } => *ctx = context.into(),
                CollectError::Failed { context: ctx } => *ctx = context.into(),
                _ => {}
            }
            err
        })
    }
}
