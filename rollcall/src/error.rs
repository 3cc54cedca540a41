use crate::Error as GraphQLError;
use std::{error::Error, fmt, sync::Arc};

/// The error returned by every client operation.
///
/// It wraps whatever went wrong along the exchange chain and is cheap to clone, so one
/// failure can be handed to every listener of a deduplicated query.
#[derive(Clone, Debug)]
pub struct QueryError {
    inner: Arc<Box<dyn Error + Send + Sync>>
}

impl QueryError {
    pub fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }

    /// The concrete error, if it is an `E`.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl<T: Error + Send + Sync + 'static> From<T> for QueryError {
    fn from(e: T) -> Self {
        QueryError {
            inner: Arc::new(Box::new(e))
        }
    }
}

/// The server answered, but reported errors in the `errors` array.
///
/// Displays as the server messages joined by newlines.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", join_messages(.0))]
pub struct GraphQLErrors(pub Vec<GraphQLError>);

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
