//! A GraphQL client with a query cache, built from composable exchanges.
//!
//! # Getting Started
//!
//! Describe each request document with a zero-sized type implementing [`GraphQLQuery`],
//! then build a client and run it:
//!
//! ```ignore
//! use rollcall::{Client, FieldPolicy};
//!
//! let client = Client::builder("http://localhost:4000/graphql")
//!     .with_field_policy("users", FieldPolicy::Replace)
//!     .with_default_exchanges()
//!     .build();
//!
//! let response = client.query(GetUsers, get_users::Variables).await?;
//! let users = response.into_data()?;
//! ```
//!
//! # Exchanges
//!
//! Exchanges are like a bi-directional middleware.
//! They act on both the incoming and outgoing operations,
//! passing them on if they can't return a result themselves.
//!
//! There are three default exchanges, called in this order:
//!
//! ## DedupExchange
//!
//! The deduplication exchange (`DedupExchange`) keeps track of in-flight queries and,
//! instead of firing off another identical query, waits for the result of the one already
//! running. Mutations are never deduplicated.
//!
//! ## CacheExchange
//!
//! The cache exchange stores query results in the client's [`Store`](store::Store), keyed by
//! query and variables. Writes are merged field by field according to the configured
//! [`FieldPolicy`]: list fields are concatenated unless a field is set to
//! [`FieldPolicy::Replace`]. After a successful mutation it runs the mutation's
//! [`CacheUpdate`] against the store, which is how callers keep cached lists in sync.
//!
//! ## FetchExchange
//!
//! The fetch exchange will serialize the operation, POST it to the endpoint and deserialize
//! the response using `reqwest`.
//! This should be your last exchange in the chain, as it never forwards an operation.
//!
//! # Features
//!
//! * `default-exchanges` **(default)** - Include the fetch exchange and the related builder
//! method. The cache and dedup exchanges have no extra dependencies and are always available.

#[macro_use]
extern crate serde;
#[macro_use]
extern crate async_trait;

use std::{collections::HashMap, fmt, fmt::Display};
use types::{OperationMeta, OperationType};

pub mod client;
pub mod default_exchanges;
mod error;
#[cfg(test)]
mod fixtures;
pub mod store;
pub(crate) mod types;
pub mod utils;

pub use client::{Client, ClientBuilder};
pub use error::{GraphQLErrors, QueryError};
use serde::{de::DeserializeOwned, Serialize};
pub use store::{FieldPolicy, QueryStore};
pub use types::{
    CacheUpdate, DebugInfo, Exchange, ExchangeFactory, QueryOptions, RequestPolicy, ResultSource
};

/// Types used by custom exchanges. Regular users probably don't need these.
pub mod exchange {
    pub use crate::types::{
        Exchange, ExchangeFactory, ExchangeResult, Operation, OperationMeta, OperationOptions,
        OperationResult, OperationType
    };
}

/// The form in which operations are sent over HTTP. This will be built using the
/// [GraphQLQuery](./trait.GraphQLQuery.html) trait normally.
#[derive(Debug, Serialize, Clone)]
pub struct QueryBody<Variables: Serialize + Send + Sync + Clone> {
    /// The values for the variables. They must match those declared in the document.
    pub variables: Variables,
    /// The GraphQL document, as a string.
    pub query: &'static str,
    /// The GraphQL operation name, as a string.
    #[serde(rename = "operationName")]
    pub operation_name: &'static str
}

/// A request document. Implemented on a zero-sized type per query or mutation,
/// with the variables and response shapes living in a companion module.
pub trait GraphQLQuery: Send + Sync + 'static {
    /// The shape of the variables expected by the document.
    type Variables: Serialize + Send + Sync + Clone + 'static;
    /// The top-level shape of the response data (the `data` field in the GraphQL response).
    type ResponseData: Serialize + DeserializeOwned + Send + Sync + Clone + 'static;

    /// Produce the serializable request body and the metadata exchanges key on.
    /// This must not have side effects.
    fn build_query(variables: Self::Variables) -> (QueryBody<Self::Variables>, OperationMeta);
}

/// The generic shape taken by the responses of GraphQL APIs.
///
/// [Spec](https://github.com/facebook/graphql/blob/master/spec/Section%207%20--%20Response.md)
///
/// ```
/// # use serde_json::json;
/// # use serde::Deserialize;
/// #
/// # #[derive(Debug, Deserialize, PartialEq, Clone)]
/// # struct User {
/// #     id: String,
/// # }
/// #
/// # #[derive(Debug, Deserialize, PartialEq, Clone)]
/// # struct ResponseData {
/// #     users: Vec<User>,
/// # }
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rollcall::Response;
///
/// let body: Response<ResponseData> = serde_json::from_value(json!({
///     "data": {
///         "users": [{"id": "13"}],
///     },
///     "errors": [],
/// }))?;
///
/// let expected: Response<ResponseData> = Response {
///     data: Some(ResponseData {
///         users: vec![User { id: "13".to_owned() }],
///     }),
///     errors: Some(vec![]),
///     debug_info: None
/// };
///
/// assert_eq!(body, expected);
///
/// #     Ok(())
/// # }
/// ```
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Response<Data: Clone> {
    /// Where the result came from and whether it was deduplicated
    #[serde(skip_deserializing, rename = "debugInfo")]
    pub debug_info: Option<DebugInfo>,
    /// The absent, partial or complete response data.
    pub data: Option<Data>,
    /// The top-level errors returned by the server.
    pub errors: Option<Vec<Error>>
}

impl<Data: Clone> Response<Data> {
    /// Split the response into its data or, if the server reported any errors, a
    /// [`QueryError`] wrapping [`GraphQLErrors`].
    ///
    /// An empty `errors` array counts as success.
    pub fn into_data(self) -> Result<Option<Data>, QueryError> {
        match self.errors {
            Some(errors) if !errors.is_empty() => Err(GraphQLErrors(errors).into()),
            _ => Ok(self.data)
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().map_or(false, |errors| !errors.is_empty())
    }
}

/// An element in the top-level `errors` array of a response body.
///
/// ```
/// # use serde_json::json;
/// # use serde::Deserialize;
/// #
/// # #[derive(Debug, Deserialize, PartialEq, Clone)]
/// # struct ResponseData {
/// #     something: i32
/// # }
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rollcall::*;
///
/// let body: Response<ResponseData> = serde_json::from_value(json!({
///     "data": null,
///     "errors": [
///         {
///             "message": "Seismic activity detected",
///             "path": ["users", 20]
///         },
///      ],
/// }))?;
///
/// let expected: Response<ResponseData> = Response {
///     data: None,
///     errors: Some(vec![
///         Error {
///             message: "Seismic activity detected".to_owned(),
///             locations: None,
///             path: Some(vec![
///                 PathFragment::Key("users".into()),
///                 PathFragment::Index(20),
///             ]),
///             extensions: None,
///         },
///     ]),
///     debug_info: None
/// };
///
/// assert_eq!(body, expected);
///
/// #     Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Error {
    /// The human-readable error message. This is the only required field.
    pub message: String,
    /// Which locations in the query the error applies to.
    pub locations: Option<Vec<Location>>,
    /// Which path in the query the error applies to, e.g. `["users", 0, "email"]`.
    pub path: Option<Vec<PathFragment>>,
    /// Additional errors. Their exact format is defined by the server.
    pub extensions: Option<HashMap<String, serde_json::Value>>
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use `/` as a separator like JSON Pointer.
        let path = self
            .path
            .as_ref()
            .map(|fragments| {
                fragments
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| "<query>".to_string());

        // Only the first location is reported.
        let loc = self
            .locations
            .as_ref()
            .and_then(|locations| locations.iter().next())
            .cloned()
            .unwrap_or_default();

        write!(f, "{}:{}:{}: {}", path, loc.line, loc.column, self.message)
    }
}

/// Part of a path in a query. It can be an object key or an array index. See [Error](./struct.Error.html).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PathFragment {
    /// A key inside an object
    Key(String),
    /// An index inside an array
    Index(i32)
}

/// Represents a location inside a query string. Used in errors. See [Error](./struct.Error.html).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// The line number in the query string where the error originated (starting from 1).
    pub line: i32,
    /// The column number in the query string where the error originated (starting from 1).
    pub column: i32
}

impl Display for PathFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathFragment::Key(ref key) => write!(f, "{}", key),
            PathFragment::Index(ref idx) => write!(f, "{}", idx)
        }
    }
}
