use crate::{store::QueryStore, GraphQLQuery, QueryBody, QueryError, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::{any::Any, fmt, sync::Arc};

pub type ExchangeResult<R> = Result<OperationResult<R>, QueryError>;

/// A link in the operation chain. Each exchange either resolves the operation itself or
/// forwards it to the next one.
#[async_trait]
pub trait Exchange: Send + Sync + 'static {
    async fn run<Q: GraphQLQuery>(
        &self,
        operation: Operation<Q::Variables>
    ) -> ExchangeResult<Q::ResponseData>;
}

pub trait ExchangeFactory<TNext: Exchange> {
    type Output: Exchange;

    fn build(self, next: TNext) -> Self::Output;
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum OperationType {
    Query,
    Mutation
}

/// How a query may use the cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestPolicy {
    /// Serve a cached result if there is one, otherwise hit the network.
    CacheFirst,
    /// Only ever serve from the cache.
    CacheOnly,
    /// Never read the cache. The result is still written to it.
    NetworkOnly,
    /// Behaves like `NetworkOnly` for one-shot requests.
    CacheAndNetwork
}

#[derive(Clone, Debug)]
pub struct OperationMeta {
    pub query_key: u32,
    pub operation_type: OperationType
}

#[derive(Clone)]
pub struct OperationOptions {
    pub url: String,
    pub request_policy: RequestPolicy,
    pub update: Option<CacheUpdate>
}

#[derive(Clone)]
pub struct Operation<V: Serialize + Clone + Send + Sync> {
    /// The hash of the query key and the variables. Cache and dedup key on this.
    pub key: u64,
    pub meta: OperationMeta,
    pub query: QueryBody<V>,
    pub options: OperationOptions
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum ResultSource {
    Cache,
    Network
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DebugInfo {
    pub source: ResultSource,
    #[serde(rename = "didDedup")]
    pub did_dedup: bool
}

#[derive(Clone, Debug)]
pub struct OperationResult<R: DeserializeOwned + Send + Sync + Clone> {
    pub key: u64,
    pub meta: OperationMeta,
    pub response: Response<R>
}

/// Per-request overrides of the client defaults.
#[derive(Default, Clone)]
pub struct QueryOptions {
    pub url: Option<String>,
    pub request_policy: Option<RequestPolicy>,
    /// Only used for mutations. See [`CacheUpdate`].
    pub update: Option<CacheUpdate>
}

type Updater = dyn Fn(&(dyn Any + Send + Sync), &QueryStore) -> Result<(), QueryError> + Send + Sync;

/// A custom updater run against the cache after a mutation succeeds, before the mutation
/// call returns. Use it to patch cached lists that the mutation affects.
///
/// # Example
///
/// ```ignore
/// let update = CacheUpdate::new::<CreateUser, _>(|data, cache| {
///     if let Some(created) = data.as_ref().and_then(|data| data.create_user.clone()) {
///         cache.update_query(GetUsers, get_users::Variables, |cached| {
///             let mut users = cached.map(|cached| cached.users).unwrap_or_default();
///             users.push(created.into());
///             Some(get_users::ResponseData { users })
///         })?;
///     }
///     Ok(())
/// });
/// ```
#[derive(Clone)]
pub struct CacheUpdate {
    updater: Arc<Updater>
}

impl CacheUpdate {
    /// Wrap a typed updater. The closure receives the mutation's response data and a handle to
    /// the client's cache.
    pub fn new<Q: GraphQLQuery, F>(update: F) -> Self
    where
        F: Fn(&Option<Q::ResponseData>, &QueryStore) -> Result<(), QueryError>
            + Send
            + Sync
            + 'static
    {
        let updater = move |data: &(dyn Any + Send + Sync), store: &QueryStore| {
            match data.downcast_ref::<Option<Q::ResponseData>>() {
                Some(data) => update(data, store),
                None => Err(UpdateTypeMismatch(std::any::type_name::<Q>()).into())
            }
        };
        Self {
            updater: Arc::new(updater)
        }
    }

    pub(crate) fn apply<R: Send + Sync + 'static>(
        &self,
        data: &Option<R>,
        store: &QueryStore
    ) -> Result<(), QueryError> {
        let data: &(dyn Any + Send + Sync) = data;
        (self.updater)(data, store)
    }
}

impl fmt::Debug for CacheUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheUpdate")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("cache update for {0} was run against a different operation")]
pub struct UpdateTypeMismatch(&'static str);
