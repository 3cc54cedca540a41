use crate::{
    store::Store,
    types::{ExchangeResult, Operation, OperationResult},
    DebugInfo, Exchange, ExchangeFactory, GraphQLQuery, OperationType, QueryError, QueryStore,
    RequestPolicy, Response, ResultSource
};
use std::sync::Arc;
use tracing::{debug, warn};

/// The default cache exchange.
///
/// Query results are written to the client's [`Store`], merged according to its field
/// policies. Mutations never read the cache; after a successful one, its
/// [`CacheUpdate`](crate::CacheUpdate) (if any) is run against the store.
pub struct CacheExchange {
    store: Arc<Store>
}

impl CacheExchange {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

impl<TNext: Exchange> ExchangeFactory<TNext> for CacheExchange {
    type Output = CacheExchangeImpl<TNext>;

    fn build(self, next: TNext) -> Self::Output {
        CacheExchangeImpl {
            store: self.store,
            next
        }
    }
}

pub struct CacheExchangeImpl<TNext: Exchange> {
    store: Arc<Store>,
    next: TNext
}

fn reads_cache<Q: GraphQLQuery>(operation: &Operation<Q::Variables>) -> bool {
    let request_policy = &operation.options.request_policy;
    request_policy == &RequestPolicy::CacheFirst || request_policy == &RequestPolicy::CacheOnly
}

impl<TNext: Exchange> CacheExchangeImpl<TNext> {
    fn cached_result<Q: GraphQLQuery>(
        &self,
        operation: &Operation<Q::Variables>
    ) -> Option<OperationResult<Q::ResponseData>> {
        let data = self.store.read::<Q>(operation.key);
        if data.is_none() && operation.options.request_policy != RequestPolicy::CacheOnly {
            return None;
        }

        Some(OperationResult {
            key: operation.key,
            meta: operation.meta.clone(),
            response: Response {
                debug_info: Some(DebugInfo {
                    source: ResultSource::Cache,
                    did_dedup: false
                }),
                data,
                errors: None
            }
        })
    }

    fn after_query<Q: GraphQLQuery>(
        &self,
        operation_result: OperationResult<Q::ResponseData>
    ) -> Result<OperationResult<Q::ResponseData>, QueryError> {
        if operation_result.response.has_errors() {
            return Ok(operation_result);
        }

        if let Some(ref data) = operation_result.response.data {
            self.store.write::<Q>(operation_result.key, data)?;
        }
        Ok(operation_result)
    }

    fn after_mutation<Q: GraphQLQuery>(
        &self,
        operation_result: &OperationResult<Q::ResponseData>,
        update: Option<crate::CacheUpdate>
    ) {
        if operation_result.response.has_errors() {
            return;
        }

        if let Some(update) = update {
            let store = QueryStore::from(self.store.clone());
            if let Err(e) = update.apply(&operation_result.response.data, &store) {
                warn!(key = operation_result.key, error = %e, "mutation cache update failed");
            }
        }
    }
}

#[async_trait]
impl<TNext: Exchange> Exchange for CacheExchangeImpl<TNext> {
    async fn run<Q: GraphQLQuery>(
        &self,
        operation: Operation<Q::Variables>
    ) -> ExchangeResult<Q::ResponseData> {
        match operation.meta.operation_type {
            OperationType::Mutation => {
                let update = operation.options.update.clone();
                let res = self.next.run::<Q>(operation).await?;
                self.after_mutation::<Q>(&res, update);
                Ok(res)
            }
            OperationType::Query => {
                if reads_cache::<Q>(&operation) {
                    if let Some(cached) = self.cached_result::<Q>(&operation) {
                        debug!(key = operation.key, "serving query from cache");
                        return Ok(cached);
                    }
                }
                let res = self.next.run::<Q>(operation).await?;
                self.after_query::<Q>(res)
            }
        }
    }
}
