use crate::{
    types::{ExchangeResult, Operation, OperationResult},
    Exchange, ExchangeFactory, GraphQLQuery, OperationType, QueryError
};
use futures::channel::{oneshot, oneshot::Sender};
use parking_lot::Mutex;
use std::{any::Any, collections::HashMap, sync::Arc};
use tracing::debug;

type InFlightCache = Arc<Mutex<HashMap<u64, Vec<Sender<Result<Box<dyn Any + Send>, QueryError>>>>>>;

/// The default deduplication exchange.
///
/// This will keep track of in-flight queries and catch any identical queries before they execute,
/// instead waiting for the result from the in-flight query. Mutations always pass through.
pub struct DedupExchange;
pub struct DedupExchangeImpl<TNext: Exchange> {
    next: TNext,
    in_flight_operations: InFlightCache
}

impl<TNext: Exchange> ExchangeFactory<TNext> for DedupExchange {
    type Output = DedupExchangeImpl<TNext>;

    fn build(self, next: TNext) -> Self::Output {
        DedupExchangeImpl {
            next,
            in_flight_operations: InFlightCache::default()
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DedupError {
    #[error("the in-flight query this one was waiting on went away")]
    Cancelled,
    #[error("the in-flight query returned a result of a different type")]
    TypeMismatch
}

fn should_skip<Q: GraphQLQuery>(operation: &Operation<Q::Variables>) -> bool {
    operation.meta.operation_type != OperationType::Query
}

fn make_deduped_result<Q: GraphQLQuery>(
    res: &ExchangeResult<Q::ResponseData>
) -> Result<Box<dyn Any + Send>, QueryError> {
    match res {
        Ok(ref res) => {
            let mut res = res.clone();
            if let Some(ref mut debug_info) = res.response.debug_info {
                debug_info.did_dedup = true;
            }
            Ok(Box::new(res))
        }
        Err(e) => Err(e.clone())
    }
}

impl<TNext: Exchange> DedupExchangeImpl<TNext> {
    fn notify_listeners<Q: GraphQLQuery>(&self, key: u64, res: &ExchangeResult<Q::ResponseData>) {
        let to_be_notified = self
            .in_flight_operations
            .lock()
            .remove(&key)
            .unwrap_or_default();
        for sender in to_be_notified {
            // A listener that stopped waiting is fine to skip.
            let _ = sender.send(make_deduped_result::<Q>(res));
        }
    }
}

#[async_trait]
impl<TNext: Exchange> Exchange for DedupExchangeImpl<TNext> {
    async fn run<Q: GraphQLQuery>(
        &self,
        operation: Operation<Q::Variables>
    ) -> ExchangeResult<Q::ResponseData> {
        if should_skip::<Q>(&operation) {
            return self.next.run::<Q>(operation).await;
        }

        let key = operation.key;
        let rcv = {
            let mut cache = self.in_flight_operations.lock();
            if let Some(listeners) = cache.get_mut(&key) {
                let (sender, receiver) = oneshot::channel();
                listeners.push(sender);
                Some(receiver)
            } else {
                cache.insert(key, Vec::new());
                None
            }
        };

        if let Some(rcv) = rcv {
            debug!(key, "joining in-flight query");
            let res = rcv.await.map_err(|_| DedupError::Cancelled)??;
            let res = res
                .downcast::<OperationResult<Q::ResponseData>>()
                .map_err(|_| DedupError::TypeMismatch)?;
            Ok(*res)
        } else {
            let res = self.next.run::<Q>(operation).await;
            self.notify_listeners::<Q>(key, &res);
            res
        }
    }
}
