//! This module contains the default exchanges.
//! Note that the fetch exchange requires the `default-exchanges` feature.

use crate::types::{Exchange, ExchangeResult, Operation};

mod cache;
mod dedup;
#[cfg(feature = "default-exchanges")]
mod fetch;

use crate::GraphQLQuery;
pub use cache::{CacheExchange, CacheExchangeImpl};
pub use dedup::{DedupError, DedupExchange, DedupExchangeImpl};
#[cfg(feature = "default-exchanges")]
pub use fetch::{FetchError, FetchExchange, FetchExchangeImpl};

#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("unexpected end of exchange chain")]
    UnexpectedEndOfChain
}

/// The terminating exchange.
/// This will always be the last exchange in the chain and will simply return an error if called.
pub struct TerminatorExchange;

#[async_trait]
impl Exchange for TerminatorExchange {
    async fn run<Q: GraphQLQuery>(
        &self,
        _operation: Operation<Q::Variables>
    ) -> ExchangeResult<Q::ResponseData> {
        Err(MiddlewareError::UnexpectedEndOfChain.into())
    }
}
