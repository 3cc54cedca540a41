#[cfg(feature = "default-exchanges")]
use crate::default_exchanges::{DedupExchange, FetchExchange};
use crate::{
    client::ClientImpl,
    default_exchanges::{CacheExchange, CacheExchangeImpl, TerminatorExchange},
    store::Store,
    Client, Exchange, ExchangeFactory, FieldPolicy, RequestPolicy
};
use std::sync::Arc;

pub struct ClientBuilder<M: Exchange = TerminatorExchange> {
    exchange: M,
    url: String,
    request_policy: RequestPolicy,
    store: Arc<Store>
}

impl ClientBuilder<TerminatorExchange> {
    pub fn new<U: Into<String>>(url: U) -> Self {
        ClientBuilder {
            exchange: TerminatorExchange,
            url: url.into(),
            request_policy: RequestPolicy::CacheFirst,
            store: Arc::new(Store::new())
        }
    }
}

impl<M: Exchange> ClientBuilder<M> {
    /// Add the default exchanges to the chain. Keep in mind that exchanges are executed bottom to top, so the first one added will be the last one executed.
    #[cfg(feature = "default-exchanges")]
    pub fn with_default_exchanges(self) -> ClientBuilder<impl Exchange> {
        self.with_exchange(FetchExchange)
            .with_cache_exchange()
            .with_exchange(DedupExchange)
    }

    /// Add an exchange to the chain. Keep in mind that exchanges are executed bottom to top, so the first one added will be the last one executed.
    pub fn with_exchange<F>(self, exchange_factory: F) -> ClientBuilder<F::Output>
    where
        F: ExchangeFactory<M>
    {
        let exchange = exchange_factory.build(self.exchange);
        ClientBuilder {
            exchange,
            url: self.url,
            request_policy: self.request_policy,
            store: self.store
        }
    }

    /// Add a cache exchange backed by this client's cache.
    pub fn with_cache_exchange(self) -> ClientBuilder<CacheExchangeImpl<M>> {
        let cache = CacheExchange::new(self.store.clone());
        self.with_exchange(cache)
    }

    pub fn with_request_policy(mut self, request_policy: RequestPolicy) -> Self {
        self.request_policy = request_policy;
        self
    }

    /// Set how writes to the top-level field `field` are merged into cached results.
    pub fn with_field_policy<F: Into<String>>(self, field: F, policy: FieldPolicy) -> Self {
        self.store.set_field_policy(field, policy);
        self
    }

    pub fn build(self) -> Client<M> {
        let client = ClientImpl {
            url: self.url,
            exchange: self.exchange,
            request_policy: self.request_policy,
            store: self.store
        };

        Client(Arc::new(client))
    }
}
