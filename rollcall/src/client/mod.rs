use std::sync::Arc;

mod builder;
mod r#impl;

use crate::{
    default_exchanges::TerminatorExchange, CacheUpdate, Exchange, GraphQLQuery, QueryError,
    QueryOptions, QueryStore, Response
};
pub use builder::ClientBuilder;
pub use r#impl::ClientImpl;

/// A GraphQL client. Cheap to clone; clones share the exchange chain and the cache.
#[repr(transparent)]
pub struct Client<M: Exchange = TerminatorExchange>(pub Arc<ClientImpl<M>>);

impl<M: Exchange> Clone for Client<M> {
    fn clone(&self) -> Self {
        Client(self.0.clone())
    }
}

impl Client {
    pub fn builder<U: Into<String>>(url: U) -> ClientBuilder {
        ClientBuilder::new(url)
    }
}

impl<M: Exchange> Client<M> {
    /// Run a query with the client's default options.
    pub async fn query<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        self.0.query(_query, variables).await
    }

    pub async fn query_with_options<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables,
        options: QueryOptions
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        self.0.query_with_options(_query, variables, options).await
    }

    /// Send a mutation. It always goes to the network; once it succeeds, `update` runs against
    /// the cache before this returns.
    pub async fn mutate<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables,
        update: CacheUpdate
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        self.0.mutate(_query, variables, update).await
    }

    /// A handle to the client's cache.
    pub fn cache(&self) -> QueryStore {
        self.0.cache()
    }
}
