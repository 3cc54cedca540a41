use crate::{
    store::Store,
    types::{Operation, OperationMeta, OperationOptions},
    utils::progressive_hash,
    CacheUpdate, Exchange, GraphQLQuery, QueryBody, QueryError, QueryOptions, QueryStore,
    RequestPolicy, Response
};
use std::sync::Arc;
use tracing::debug;

pub struct ClientImpl<M: Exchange> {
    pub(crate) url: String,
    pub(crate) exchange: M,
    pub(crate) request_policy: RequestPolicy,
    pub(crate) store: Arc<Store>
}

impl<M: Exchange> ClientImpl<M> {
    pub(crate) async fn execute_request_operation<Q: GraphQLQuery>(
        &self,
        operation: Operation<Q::Variables>
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        debug!(
            operation = operation.query.operation_name,
            key = operation.key,
            "executing operation"
        );
        self.exchange
            .run::<Q>(operation)
            .await
            .map(|operation_result| operation_result.response)
    }

    pub async fn query<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        self.query_with_options(_query, variables, QueryOptions::default())
            .await
    }

    pub async fn query_with_options<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables,
        options: QueryOptions
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        let (query, meta) = Q::build_query(variables);
        let operation = self.create_request_operation::<Q>(query, meta, options)?;
        self.execute_request_operation::<Q>(operation).await
    }

    pub async fn mutate<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables,
        update: CacheUpdate
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        let options = QueryOptions {
            request_policy: Some(RequestPolicy::NetworkOnly),
            update: Some(update),
            ..QueryOptions::default()
        };
        self.query_with_options(_query, variables, options).await
    }

    pub fn cache(&self) -> QueryStore {
        self.store.clone().into()
    }

    pub(crate) fn create_request_operation<Q: GraphQLQuery>(
        &self,
        query: QueryBody<Q::Variables>,
        meta: OperationMeta,
        options: QueryOptions
    ) -> Result<Operation<Q::Variables>, QueryError> {
        let key = progressive_hash(meta.query_key, &query.variables)?;

        Ok(Operation {
            key,
            meta,
            query,
            options: OperationOptions {
                url: options.url.unwrap_or_else(|| self.url.clone()),
                request_policy: options.request_policy.unwrap_or(self.request_policy),
                update: options.update
            }
        })
    }
}
