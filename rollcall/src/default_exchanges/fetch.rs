use crate::{
    types::{ExchangeResult, Operation, OperationResult},
    DebugInfo, Exchange, ExchangeFactory, GraphQLQuery, QueryBody, Response, ResultSource
};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetch error: {0}")]
    NetworkError(#[source] reqwest::Error),
    #[error("server returned error code: {status}\n{body}")]
    NotOk { status: u16, body: String },
    #[error("decoding error: {0}")]
    DecodeError(#[source] serde_json::Error)
}

/// The default fetch exchange
///
/// POSTs the operation as JSON using `reqwest`. It never forwards an operation, so it must be
/// the first exchange added to the chain.
pub struct FetchExchange;

pub struct FetchExchangeImpl {
    http: reqwest::Client
}

impl<TNext: Exchange> ExchangeFactory<TNext> for FetchExchange {
    type Output = FetchExchangeImpl;

    fn build(self, _next: TNext) -> Self::Output {
        FetchExchangeImpl {
            http: reqwest::Client::new()
        }
    }
}

impl FetchExchangeImpl {
    async fn fetch<Q: GraphQLQuery>(
        &self,
        url: &str,
        query: &QueryBody<Q::Variables>
    ) -> Result<Response<Q::ResponseData>, FetchError> {
        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(query)
            .send()
            .await
            .map_err(FetchError::NetworkError)?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::NetworkError)?;

        // GraphQL servers often answer validation failures with a 4xx and a regular body. Any
        // other non-success reply is an error, even if its body happens to be a JSON object.
        let parsed = serde_json::from_str::<Response<Q::ResponseData>>(&body);
        match parsed {
            Ok(response) if status.is_success() || response.has_errors() => Ok(response),
            Err(e) if status.is_success() => Err(FetchError::DecodeError(e)),
            _ => Err(FetchError::NotOk {
                status: status.as_u16(),
                body
            })
        }
    }
}

#[async_trait]
impl Exchange for FetchExchangeImpl {
    async fn run<Q: GraphQLQuery>(
        &self,
        operation: Operation<Q::Variables>
    ) -> ExchangeResult<Q::ResponseData> {
        debug!(
            url = %operation.options.url,
            operation = operation.query.operation_name,
            "sending request"
        );

        let mut response = self
            .fetch::<Q>(&operation.options.url, &operation.query)
            .await
            .map_err(|e| {
                warn!(operation = operation.query.operation_name, error = %e, "request failed");
                e
            })?;

        response.debug_info = Some(DebugInfo {
            source: ResultSource::Network,
            did_dedup: false
        });

        Ok(OperationResult {
            key: operation.key,
            meta: operation.meta,
            response
        })
    }
}
