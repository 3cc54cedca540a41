#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rollcall::{
    default_exchanges::DedupExchange,
    exchange::{ExchangeResult, Operation, OperationResult},
    Client, ClientBuilder, DebugInfo, Exchange, ExchangeFactory, GraphQLQuery, Response,
    ResultSource
};
use rollcall_users::User;
use serde_json::{json, Value};
use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::Arc,
    time::Duration
};

pub enum Reply {
    /// The `data` field of a successful response.
    Data(Value),
    /// A response carrying these messages in its `errors` array.
    Errors(Vec<&'static str>),
    /// The request never got a response.
    Transport(&'static str)
}

struct Step {
    delay: Duration,
    reply: Reply
}

#[derive(Debug)]
pub struct TransportError(String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// Stands in for the fetch exchange. Replies are queued per operation name and handed out in
/// order; every request is recorded.
#[derive(Clone, Default)]
pub struct ScriptedServer {
    steps: Arc<Mutex<HashMap<&'static str, VecDeque<Step>>>>,
    requests: Arc<Mutex<Vec<(String, Value)>>>
}

impl ScriptedServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, operation: &'static str, reply: Reply) -> &Self {
        self.reply_after(operation, Duration::from_millis(0), reply)
    }

    pub fn reply_after(&self, operation: &'static str, delay: Duration, reply: Reply) -> &Self {
        self.steps
            .lock()
            .entry(operation)
            .or_default()
            .push_back(Step { delay, reply });
        self
    }

    /// Operation names in the order they were sent.
    pub fn operations(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn variables(&self, index: usize) -> Value {
        self.requests.lock()[index].1.clone()
    }

    /// A client with the regular exchange chain, ending in this server.
    pub fn client(&self) -> Client<impl Exchange> {
        ClientBuilder::new("http://localhost:4000/graphql")
            .with_exchange(self.clone())
            .with_cache_exchange()
            .with_exchange(DedupExchange)
            .build()
    }
}

impl<TNext: Exchange> ExchangeFactory<TNext> for ScriptedServer {
    type Output = ScriptedServer;

    fn build(self, _next: TNext) -> ScriptedServer {
        self
    }
}

#[async_trait]
impl Exchange for ScriptedServer {
    async fn run<Q: GraphQLQuery>(
        &self,
        operation: Operation<Q::Variables>
    ) -> ExchangeResult<Q::ResponseData> {
        let name = operation.query.operation_name;
        let variables = serde_json::to_value(&operation.query.variables).unwrap();
        self.requests.lock().push((name.to_string(), variables));

        let step = self
            .steps
            .lock()
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("no reply scripted for {}", name));
        if step.delay > Duration::from_millis(0) {
            tokio::time::sleep(step.delay).await;
        }

        let body = match step.reply {
            Reply::Data(data) => json!({ "data": data }),
            Reply::Errors(messages) => json!({
                "data": null,
                "errors": messages
                    .iter()
                    .map(|message| json!({ "message": message }))
                    .collect::<Vec<_>>()
            }),
            Reply::Transport(message) => return Err(TransportError(message.to_string()).into())
        };
        let mut response: Response<Q::ResponseData> = serde_json::from_value(body).unwrap();
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

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@x.com", name.to_lowercase().replace(' ', ""))
    }
}

pub fn users_data(users: &[User]) -> Reply {
    Reply::Data(json!({ "users": users }))
}

pub fn created(user: &User) -> Reply {
    Reply::Data(json!({ "createUser": user }))
}

pub fn updated(user: &User) -> Reply {
    Reply::Data(json!({ "updateUser": user }))
}

pub fn deleted(acknowledged: Option<bool>) -> Reply {
    Reply::Data(json!({ "deleteUser": acknowledged }))
}
