use crate::{
    queries::{
        create_user, delete_user, get_users, get_users::GetUsersUsers, update_user, CreateUser,
        DeleteUser, GetUsers, UpdateUser
    },
    reconcile::Reconcile,
    User
};
use parking_lot::Mutex;
use rollcall::{
    CacheUpdate, Client, Exchange, FieldPolicy, QueryError, QueryOptions, RequestPolicy
};
use tokio::sync::watch;
use tracing::{debug, warn};

const FETCH_FAILED: &str = "Failed to load users";
const CREATE_FAILED: &str = "Failed to create user";
const DELETE_FAILED: &str = "Failed to delete user";
const UPDATE_FAILED: &str = "Failed to update user";

/// The reactive state published by a [`UserStore`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserListState {
    pub users: Vec<User>,
    /// True while at least one operation is in flight.
    pub loading: bool,
    /// The message of the last failed operation. Cleared whenever an operation starts.
    pub error: Option<String>
}

/// How a store operation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The result was applied to the cache and the local list.
    Committed,
    /// The server answered without the expected data, or refused a delete. Nothing changed.
    Empty,
    /// A fetch that resolved after a newer change had already been applied. It was dropped.
    Superseded,
    /// The request failed. The message is in [`UserListState::error`].
    Failed
}

#[derive(Debug, Default)]
struct Tickets {
    issued: u64,
    committed: u64,
    in_flight: usize
}

impl Tickets {
    fn commit(&mut self, ticket: u64) {
        self.committed = self.committed.max(ticket);
    }
}

/// Users list state kept in sync with the server and with the client's cached `GetUsers`
/// result.
///
/// Every operation takes a ticket when it starts. Mutation results always apply, since the
/// server has already made the change. A fetch only applies if no change with a newer ticket
/// has been applied before it; otherwise its result is dropped and the local list is written
/// back to the cache so both agree.
///
/// The store can be shared by reference between concurrently running operations.
pub struct UserStore<M: Exchange> {
    client: Client<M>,
    state: watch::Sender<UserListState>,
    tickets: Mutex<Tickets>
}

impl<M: Exchange> UserStore<M> {
    /// Wrap a client. The client's cache is switched to replace the `users` field on every
    /// write, since the store does its own list reconciliation.
    pub fn new(client: Client<M>) -> Self {
        client.cache().set_field_policy("users", FieldPolicy::Replace);
        let (state, _) = watch::channel(UserListState::default());
        UserStore {
            client,
            state,
            tickets: Mutex::new(Tickets::default())
        }
    }

    pub fn client(&self) -> &Client<M> {
        &self.client
    }

    /// A receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<UserListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UserListState {
        self.state.borrow().clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.state.borrow().users.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Load the full list from the server, bypassing cached data, and replace the local list
    /// with it.
    pub async fn fetch_users(&self) -> Outcome {
        let ticket = self.begin(get_users::OPERATION_NAME);
        let options = QueryOptions {
            request_policy: Some(RequestPolicy::NetworkOnly),
            ..QueryOptions::default()
        };
        let result = self
            .client
            .query_with_options(GetUsers, get_users::Variables, options)
            .await
            .and_then(|response| response.into_data())
            .map(|data| {
                data.map(|data| data.users.into_iter().map(User::from).collect::<Vec<_>>())
            });

        self.settle(
            ticket,
            get_users::OPERATION_NAME,
            FETCH_FAILED,
            result,
            |tickets, users, fetched| {
                if ticket > tickets.committed {
                    tickets.commit(ticket);
                    *users = fetched;
                    Outcome::Committed
                } else {
                    self.project(users);
                    Outcome::Superseded
                }
            }
        )
    }

    /// Create a user and append the server's copy to the end of the list.
    ///
    /// Ids stay unique: if the list already holds the new id, that entry is replaced where it
    /// is rather than appended again.
    pub async fn create_user<N, E>(&self, name: N, email: E) -> Outcome
    where
        N: Into<String>,
        E: Into<String>
    {
        let ticket = self.begin(create_user::OPERATION_NAME);
        let variables = create_user::Variables {
            name: name.into(),
            email: email.into()
        };
        let result = self
            .client
            .mutate(CreateUser, variables, append_created())
            .await
            .and_then(|response| response.into_data())
            .map(|data| data.and_then(|data| data.create_user).map(User::from));

        self.settle(
            ticket,
            create_user::OPERATION_NAME,
            CREATE_FAILED,
            result,
            |tickets, users, created| {
                tickets.commit(ticket);
                // A fetch that raced this mutation may already have delivered the new user, in
                // which case it is replaced in place instead of appended.
                users.upsert(created);
                Outcome::Committed
            }
        )
    }

    /// Set both the name and the email of a user.
    pub async fn update_user<I, N, E>(&self, id: I, name: N, email: E) -> Outcome
    where
        I: Into<String>,
        N: Into<String>,
        E: Into<String>
    {
        let input = update_user::UpdateUserInput {
            name: Some(name.into()),
            email: Some(email.into())
        };
        self.patch_user(id, input).await
    }

    /// Change only the fields set in `input`. The server's copy of the user replaces the
    /// local one whole. Ids missing from the list are ignored.
    pub async fn patch_user<I: Into<String>>(
        &self,
        id: I,
        input: update_user::UpdateUserInput
    ) -> Outcome {
        let ticket = self.begin(update_user::OPERATION_NAME);
        let variables = update_user::Variables {
            id: id.into(),
            input
        };
        let result = self
            .client
            .mutate(UpdateUser, variables, replace_updated())
            .await
            .and_then(|response| response.into_data())
            .map(|data| data.and_then(|data| data.update_user).map(User::from));

        self.settle(
            ticket,
            update_user::OPERATION_NAME,
            UPDATE_FAILED,
            result,
            |tickets, users, updated| {
                tickets.commit(ticket);
                if !users.replace(updated) {
                    debug!(ticket, "updated user is not in the local list");
                }
                Outcome::Committed
            }
        )
    }

    /// Delete a user. Deleting an id that isn't in the list leaves the list as it is.
    ///
    /// Only an explicit `false` from the server is a refusal; a `null` acknowledgement without
    /// errors removes the user.
    pub async fn delete_user<I: Into<String>>(&self, id: I) -> Outcome {
        let ticket = self.begin(delete_user::OPERATION_NAME);
        let id = id.into();
        let result = self
            .client
            .mutate(
                DeleteUser,
                delete_user::Variables { id: id.clone() },
                remove_deleted(id.clone())
            )
            .await
            .and_then(|response| response.into_data())
            .map(|data| data.filter(|data| !refused(data)).map(|_| ()));

        self.settle(
            ticket,
            delete_user::OPERATION_NAME,
            DELETE_FAILED,
            result,
            |tickets, users, _| {
                tickets.commit(ticket);
                users.remove_key(&id);
                Outcome::Committed
            }
        )
    }

    fn begin(&self, operation: &'static str) -> u64 {
        let mut tickets = self.tickets.lock();
        tickets.issued += 1;
        tickets.in_flight += 1;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
        debug!(operation, ticket = tickets.issued, "operation started");
        tickets.issued
    }

    /// End an operation: apply its result, record its failure and recompute `loading`. The
    /// ticket lock is held throughout so a stale result can't slip in between the check and
    /// the publish.
    fn settle<T, F>(
        &self,
        ticket: u64,
        operation: &'static str,
        fallback: &'static str,
        result: Result<Option<T>, QueryError>,
        commit: F
    ) -> Outcome
    where
        F: FnOnce(&mut Tickets, &mut Vec<User>, T) -> Outcome
    {
        let mut tickets = self.tickets.lock();
        tickets.in_flight = tickets.in_flight.saturating_sub(1);
        let loading = tickets.in_flight > 0;

        let mut outcome = Outcome::Empty;
        self.state.send_modify(|state| {
            state.loading = loading;
            outcome = match result {
                Ok(Some(data)) => commit(&mut tickets, &mut state.users, data),
                Ok(None) => Outcome::Empty,
                Err(e) => {
                    let message = error_message(&e, fallback);
                    warn!(operation, ticket, error = %message, "operation failed");
                    state.error = Some(message);
                    Outcome::Failed
                }
            };
        });

        debug!(operation, ticket, ?outcome, in_flight = tickets.in_flight, "operation settled");
        outcome
    }

    /// Overwrite the cached `GetUsers` result with the local list.
    fn project(&self, users: &[User]) {
        let data = get_users::ResponseData {
            users: users.iter().cloned().map(GetUsersUsers::from).collect()
        };
        if let Err(e) = self
            .client
            .cache()
            .write_query(GetUsers, &get_users::Variables, data)
        {
            warn!(error = %e, "failed to write users back to the cache");
        }
    }
}

fn error_message(error: &QueryError, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

fn append_created() -> CacheUpdate {
    CacheUpdate::new::<CreateUser, _>(|data, cache| {
        let created = match data.as_ref().and_then(|data| data.create_user.clone()) {
            Some(created) => GetUsersUsers::from(User::from(created)),
            None => return Ok(())
        };
        cache.update_query(GetUsers, get_users::Variables, move |cached| {
            let mut users = cached.map(|cached| cached.users).unwrap_or_default();
            // Appends unless the cached list already has this id.
            users.upsert(created);
            Some(get_users::ResponseData { users })
        })
    })
}

fn replace_updated() -> CacheUpdate {
    CacheUpdate::new::<UpdateUser, _>(|data, cache| {
        let updated = match data.as_ref().and_then(|data| data.update_user.clone()) {
            Some(updated) => GetUsersUsers::from(User::from(updated)),
            None => return Ok(())
        };
        cache.update_query(GetUsers, get_users::Variables, move |cached| {
            let mut cached = cached?;
            if cached.users.replace(updated) {
                Some(cached)
            } else {
                None
            }
        })
    })
}

fn refused(data: &delete_user::ResponseData) -> bool {
    data.delete_user == Some(false)
}

fn remove_deleted(id: String) -> CacheUpdate {
    CacheUpdate::new::<DeleteUser, _>(move |data, cache| {
        match data {
            Some(data) if !refused(data) => {}
            _ => return Ok(())
        }
        let id = id.clone();
        cache.update_query(GetUsers, get_users::Variables, move |cached| {
            let mut cached = cached?;
            if cached.users.remove_key(&id) {
                Some(cached)
            } else {
                None
            }
        })
    })
}
