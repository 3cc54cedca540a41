//! Request documents and a reactive store for a GraphQL users resource.
//!
//! ```ignore
//! use rollcall_users::{user_store, Outcome, DEFAULT_ENDPOINT};
//!
//! let store = user_store(DEFAULT_ENDPOINT);
//! store.fetch_users().await;
//! if store.create_user("Ann", "ann@x.com").await == Outcome::Committed {
//!     println!("{:?}", store.users());
//! }
//! ```
//!
//! The [`UserStore`] keeps its own list and the client's cached `GetUsers` result in step
//! after every operation. Watch it with [`UserStore::subscribe`].

#[macro_use]
extern crate serde;

pub mod queries;
pub mod reconcile;
mod store;
mod user;

use rollcall::{Client, ClientBuilder, Exchange, FieldPolicy};

pub use store::{Outcome, UserListState, UserStore};
pub use user::User;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000/graphql";

/// A client with the default exchanges whose cache replaces the `users` list on every write
/// instead of concatenating it.
pub fn users_client<U: Into<String>>(url: U) -> Client<impl Exchange> {
    ClientBuilder::new(url)
        .with_field_policy("users", FieldPolicy::Replace)
        .with_default_exchanges()
        .build()
}

/// A [`UserStore`] on top of [`users_client`].
pub fn user_store<U: Into<String>>(url: U) -> UserStore<impl Exchange> {
    UserStore::new(users_client(url))
}
