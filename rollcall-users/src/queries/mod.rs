//! The request documents for the users resource, one zero-sized type per document.
//!
//! Each type's companion module holds the document text, its variables and the shape of the
//! response data, the same layout generated query code uses.

pub mod create_user;
pub mod delete_user;
pub mod get_users;
pub mod update_user;

pub use create_user::CreateUser;
pub use delete_user::DeleteUser;
pub use get_users::GetUsers;
pub use update_user::UpdateUser;

use rollcall::{
    exchange::{OperationMeta, OperationType},
    utils::hash_query,
    QueryBody
};

fn build<V>(
    query: &'static str,
    operation_name: &'static str,
    operation_type: OperationType,
    variables: V
) -> (QueryBody<V>, OperationMeta)
where
    V: serde::Serialize + Send + Sync + Clone
{
    let meta = OperationMeta {
        query_key: hash_query(query),
        operation_type
    };
    let body = QueryBody {
        variables,
        query,
        operation_name
    };
    (body, meta)
}
