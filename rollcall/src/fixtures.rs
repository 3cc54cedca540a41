//! Request documents for the crate's own tests, laid out like the companion modules
//! callers write for their documents.

use crate::{
    exchange::{OperationMeta, OperationType},
    utils::hash_query,
    GraphQLQuery, QueryBody
};

pub struct GetTodos;
pub mod get_todos {
    pub const OPERATION_NAME: &str = "GetTodos";
    pub const QUERY: &str = "query GetTodos($list: String!) { todos(list: $list) { id title } }";

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct Todo {
        pub id: String,
        pub title: String
    }
    #[derive(Clone, Debug, PartialEq, Serialize)]
    pub struct Variables {
        pub list: String
    }
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct ResponseData {
        pub todos: Vec<Todo>
    }
}
impl GraphQLQuery for GetTodos {
    type Variables = get_todos::Variables;
    type ResponseData = get_todos::ResponseData;

    fn build_query(variables: Self::Variables) -> (QueryBody<Self::Variables>, OperationMeta) {
        let meta = OperationMeta {
            query_key: hash_query(get_todos::QUERY),
            operation_type: OperationType::Query
        };
        let body = QueryBody {
            variables,
            query: get_todos::QUERY,
            operation_name: get_todos::OPERATION_NAME
        };
        (body, meta)
    }
}

pub struct AddTodo;
pub mod add_todo {
    pub const OPERATION_NAME: &str = "AddTodo";
    pub const QUERY: &str = "mutation AddTodo($title: String!) { addTodo(title: $title) { id title } }";

    use super::get_todos::Todo;

    #[derive(Clone, Debug, PartialEq, Serialize)]
    pub struct Variables {
        pub title: String
    }
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct ResponseData {
        #[serde(rename = "addTodo")]
        pub add_todo: Option<Todo>
    }
}
impl GraphQLQuery for AddTodo {
    type Variables = add_todo::Variables;
    type ResponseData = add_todo::ResponseData;

    fn build_query(variables: Self::Variables) -> (QueryBody<Self::Variables>, OperationMeta) {
        let meta = OperationMeta {
            query_key: hash_query(add_todo::QUERY),
            operation_type: OperationType::Mutation
        };
        let body = QueryBody {
            variables,
            query: add_todo::QUERY,
            operation_name: add_todo::OPERATION_NAME
        };
        (body, meta)
    }
}
