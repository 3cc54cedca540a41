use rollcall::{
    exchange::{OperationMeta, OperationType},
    GraphQLQuery, QueryBody
};

pub const OPERATION_NAME: &str = "GetUsers";
pub const QUERY: &str = "query GetUsers { users { id name email } }";

pub struct GetUsers;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Variables;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetUsersUsers {
    pub id: String,
    pub name: String,
    pub email: String
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    pub users: Vec<GetUsersUsers>
}

impl GraphQLQuery for GetUsers {
    type Variables = Variables;
    type ResponseData = ResponseData;

    fn build_query(variables: Self::Variables) -> (QueryBody<Self::Variables>, OperationMeta) {
        super::build(QUERY, OPERATION_NAME, OperationType::Query, variables)
    }
}
