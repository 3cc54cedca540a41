use rollcall::{
    exchange::{OperationMeta, OperationType},
    GraphQLQuery, QueryBody
};

pub const OPERATION_NAME: &str = "DeleteUser";
pub const QUERY: &str = "mutation DeleteUser($id: ID!) { deleteUser(id: $id) }";

pub struct DeleteUser;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Variables {
    pub id: String
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Whether the server removed the user. `null` when it couldn't say.
    #[serde(rename = "deleteUser")]
    pub delete_user: Option<bool>
}

impl GraphQLQuery for DeleteUser {
    type Variables = Variables;
    type ResponseData = ResponseData;

    fn build_query(variables: Self::Variables) -> (QueryBody<Self::Variables>, OperationMeta) {
        super::build(QUERY, OPERATION_NAME, OperationType::Mutation, variables)
    }
}
