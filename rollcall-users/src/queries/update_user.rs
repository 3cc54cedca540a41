use rollcall::{
    exchange::{OperationMeta, OperationType},
    GraphQLQuery, QueryBody
};

pub const OPERATION_NAME: &str = "UpdateUser";
pub const QUERY: &str = "mutation UpdateUser($id: ID!, $input: UpdateUserInput!) { updateUser(id: $id, input: $input) { id name email } }";

pub struct UpdateUser;

/// The fields to change. Unset fields are left out of the request and keep their value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UpdateUserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Variables {
    pub id: String,
    pub input: UpdateUserInput
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserUpdateUser {
    pub id: String,
    pub name: String,
    pub email: String
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(rename = "updateUser")]
    pub update_user: Option<UpdateUserUpdateUser>
}

impl GraphQLQuery for UpdateUser {
    type Variables = Variables;
    type ResponseData = ResponseData;

    fn build_query(variables: Self::Variables) -> (QueryBody<Self::Variables>, OperationMeta) {
        super::build(QUERY, OPERATION_NAME, OperationType::Mutation, variables)
    }
}
