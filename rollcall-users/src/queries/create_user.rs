use rollcall::{
    exchange::{OperationMeta, OperationType},
    GraphQLQuery, QueryBody
};

pub const OPERATION_NAME: &str = "CreateUser";
pub const QUERY: &str = "mutation CreateUser($name: String!, $email: String!) { createUser(input: { name: $name, email: $email }) { id name email } }";

pub struct CreateUser;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Variables {
    pub name: String,
    pub email: String
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateUserCreateUser {
    pub id: String,
    pub name: String,
    pub email: String
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(rename = "createUser")]
    pub create_user: Option<CreateUserCreateUser>
}

impl GraphQLQuery for CreateUser {
    type Variables = Variables;
    type ResponseData = ResponseData;

    fn build_query(variables: Self::Variables) -> (QueryBody<Self::Variables>, OperationMeta) {
        super::build(QUERY, OPERATION_NAME, OperationType::Mutation, variables)
    }
}
