use crate::queries::{
    create_user::CreateUserCreateUser, get_users::GetUsersUsers, update_user::UpdateUserUpdateUser
};

/// A user as held by the [`UserStore`](crate::UserStore).
///
/// Every response type converts into this, so the store never hands out data shared with the
/// client's cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the server and never changed afterwards.
    pub id: String,
    pub name: String,
    pub email: String
}

macro_rules! impl_user_conversions {
    ($($response:ty),*) => {
        $(
            impl From<$response> for User {
                fn from(user: $response) -> Self {
                    User {
                        id: user.id,
                        name: user.name,
                        email: user.email
                    }
                }
            }

            impl From<User> for $response {
                fn from(user: User) -> Self {
                    Self {
                        id: user.id,
                        name: user.name,
                        email: user.email
                    }
                }
            }
        )*
    };
}

impl_user_conversions!(GetUsersUsers, CreateUserCreateUser, UpdateUserUpdateUser);
