use serde::Serialize;

use crate::db::User;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub birthday: String,
    pub address: String,
    pub username: String,
    pub profile_image: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            birthday: user.birthday,
            address: user.address,
            username: user.username,
            profile_image: user.profile_image,
        }
    }
}

/// Profile plus derived age for the result view. `age` is always present
/// in the JSON; `null` marks a birthday that did not parse.
#[derive(Debug, Serialize)]
pub struct AgeResultDto {
    pub user: UserDto,
    pub age: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub registered_users: u64,
}
