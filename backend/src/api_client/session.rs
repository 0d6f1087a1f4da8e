use serde::{Deserialize, Serialize};

use crate::{auth_response::AuthResponse, user_get_response::UserGetResponse};

/// Tokens and profile held by a signed-in client. Passed explicitly to every
/// [`ApiClient`](crate::ApiClient) call; a refresh rewrites both tokens in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserGetResponse,
}

impl Session {
    pub(crate) fn update(&mut self, response: AuthResponse) {
        self.access_token = response.token;
        self.refresh_token = response.refresh_token;
        self.user = response.user;
    }
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            access_token: response.token,
            refresh_token: response.refresh_token,
            user: response.user,
        }
    }
}
