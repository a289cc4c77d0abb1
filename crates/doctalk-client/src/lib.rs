pub mod api;
pub mod client;
pub mod constants;
pub mod conversation;
pub mod stream;
pub mod upload;

use api::ApiClient;

/// Auth state handed down from the embedding application. The token is an
/// opaque bearer credential; this crate forwards it per request and never
/// inspects or refreshes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub token: Option<String>,
}

impl AuthStatus {
    pub fn get_client(&self) -> ApiClient {
        ApiClient::new(self.token.clone(), None)
    }
}
