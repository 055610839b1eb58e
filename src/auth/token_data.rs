use serde::Deserialize;

/// Successful response from Reddit's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
    /// Present when `duration=permanent` was requested. This tool never
    /// refreshes: a run finishes well within the access token's lifetime.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// An authenticated handle bound to one account, valid for one program run.
/// Nothing is persisted; the token dies with the process.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
        }
    }
}
