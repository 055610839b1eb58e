pub mod oauth_server;
pub mod token_data;

pub use oauth_server::{authorize, AuthOptions};
pub use token_data::Session;

use thiserror::Error;

// Reddit OAuth2 endpoints for the authorization-code grant.
pub const AUTHORIZE_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// `identity` resolves the account name, `history` lists the account's posts
/// and comments, `edit` allows deleting them.
pub const OAUTH_SCOPES: &str = "identity history edit";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("failed to bind the OAuth callback listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out waiting for the OAuth callback")]
    Timeout,
    #[error("authorization was denied: {0}")]
    Denied(String),
    #[error("state parameter in the callback did not match the one we issued")]
    StateMismatch,
    #[error("callback did not contain an authorization code")]
    MissingCode,
    #[error("token exchange failed with HTTP {status}: {body}")]
    TokenExchange { status: u16, body: String },
    #[error("token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid redirect URI: {0}")]
    RedirectUri(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
