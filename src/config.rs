use thiserror::Error;
use url::Url;

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080";

const CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";
const USER_AGENT_VAR: &str = "REDDIT_USER_AGENT";
const REDIRECT_URI_VAR: &str = "REDDIT_REDIRECT_URI";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),
    #[error("{var} is not a valid URL: {source}")]
    InvalidRedirectUri {
        var: &'static str,
        source: url::ParseError,
    },
    #[error("{var} must include a host, e.g. http://localhost:8080")]
    RedirectUriMissingHost { var: &'static str },
}

/// Reddit app credentials, loaded once at startup and read-only afterwards.
///
/// `redirect_uri` is kept as the raw configured string: Reddit compares it
/// byte-for-byte against the URI registered on the app, so it must not be
/// normalized on the way through.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub redirect_uri: String,
}

impl Credentials {
    /// Reads credentials from the environment. Call after `dotenvy::dotenv()`
    /// so a local `.env` file is picked up too.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |var: &str| match lookup(var).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                missing.push(var.to_string());
                String::new()
            }
        };

        let client_id = required(CLIENT_ID_VAR);
        let client_secret = required(CLIENT_SECRET_VAR);
        let user_agent = required(USER_AGENT_VAR);

        // Report every missing variable in one go before touching the network.
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let redirect_uri = lookup(REDIRECT_URI_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        let parsed = Url::parse(&redirect_uri).map_err(|source| {
            ConfigError::InvalidRedirectUri {
                var: REDIRECT_URI_VAR,
                source,
            }
        })?;
        if parsed.host_str().is_none() {
            return Err(ConfigError::RedirectUriMissingHost {
                var: REDIRECT_URI_VAR,
            });
        }

        Ok(Self {
            client_id,
            client_secret,
            user_agent,
            redirect_uri,
        })
    }
}
