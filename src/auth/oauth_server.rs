use std::io;
use std::time::Duration;

use base64::{engine::general_purpose, Engine};
use tiny_http::{Header, Request, Response, Server};
use url::Url;

use crate::auth::token_data::{Session, TokenResponse};
use crate::auth::{AuthError, AUTHORIZE_URL, OAUTH_SCOPES, TOKEN_URL};
use crate::config::Credentials;

const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub open_browser: bool,
    pub callback_timeout: Duration,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            open_browser: true,
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        }
    }
}

/// Runs the OAuth2 authorization-code flow: opens the consent page in the
/// user's browser, waits for the single redirect request on a local listener,
/// validates the anti-CSRF state, then exchanges the code for an access
/// token. The listener only lives for the duration of this call.
pub fn authorize(credentials: &Credentials, opts: &AuthOptions) -> Result<Session, AuthError> {
    let state = generate_state();
    let auth_url = build_authorize_url(credentials, &state)?;

    // Bind before opening the browser so the redirect can never race us.
    let addr = callback_addr(&credentials.redirect_uri)?;
    let server = Server::http(&addr).map_err(|e| AuthError::Bind {
        addr: addr.clone(),
        source: io::Error::new(io::ErrorKind::AddrInUse, e),
    })?;

    println!("\nPlease authorize the application:\n\n{}\n", auth_url);
    if opts.open_browser {
        if let Err(e) = webbrowser::open(auth_url.as_str()) {
            log::warn!("Failed to open browser: {}", e);
            println!("Could not open a browser automatically; copy the URL above into one manually.");
        }
    }

    log::info!("Waiting for authorization on http://{}...", addr);
    let request = server
        .recv_timeout(opts.callback_timeout)?
        .ok_or(AuthError::Timeout)?;

    let params = parse_callback(request.url());
    let code = match validate_callback(&params, &state) {
        Ok(code) => {
            respond_html(request, success_page());
            code
        }
        Err(err) => {
            respond_html(request, failure_page(&err));
            return Err(err);
        }
    };

    // The single expected request has been served; release the port before
    // going back out to the network.
    drop(server);

    let token = exchange_code(credentials, &code)?;
    log::debug!(
        "Obtained {} token, valid {}s, scopes: {}",
        token.token_type,
        token.expires_in,
        token.scope
    );
    Ok(Session::from(token))
}

fn generate_state() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn build_authorize_url(credentials: &Credentials, state: &str) -> Result<Url, AuthError> {
    let mut auth_url = Url::parse(AUTHORIZE_URL)?;

    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &credentials.client_id)
        .append_pair("response_type", "code")
        .append_pair("state", state)
        .append_pair("redirect_uri", &credentials.redirect_uri)
        .append_pair("duration", "permanent")
        .append_pair("scope", OAUTH_SCOPES);

    Ok(auth_url)
}

fn callback_addr(redirect_uri: &str) -> Result<String, AuthError> {
    let parsed = Url::parse(redirect_uri)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AuthError::RedirectUri("missing host".to_string()))?
        .to_string();
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| AuthError::RedirectUri("missing port".to_string()))?;
    Ok(format!("{}:{}", host, port))
}

#[derive(Debug, Default, PartialEq)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn parse_callback(path: &str) -> CallbackParams {
    let mut params = CallbackParams::default();

    // tiny_http hands us a path-relative URL; graft it onto a dummy base so
    // the url crate can split the query string.
    let full_url = format!("http://localhost{}", path);
    let parsed = match Url::parse(&full_url) {
        Ok(url) => url,
        Err(_) => return params,
    };

    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "code" => params.code = Some(value.to_string()),
            "state" => params.state = Some(value.to_string()),
            "error" => params.error = Some(value.to_string()),
            _ => {}
        }
    }

    params
}

fn validate_callback(params: &CallbackParams, expected_state: &str) -> Result<String, AuthError> {
    if let Some(reason) = &params.error {
        return Err(AuthError::Denied(reason.clone()));
    }

    if params.state.as_deref() != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }

    params.code.clone().ok_or(AuthError::MissingCode)
}

fn exchange_code(credentials: &Credentials, code: &str) -> Result<TokenResponse, AuthError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", credentials.redirect_uri.as_str()),
    ];

    let client = reqwest::blocking::Client::new();
    let response = client
        .post(TOKEN_URL)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .header(reqwest::header::USER_AGENT, &credentials.user_agent)
        .form(&params)
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AuthError::TokenExchange {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json()?)
}

fn respond_html(request: Request, body: String) {
    let response = Response::from_string(body)
        .with_header(Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..]).unwrap());
    if let Err(e) = request.respond(response) {
        log::warn!("Failed to send the callback response to the browser: {}", e);
    }
}

fn success_page() -> String {
    "<html>\
        <body style='font-family: Arial, sans-serif; text-align: center; padding: 20px;'>\
            <h2 style='color: #4CAF50;'>Authorization Successful!</h2>\
            <p>You can close this window and return to the application.</p>\
        </body>\
    </html>"
        .to_string()
}

fn failure_page(err: &AuthError) -> String {
    format!(
        "<html>\
            <body style='font-family: Arial, sans-serif; text-align: center; padding: 20px;'>\
                <h2 style='color: #f44336;'>Authorization Failed!</h2>\
                <p>{}</p>\
                <p>Please try again or check the console for more information.</p>\
            </body>\
        </html>",
        err
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            user_agent: "remover/0.1 by u/someone".to_string(),
            redirect_uri: "http://localhost:8080".to_string(),
        }
    }

    #[test]
    fn test_state_generation() {
        let state = generate_state();

        // 32 bytes of URL-safe base64 without padding
        assert_eq!(state.len(), 43);
        assert!(state
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(state, generate_state());
    }

    #[test]
    fn test_authorize_url_contents() {
        let url = build_authorize_url(&credentials(), "mystate").unwrap();

        assert_eq!(url.host_str(), Some("www.reddit.com"));
        assert_eq!(url.path(), "/api/v1/authorize");

        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("client_id").map(String::as_str), Some("test-client"));
        assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(pairs.get("state").map(String::as_str), Some("mystate"));
        assert_eq!(
            pairs.get("redirect_uri").map(String::as_str),
            Some("http://localhost:8080")
        );
        assert_eq!(
            pairs.get("scope").map(String::as_str),
            Some("identity history edit")
        );
    }

    #[test]
    fn test_callback_addr_uses_port_from_redirect_uri() {
        let addr = callback_addr("http://127.0.0.1:9090").unwrap();
        assert_eq!(addr, "127.0.0.1:9090");

        // Scheme default applies when no explicit port is given.
        let addr = callback_addr("http://localhost").unwrap();
        assert_eq!(addr, "localhost:80");
    }

    #[test]
    fn test_parse_callback_query() {
        let params = parse_callback("/?code=abc123&state=xyz");
        assert_eq!(params.code.as_deref(), Some("abc123"));
        assert_eq!(params.state.as_deref(), Some("xyz"));
        assert!(params.error.is_none());

        let params = parse_callback("/?error=access_denied&state=xyz");
        assert_eq!(params.error.as_deref(), Some("access_denied"));
        assert!(params.code.is_none());
    }

    #[test]
    fn test_validate_accepts_matching_state() {
        let params = parse_callback("/?code=abc123&state=expected");
        let code = validate_callback(&params, "expected").unwrap();
        assert_eq!(code, "abc123");
    }

    #[test]
    fn test_validate_rejects_state_mismatch() {
        // A forged callback with the right shape but the wrong state must be
        // rejected before any token exchange happens.
        let params = parse_callback("/?code=abc123&state=forged");
        assert!(matches!(
            validate_callback(&params, "expected"),
            Err(AuthError::StateMismatch)
        ));
    }

    #[test]
    fn test_validate_rejects_denial() {
        let params = parse_callback("/?error=access_denied&state=expected");
        match validate_callback(&params, "expected") {
            Err(AuthError::Denied(reason)) => assert_eq!(reason, "access_denied"),
            other => panic!("expected Denied, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_missing_code() {
        let params = parse_callback("/?state=expected");
        assert!(matches!(
            validate_callback(&params, "expected"),
            Err(AuthError::MissingCode)
        ));
    }
}
