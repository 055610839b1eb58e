use reqwest::blocking::{Client, Response};
use reqwest::header;
use thiserror::Error;

use crate::auth::Session;
use crate::reddit::models::{Account, CommentData, ListingEnvelope, SubmissionData};
use crate::remover::{ContentApi, ContentItem};

pub const OAUTH_API_BASE: &str = "https://oauth.reddit.com";

/// Maximum Reddit allows per listing page.
const PAGE_LIMIT: u32 = 100;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Reddit API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Reddit returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Thin client over Reddit's OAuth API, bound to one authenticated account.
pub struct RedditClient {
    http: Client,
    session: Session,
    user_agent: String,
    username: String,
}

impl RedditClient {
    /// Wraps a fresh session and resolves the account it belongs to.
    pub fn connect(session: Session, user_agent: &str) -> Result<Self, ApiError> {
        let mut client = Self {
            http: Client::new(),
            session,
            user_agent: user_agent.to_string(),
            username: String::new(),
        };
        client.username = client.me()?;
        Ok(client)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Name of the account the session's token was issued for.
    pub fn me(&self) -> Result<String, ApiError> {
        let account: Account = self.get("/api/v1/me", &[])?.json()?;
        Ok(account.name)
    }

    /// Every submission by `username`, in Reddit's listing order, following
    /// the `after` cursor until the listing is exhausted.
    pub fn submissions(&self, username: &str) -> Result<Vec<SubmissionData>, ApiError> {
        self.paginate(&format!("/user/{}/submitted", username))
    }

    /// Every comment by `username`; paginates like [`submissions`].
    ///
    /// [`submissions`]: RedditClient::submissions
    pub fn comments(&self, username: &str) -> Result<Vec<CommentData>, ApiError> {
        self.paginate(&format!("/user/{}/comments", username))
    }

    /// Removes one thing by fullname (`t1_…` or `t3_…`).
    pub fn delete_thing(&self, fullname: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/api/del", OAUTH_API_BASE))
            .header(
                header::AUTHORIZATION,
                format!("bearer {}", self.session.access_token),
            )
            .header(header::USER_AGENT, &self.user_agent)
            .form(&[("id", fullname)])
            .send()?;
        Self::check_status(response)?;
        Ok(())
    }

    fn paginate<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![
                ("limit", PAGE_LIMIT.to_string()),
                ("raw_json", "1".to_string()),
            ];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }

            let page: ListingEnvelope<T> = self.get(path, &query)?.json()?;
            items.extend(page.data.children.into_iter().map(|thing| thing.data));

            match page.data.after {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        log::debug!("Fetched {} item(s) from {}", items.len(), path);
        Ok(items)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ApiError> {
        let response = self
            .http
            .get(format!("{}{}", OAUTH_API_BASE, path))
            .header(
                header::AUTHORIZATION,
                format!("bearer {}", self.session.access_token),
            )
            .header(header::USER_AGENT, &self.user_agent)
            .query(query)
            .send()?;
        Self::check_status(response)
    }

    fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl ContentApi for RedditClient {
    fn username(&self) -> &str {
        &self.username
    }

    fn list_posts(&self) -> Result<Vec<ContentItem>, ApiError> {
        let posts = self.submissions(&self.username)?;
        Ok(posts.into_iter().map(ContentItem::from_submission).collect())
    }

    fn list_comments(&self) -> Result<Vec<ContentItem>, ApiError> {
        let comments = self.comments(&self.username)?;
        Ok(comments.into_iter().map(ContentItem::from_comment).collect())
    }

    fn delete(&self, item: &ContentItem) -> Result<(), ApiError> {
        self.delete_thing(&item.fullname)
    }
}
