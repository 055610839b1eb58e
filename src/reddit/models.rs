use serde::Deserialize;

/// Bare account object returned by `/api/v1/me` (not wrapped in a Thing).
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub name: String,
}

/// One page of a listing endpoint: `{"kind": "Listing", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct ListingEnvelope<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    /// Cursor for the next page; `null` on the last one.
    pub after: Option<String>,
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

/// Fields of a `t3` (submission) thing this tool cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionData {
    /// Fullname, e.g. `t3_abc123`; the id `/api/del` expects.
    pub name: String,
    pub title: String,
    pub created_utc: f64,
    pub score: i64,
}

/// Fields of a `t1` (comment) thing this tool cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    pub name: String,
    pub body: String,
    pub created_utc: f64,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_submission_listing_page() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": "t3_def456",
                "children": [
                    {
                        "kind": "t3",
                        "data": {
                            "name": "t3_abc123",
                            "title": "My first post",
                            "created_utc": 1715000000.0,
                            "score": 42,
                            "subreddit": "rust",
                            "num_comments": 7
                        }
                    }
                ]
            }
        }"#;

        let page: ListingEnvelope<SubmissionData> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.after.as_deref(), Some("t3_def456"));
        assert_eq!(page.data.children.len(), 1);

        let post = &page.data.children[0].data;
        assert_eq!(post.name, "t3_abc123");
        assert_eq!(post.title, "My first post");
        assert_eq!(post.score, 42);
    }

    #[test]
    fn test_decode_final_comment_listing_page() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    {
                        "kind": "t1",
                        "data": {
                            "name": "t1_xyz789",
                            "body": "I agree with this.",
                            "created_utc": 1715000100.5,
                            "score": -3
                        }
                    }
                ]
            }
        }"#;

        let page: ListingEnvelope<CommentData> = serde_json::from_str(json).unwrap();
        assert!(page.data.after.is_none());

        let comment = &page.data.children[0].data;
        assert_eq!(comment.name, "t1_xyz789");
        assert_eq!(comment.body, "I agree with this.");
        assert_eq!(comment.score, -3);
    }

    #[test]
    fn test_decode_account() {
        let json = r#"{"name": "someone", "link_karma": 10, "comment_karma": 20}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.name, "someone");
    }
}
