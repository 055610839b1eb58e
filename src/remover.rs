use std::io::{self, BufRead, Write};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::reddit::models::{CommentData, SubmissionData};
use crate::reddit::ApiError;

/// Delay between consecutive delete calls, to stay under Reddit's rate limit.
pub const PACING: Duration = Duration::from_secs(2);

/// Comment bodies are cut to this many characters in previews and log lines.
const PREVIEW_LEN: usize = 100;

/// Which content kinds a run processes. Selected interactively; not to be
/// confused with OAuth permission scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Posts,
    Comments,
    Both,
}

impl Scope {
    /// Maps the interactive menu choice (1/2/3) to a scope.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Scope::Posts),
            "2" => Some(Scope::Comments),
            "3" => Some(Scope::Both),
            _ => None,
        }
    }

    pub fn includes_posts(self) -> bool {
        matches!(self, Scope::Posts | Scope::Both)
    }

    pub fn includes_comments(self) -> bool {
        matches!(self, Scope::Comments | Scope::Both)
    }

    pub fn describe(self) -> &'static str {
        match self {
            Scope::Posts => "posts",
            Scope::Comments => "comments",
            Scope::Both => "posts and comments",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Post,
    Comment,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Post => "post",
            Kind::Comment => "comment",
        }
    }
}

/// Unified view of a post or comment queued for deletion.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub fullname: String,
    pub kind: Kind,
    pub preview: String,
    pub created_utc: f64,
    pub score: i64,
}

impl ContentItem {
    pub fn from_submission(post: SubmissionData) -> Self {
        Self {
            fullname: post.name,
            kind: Kind::Post,
            preview: post.title,
            created_utc: post.created_utc,
            score: post.score,
        }
    }

    pub fn from_comment(comment: CommentData) -> Self {
        Self {
            fullname: comment.name,
            kind: Kind::Comment,
            preview: truncate_preview(&comment.body, PREVIEW_LEN),
            created_utc: comment.created_utc,
            score: comment.score,
        }
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc as i64, 0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindSummary {
    pub attempted: u32,
    pub deleted: u32,
    pub failed: u32,
    /// Set when the listing call for this kind failed; none of its items
    /// were processed.
    pub listing_failed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    pub posts: KindSummary,
    pub comments: KindSummary,
}

/// The slice of the platform API the runner needs. `RedditClient` implements
/// it; tests substitute a recording fake.
pub trait ContentApi {
    fn username(&self) -> &str;
    fn list_posts(&self) -> Result<Vec<ContentItem>, ApiError>;
    fn list_comments(&self) -> Result<Vec<ContentItem>, ApiError>;
    fn delete(&self, item: &ContentItem) -> Result<(), ApiError>;
}

pub struct Remover<'a, C: ContentApi> {
    api: &'a C,
    pacing: Duration,
}

impl<'a, C: ContentApi> Remover<'a, C> {
    pub fn new(api: &'a C, pacing: Duration) -> Self {
        Self { api, pacing }
    }

    /// Lists, previews, confirms, deletes. Returns the summary in every
    /// case; a declined confirmation or an empty listing yields an all-zero
    /// summary and is a normal outcome, not an error.
    pub fn run<R: BufRead>(&self, scope: Scope, input: &mut R) -> DeletionSummary {
        let mut summary = DeletionSummary::default();

        let mut posts = Vec::new();
        let mut comments = Vec::new();

        if scope.includes_posts() {
            match self.api.list_posts() {
                Ok(items) => posts = items,
                Err(e) => {
                    log::warn!("Could not fetch posts: {}", e);
                    summary.posts.listing_failed = true;
                }
            }
        }
        if scope.includes_comments() {
            match self.api.list_comments() {
                Ok(items) => comments = items,
                Err(e) => {
                    log::warn!("Could not fetch comments: {}", e);
                    summary.comments.listing_failed = true;
                }
            }
        }

        // Posts first, then comments, each in listing order.
        let items: Vec<ContentItem> = posts.into_iter().chain(comments).collect();
        if items.is_empty() {
            println!("Nothing to delete for user {}.", self.api.username());
            return summary;
        }

        preview(&items);
        if !confirm(input, self.api.username(), scope, items.len()) {
            println!("Deletion cancelled.");
            return summary;
        }

        for item in &items {
            let counts = match item.kind {
                Kind::Post => &mut summary.posts,
                Kind::Comment => &mut summary.comments,
            };
            counts.attempted += 1;

            match self.api.delete(item) {
                Ok(()) => {
                    counts.deleted += 1;
                    log::info!("Deleted {} {}: {}", item.kind.label(), item.fullname, item.preview);
                }
                Err(e) => {
                    // One bad item never stops the run.
                    counts.failed += 1;
                    log::error!(
                        "Failed to delete {} {}: {}",
                        item.kind.label(),
                        item.fullname,
                        e
                    );
                }
            }

            std::thread::sleep(self.pacing);
        }

        summary
    }
}

fn preview(items: &[ContentItem]) {
    println!("\nFound {} item(s):", items.len());
    for item in items {
        let posted = item
            .created()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        println!(
            "  [{}] {} (posted {}, score {})",
            item.kind.label(),
            item.preview,
            posted,
            item.score
        );
    }
}

fn confirm<R: BufRead>(input: &mut R, username: &str, scope: Scope, count: usize) -> bool {
    print!(
        "\nThis will delete {} {} for user {}. Are you sure? (yes/no): ",
        count,
        scope.describe(),
        username
    );
    let _ = io::stdout().flush();

    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return false;
    }
    line.trim().eq_ignore_ascii_case("yes")
}

/// Cuts `text` to at most `max` characters without splitting one, appending
/// an ellipsis when something was dropped.
fn truncate_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut)
}
