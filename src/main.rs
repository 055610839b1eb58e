mod auth;
mod config;
mod reddit;
mod remover;

use std::io::{self, BufRead, Write};

use anyhow::Context;

use crate::auth::AuthOptions;
use crate::config::Credentials;
use crate::reddit::RedditClient;
use crate::remover::{DeletionSummary, KindSummary, Remover, Scope, PACING};

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let credentials = Credentials::from_env()?;

    let session = auth::authorize(&credentials, &AuthOptions::default())
        .context("Reddit authorization failed")?;
    println!("\nAuthorization successful!");

    let client = RedditClient::connect(session, &credentials.user_agent)
        .context("could not resolve the authenticated account")?;
    println!("Logged in as: {}", client.username());

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let scope = match prompt_scope(&mut input)? {
        Some(scope) => scope,
        None => {
            println!("Invalid choice. Exiting.");
            return Ok(());
        }
    };

    let remover = Remover::new(&client, PACING);
    let summary = remover.run(scope, &mut input);
    print_summary(scope, &summary);

    Ok(())
}

fn prompt_scope<R: BufRead>(input: &mut R) -> anyhow::Result<Option<Scope>> {
    println!("\nWhat would you like to delete?");
    println!("1. Posts only");
    println!("2. Comments only");
    println!("3. Both posts and comments");
    print!("Enter your choice (1/2/3): ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(Scope::from_choice(&line))
}

fn print_summary(scope: Scope, summary: &DeletionSummary) {
    println!("\nDeletion Summary:");
    if scope.includes_posts() {
        print_kind("Posts", &summary.posts);
    }
    if scope.includes_comments() {
        print_kind("Comments", &summary.comments);
    }
}

fn print_kind(label: &str, counts: &KindSummary) {
    println!(
        "{}: {} attempted, {} deleted, {} failed",
        label, counts.attempted, counts.deleted, counts.failed
    );
    if counts.listing_failed {
        println!("  (listing failed; none were processed)");
    }
}
