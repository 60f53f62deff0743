//! CLI command implementations.
//!
//! Every command works on a snapshot file: it rebuilds the event in full,
//! applies the change, and writes the snapshot back when something changed.

use std::path::Path;

use crate::board::{Event, RehydrateMode, Rehydrator};
use crate::collection::ChatList;
use crate::config::BoardConfig;
use crate::format::EventSnapshot;
use crate::types::{
    now_millis, BoardError, BoardResult, PostBuilder, PostId, Timestamp, User, UserId,
};

/// Always a full rebuild into an accumulating chat list: commands write the
/// snapshot back, so discarding posts or expiring chat would lose data.
fn load_event(path: &Path, config: &BoardConfig) -> BoardResult<Event> {
    let snapshot = EventSnapshot::read_from_file(path)?;
    Rehydrator::new(RehydrateMode::Rebuild)
        .chat_list(ChatList::accumulating())
        .vote_policy(config.vote_policy())
        .rehydrate(snapshot)
}

fn parse_post_id(raw: &str) -> BoardResult<PostId> {
    PostId::parse(raw).ok_or_else(|| BoardError::Validation(format!("Invalid post id: {raw}")))
}

/// Create a new snapshot file with no posts.
pub fn cmd_create(
    path: &Path,
    title: &str,
    start: Option<Timestamp>,
    config: &BoardConfig,
    json: bool,
) -> BoardResult<()> {
    let mut snapshot = EventSnapshot::empty(title, start.unwrap_or_else(now_millis));
    snapshot.vote_decay_rate = config.vote_decay_rate;
    snapshot.write_to_file(path)?;

    if json {
        println!(
            "{}",
            serde_json::json!({"file": path.display().to_string(), "title": title, "start": snapshot.start})
        );
    } else {
        println!("Created {}", path.display());
    }
    Ok(())
}

/// Display information about a snapshot.
pub fn cmd_info(path: &Path, config: &BoardConfig, json: bool) -> BoardResult<()> {
    let event = load_event(path, config)?;
    let context = event.context();
    let promoted = event.posts().promoted_posts().len();
    let votes: usize = event.posts().to_vec().iter().map(|p| p.vote_count()).sum();

    if json {
        let info = serde_json::json!({
            "file": path.display().to_string(),
            "title": event.title(),
            "start": context.start,
            "vote_decay_rate": context.vote_decay_rate,
            "posts": event.posts().len(),
            "promoted": promoted,
            "votes": votes,
            "chat": event.chat().len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&info).unwrap_or_default()
        );
    } else {
        println!("File: {}", path.display());
        println!("Title: {}", event.title());
        println!("Start: {}", format_timestamp(context.start));
        println!("Vote decay rate: {}", context.vote_decay_rate);
        println!("Posts: {}", event.posts().len());
        println!("  Promoted: {}", promoted);
        println!("  Votes: {}", votes);
        println!("Chat messages: {}", event.chat().len());
    }
    Ok(())
}

/// Add a post to the board.
pub fn cmd_post(
    path: &Path,
    text: &str,
    author: &str,
    affiliation: &str,
    author_id: Option<&str>,
    config: &BoardConfig,
    json: bool,
) -> BoardResult<()> {
    let event = load_event(path, config)?;
    let post = event.add_post(
        PostBuilder::new(text)
            .author(author, affiliation, author_id.map(UserId::from))
            .build(),
    );
    event.snapshot().write_to_file(path)?;

    let rank = event.posts().rank_of(post.id()).unwrap_or_default();
    if json {
        println!("{}", serde_json::json!({"id": post.id(), "rank": rank}));
    } else {
        println!("Added post {} at rank {} to {}", post.id(), rank + 1, path.display());
    }
    Ok(())
}

/// Print the board in rank order.
pub fn cmd_rank(
    path: &Path,
    limit: Option<usize>,
    config: &BoardConfig,
    json: bool,
) -> BoardResult<()> {
    let event = load_event(path, config)?;
    let now = now_millis();
    let posts = event.posts().to_vec();
    let shown = limit.unwrap_or(posts.len()).min(posts.len());

    if json {
        let rows: Vec<serde_json::Value> = posts[..shown]
            .iter()
            .enumerate()
            .map(|(rank, post)| {
                serde_json::json!({
                    "rank": rank,
                    "id": post.id(),
                    "score": post.score(),
                    "votes": post.vote_count(),
                    "recent_votes": post.recent_votes_at(config.recent_vote_window_ms, now),
                    "promoted_at": post.promoted_at(),
                    "author": post.author_name(),
                    "text": post.text(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).unwrap_or_default()
        );
    } else {
        println!("{} ({} posts)", event.title(), posts.len());
        for (rank, post) in posts[..shown].iter().enumerate() {
            let marker = if post.is_promoted() { "*" } else { " " };
            println!(
                "{:>3}.{} [{:.3}] {} votes ({} recent)  {}: {}",
                rank + 1,
                marker,
                post.score(),
                post.vote_count(),
                post.recent_votes_at(config.recent_vote_window_ms, now),
                post.author_name(),
                truncate(&post.text(), 60)
            );
            println!("       {}", post.id());
        }
    }
    Ok(())
}

/// Vote on a post and report its new rank.
pub fn cmd_vote(
    path: &Path,
    post_id: &str,
    voter: Option<&str>,
    at: Option<Timestamp>,
    config: &BoardConfig,
    json: bool,
) -> BoardResult<()> {
    let post_id = parse_post_id(post_id)?;
    let event = load_event(path, config)?;
    let before = event.posts().rank_of(post_id);
    let accepted = event.vote(post_id, voter.map(UserId::from), at)?;
    if accepted {
        event.snapshot().write_to_file(path)?;
    }
    let after = event.posts().rank_of(post_id);

    if json {
        println!(
            "{}",
            serde_json::json!({"id": post_id, "accepted": accepted, "rank_before": before, "rank": after})
        );
    } else if accepted {
        println!(
            "Vote recorded on {}: rank {} -> {}",
            post_id,
            before.map_or(0, |r| r + 1),
            after.map_or(0, |r| r + 1)
        );
    } else {
        println!("Duplicate vote on {} ignored", post_id);
    }
    Ok(())
}

/// Promote a post.
pub fn cmd_promote(
    path: &Path,
    post_id: &str,
    at: Option<Timestamp>,
    config: &BoardConfig,
    json: bool,
) -> BoardResult<()> {
    let post_id = parse_post_id(post_id)?;
    let event = load_event(path, config)?;
    event.promote(post_id, at)?;
    event.snapshot().write_to_file(path)?;

    let promoted_at = event.post(post_id).and_then(|p| p.promoted_at());
    if json {
        println!("{}", serde_json::json!({"id": post_id, "promoted_at": promoted_at}));
    } else {
        println!("Promoted {}", post_id);
    }
    Ok(())
}

/// Check a user's name and affiliation lengths.
pub fn cmd_validate_user(name: &str, affiliation: &str, json: bool) -> BoardResult<()> {
    let user = User::new("cli", name, affiliation);
    let result = user.validate();

    if json {
        let error = result.as_ref().err().map(|e| e.to_string());
        println!("{}", serde_json::json!({"valid": result.is_ok(), "error": error}));
        return Ok(());
    }
    result?;
    println!("Valid");
    Ok(())
}

fn format_timestamp(ts: Timestamp) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
