//! Mention extraction.
//!
//! The platform embeds user mentions in message text as `<@U024BE7LH>`.
//! Extraction is best effort: each mention is resolved independently and a
//! failed lookup drops that mention without affecting the others.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::LookupResult;
use crate::identity::Identity;

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@(U[^>]+)>").expect("static regex compile"));

/// Returns the user ids of all mention tokens in `text`, left to right.
///
/// Duplicates are kept.
pub fn mention_ids(text: &str) -> Vec<&str> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Resolves every mention token in `text` to an [`Identity`].
///
/// Mentions are resolved in order of appearance. Ids that fail to resolve are
/// omitted from the result.
///
/// # Example
///
/// ```rust,ignore
/// let mentions = extract_mentions(text, |id| async move {
///     resolver.lookup_user(&id).await
/// })
/// .await;
/// ```
pub async fn extract_mentions<F, Fut>(text: &str, mut resolve: F) -> Vec<Identity>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = LookupResult<Identity>>,
{
    let ids: Vec<String> = mention_ids(text).into_iter().map(str::to_owned).collect();
    let mut mentions = Vec::with_capacity(ids.len());

    for id in ids {
        match resolve(id.clone()).await {
            Ok(identity) => mentions.push(identity),
            Err(e) => debug!(user_id = %id, error = %e, "Skipping unresolved mention"),
        }
    }

    mentions
}
