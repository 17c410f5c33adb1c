//! Wire model for the Reddit JSON API
//!
//! Responses are "things": `{"kind": "...", "data": {...}}`. Listings wrap a
//! page of things plus an `after` cursor. Comment replies are either an
//! empty string or a nested listing.

use crate::source::{Comment, CommentForest, CommentNode, MoreStub, Submission, SubmissionPage};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<RawThing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawThing {
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    id: String,
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    selftext_html: Option<String>,
    created_utc: f64,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: String,
    name: String,
    #[serde(default)]
    parent_id: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    replies: Value,
}

#[derive(Debug, Deserialize)]
struct RawMore {
    id: String,
    #[serde(default)]
    parent_id: String,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    children: Vec<String>,
}

/// Envelope returned by `/api/morechildren?api_type=json`
#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<RawThing>,
}

/// Converts a `t3` listing into a page of submissions
pub(crate) fn submission_page(listing: Listing) -> Result<SubmissionPage, String> {
    let mut submissions = Vec::with_capacity(listing.data.children.len());

    for thing in listing.data.children {
        if thing.kind != "t3" {
            continue;
        }
        submissions.push(submission_from_value(thing.data)?);
    }

    Ok(SubmissionPage {
        submissions,
        after: listing.data.after.filter(|a| !a.is_empty()),
    })
}

fn submission_from_value(data: Value) -> Result<Submission, String> {
    let raw: RawSubmission = serde_json::from_value(data).map_err(|e| e.to_string())?;

    let created_at = Utc
        .timestamp_opt(raw.created_utc.floor() as i64, 0)
        .single()
        .ok_or_else(|| format!("invalid created_utc {} on {}", raw.created_utc, raw.name))?;

    Ok(Submission {
        id: raw.id,
        fullname: raw.name,
        title: raw.title,
        created_at,
        selftext: raw.selftext,
        selftext_html: raw.selftext_html,
    })
}

/// Converts a comment listing (with nested replies) into a forest
pub(crate) fn comment_forest(listing: Listing) -> Result<CommentForest, String> {
    let mut forest = Vec::with_capacity(listing.data.children.len());
    for thing in listing.data.children {
        if let Some(node) = node_from_thing(thing)? {
            forest.push(node);
        }
    }
    Ok(forest)
}

fn node_from_thing(thing: RawThing) -> Result<Option<CommentNode>, String> {
    match thing.kind.as_str() {
        "t1" => {
            let raw: RawComment = serde_json::from_value(thing.data).map_err(|e| e.to_string())?;
            let replies = match raw.replies {
                Value::Object(_) => {
                    let listing: Listing =
                        serde_json::from_value(raw.replies).map_err(|e| e.to_string())?;
                    comment_forest(listing)?
                }
                _ => Vec::new(),
            };

            Ok(Some(CommentNode::Comment(Comment {
                id: raw.id,
                fullname: raw.name,
                parent_id: raw.parent_id,
                body: raw.body,
                body_html: raw.body_html,
                replies,
            })))
        }
        "more" => {
            let raw: RawMore = serde_json::from_value(thing.data).map_err(|e| e.to_string())?;
            Ok(Some(CommentNode::More(MoreStub {
                id: raw.id,
                parent_id: raw.parent_id,
                count: raw.count,
                children: raw.children,
            })))
        }
        other => {
            tracing::trace!("Skipping thing of kind {}", other);
            Ok(None)
        }
    }
}

/// Rebuilds a tree from the flat, parent-linked things of a morechildren call
///
/// Things whose parent is not part of the batch become roots, in response
/// order; they take the place of the stub that was expanded.
pub(crate) fn assemble_tree(things: Vec<RawThing>) -> Result<Vec<CommentNode>, String> {
    let mut slots = Vec::with_capacity(things.len());
    for thing in things {
        if let Some(node) = node_from_thing(thing)? {
            slots.push(Some(node));
        }
    }

    let index: HashMap<String, usize> = slots
        .iter()
        .enumerate()
        .filter_map(|(i, node)| match node {
            Some(CommentNode::Comment(c)) => Some((c.fullname.clone(), i)),
            _ => None,
        })
        .collect();

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (i, node) in slots.iter().enumerate() {
        let parent = node.as_ref().map(parent_of).unwrap_or_default();
        match index.get(parent) {
            Some(&p) if p != i => children.entry(p).or_default().push(i),
            _ => roots.push(i),
        }
    }

    Ok(roots
        .into_iter()
        .filter_map(|i| attach(i, &mut slots, &mut children))
        .collect())
}

fn attach(
    i: usize,
    slots: &mut [Option<CommentNode>],
    children: &mut HashMap<usize, Vec<usize>>,
) -> Option<CommentNode> {
    let mut node = slots.get_mut(i)?.take()?;
    if let CommentNode::Comment(comment) = &mut node {
        for child in children.remove(&i).unwrap_or_default() {
            if let Some(reply) = attach(child, slots, children) {
                comment.replies.push(reply);
            }
        }
    }
    Some(node)
}

fn parent_of(node: &CommentNode) -> &str {
    match node {
        CommentNode::Comment(c) => &c.parent_id,
        CommentNode::More(m) => &m.parent_id,
    }
}
