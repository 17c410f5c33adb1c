//! Comment tree expansion and traversal
//!
//! Expansion resolves every "more comments" stub before any body is read.
//! Stubs are taken one at a time in pre-order position, so the result is
//! deterministic for a given source. Replacement nodes are spliced in where
//! the stub was and are themselves searched for further stubs.

use crate::crawler::limiter::RateLimiter;
use crate::crawler::request::TextUnit;
use crate::source::{
    Comment, CommentForest, CommentNode, ForumSource, MoreStub, SourceError, SourceResult,
    Submission,
};

/// Default bound on stub resolutions per submission
pub const DEFAULT_MAX_EXPANSION_ROUNDS: u32 = 10_000;

/// Fully expands and flattens a submission's comments
pub struct CommentTreeWalker<'a> {
    source: &'a dyn ForumSource,
    limiter: &'a RateLimiter,
    max_rounds: u32,
}

impl<'a> CommentTreeWalker<'a> {
    pub fn new(source: &'a dyn ForumSource, limiter: &'a RateLimiter, max_rounds: u32) -> Self {
        Self {
            source,
            limiter,
            max_rounds,
        }
    }

    /// Fetches, expands and flattens the comments of `submission`
    ///
    /// Every returned unit carries the submission's title and timestamp.
    pub async fn walk(&self, submission: &Submission) -> SourceResult<Vec<TextUnit>> {
        self.limiter.throttle().await;
        let mut forest = self.source.fetch_comments(submission).await?;

        let rounds = self.expand(submission, &mut forest).await?;

        let bodies = Self::flatten(&forest);
        tracing::debug!(
            "Submission {}: {} comments after {} expansion rounds",
            submission.fullname,
            bodies.len(),
            rounds
        );

        Ok(bodies
            .into_iter()
            .map(|body| TextUnit::attributed(body, submission))
            .collect())
    }

    /// Resolves every stub in `forest`, returning the number of fetches made
    ///
    /// # Errors
    ///
    /// Propagates source failures, and returns `SourceError::ExpansionLimit`
    /// if stubs remain after the configured number of rounds.
    pub async fn expand(
        &self,
        submission: &Submission,
        forest: &mut CommentForest,
    ) -> SourceResult<u32> {
        let mut rounds = 0;

        while let Some(path) = next_stub_path(forest) {
            if rounds >= self.max_rounds {
                tracing::warn!(
                    "Giving up on submission {} after {} expansion rounds",
                    submission.fullname,
                    rounds
                );
                return Err(SourceError::ExpansionLimit {
                    submission: submission.fullname.clone(),
                    rounds,
                });
            }

            let Some(stub) = stub_at(forest, &path).cloned() else {
                break;
            };

            self.limiter.throttle().await;
            let replacement = self.source.fetch_more(submission, &stub).await?;
            tracing::trace!(
                "Stub {} under {} resolved into {} nodes",
                stub.id,
                stub.parent_id,
                replacement.len()
            );

            let (in_place, adopted) = adopt_known_parents(forest, &stub, replacement);
            splice(forest, &path, in_place);
            for (parent, node) in adopted {
                if let Some(comment) = find_comment_mut(forest, &parent) {
                    comment.replies.push(node);
                }
            }
            rounds += 1;
        }

        Ok(rounds)
    }

    /// Pre-order traversal of every comment body
    ///
    /// A comment is followed by its replies, then by its next sibling. Each
    /// body is the rendered HTML if present, otherwise the raw text. Stubs
    /// contribute nothing.
    pub fn flatten(forest: &[CommentNode]) -> Vec<String> {
        let mut bodies = Vec::new();
        let mut stack: Vec<&CommentNode> = forest.iter().rev().collect();

        while let Some(node) = stack.pop() {
            if let CommentNode::Comment(comment) = node {
                bodies.push(comment.content().to_string());
                stack.extend(comment.replies.iter().rev());
            }
        }

        bodies
    }
}

/// Index path of the first stub in pre-order
fn next_stub_path(nodes: &[CommentNode]) -> Option<Vec<usize>> {
    for (i, node) in nodes.iter().enumerate() {
        match node {
            CommentNode::More(_) => return Some(vec![i]),
            CommentNode::Comment(comment) => {
                if let Some(mut rest) = next_stub_path(&comment.replies) {
                    rest.insert(0, i);
                    return Some(rest);
                }
            }
        }
    }
    None
}

fn stub_at<'n>(nodes: &'n [CommentNode], path: &[usize]) -> Option<&'n MoreStub> {
    let (&last, parents) = path.split_last()?;
    let mut level = nodes;
    for &i in parents {
        match level.get(i)? {
            CommentNode::Comment(c) => level = &c.replies,
            CommentNode::More(_) => return None,
        }
    }
    match level.get(last)? {
        CommentNode::More(stub) => Some(stub),
        CommentNode::Comment(_) => None,
    }
}

/// Separates nodes that belong under a comment already in `forest`
///
/// A stub with more ids than one request allows is resolved in batches; a
/// later batch may hold replies to comments delivered by an earlier one.
/// Those are returned with their parent's fullname. Everything else takes
/// the stub's place.
fn adopt_known_parents(
    forest: &[CommentNode],
    stub: &MoreStub,
    replacement: Vec<CommentNode>,
) -> (Vec<CommentNode>, Vec<(String, CommentNode)>) {
    let mut in_place = Vec::with_capacity(replacement.len());
    let mut adopted = Vec::new();

    for node in replacement {
        let parent = match &node {
            CommentNode::Comment(c) => &c.parent_id,
            CommentNode::More(m) => &m.parent_id,
        };

        if *parent != stub.parent_id && find_comment(forest, parent).is_some() {
            adopted.push((parent.clone(), node));
        } else {
            in_place.push(node);
        }
    }

    (in_place, adopted)
}

fn find_comment<'n>(nodes: &'n [CommentNode], fullname: &str) -> Option<&'n Comment> {
    nodes.iter().find_map(|node| match node {
        CommentNode::Comment(c) if c.fullname == fullname => Some(c),
        CommentNode::Comment(c) => find_comment(&c.replies, fullname),
        CommentNode::More(_) => None,
    })
}

fn find_comment_mut<'n>(nodes: &'n mut [CommentNode], fullname: &str) -> Option<&'n mut Comment> {
    for node in nodes.iter_mut() {
        if let CommentNode::Comment(c) = node {
            if c.fullname == fullname {
                return Some(c);
            }
            if let Some(found) = find_comment_mut(&mut c.replies, fullname) {
                return Some(found);
            }
        }
    }
    None
}

/// Replaces the node at `path` with `replacement`
fn splice(nodes: &mut Vec<CommentNode>, path: &[usize], replacement: Vec<CommentNode>) {
    let Some((&last, parents)) = path.split_last() else {
        return;
    };

    let mut level = nodes;
    for &i in parents {
        match level.get_mut(i) {
            Some(CommentNode::Comment(c)) => level = &mut c.replies,
            _ => return,
        }
    }

    if last < level.len() {
        level.splice(last..=last, replacement);
    }
}
