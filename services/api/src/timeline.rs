//! Timeline assembly
//!
//! A timeline is either one user's profile (posts by a single author) or the
//! caller's feed: posts by the caller and by everyone the caller follows,
//! newest first. The feed authors are computed fresh for every request.

use auth::models::Principal;
use common::error::ApiError;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    models::PostView,
    repositories::{PostRepository, RelationshipRepository},
};

/// Deduplicated author ids whose posts make up a feed.
///
/// Only positive ids are kept and the set is never empty, so a post lookup
/// by this set can never be issued with an empty id list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedAuthorSet(BTreeSet<i64>);

impl FeedAuthorSet {
    /// `{owner} ∪ followed`, or `None` if no usable id remains
    pub fn new(owner: i64, followed: impl IntoIterator<Item = i64>) -> Option<Self> {
        let ids: BTreeSet<i64> = std::iter::once(owner)
            .chain(followed)
            .filter(|id| *id > 0)
            .collect();

        if ids.is_empty() { None } else { Some(Self(ids)) }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    /// Ids in ascending order
    pub fn ids(&self) -> Vec<i64> {
        self.0.iter().copied().collect()
    }
}

/// Which timeline a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineRequest {
    /// The caller's own feed
    Feed,
    /// Posts by a single user
    Profile(i64),
}

impl TimelineRequest {
    /// Interpret the `profileUserid` query value.
    ///
    /// Absent or blank means the feed. The literal `undefined` is rejected
    /// rather than read as absent, since it is what a client sends when it
    /// forgot to fill in the id.
    pub fn from_param(raw: Option<&str>) -> Result<Self, ApiError> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(TimelineRequest::Feed);
        };

        if raw.eq_ignore_ascii_case("undefined") {
            return Err(ApiError::InvalidParameter(
                "Invalid profileUserid parameter".to_string(),
            ));
        }

        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(TimelineRequest::Profile(id)),
            _ => Err(ApiError::InvalidParameter(
                "profileUserid must be a valid number".to_string(),
            )),
        }
    }
}

/// Builds timelines from the relationship graph and the post store
#[derive(Clone)]
pub struct TimelineAssembler {
    relationships: Arc<dyn RelationshipRepository>,
    posts: Arc<dyn PostRepository>,
}

impl TimelineAssembler {
    pub fn new(
        relationships: Arc<dyn RelationshipRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            relationships,
            posts,
        }
    }

    /// Assemble the requested timeline for `principal`.
    ///
    /// A failing store call fails the whole request; nothing is retried.
    pub async fn assemble(
        &self,
        principal: &Principal,
        request: TimelineRequest,
    ) -> Result<Vec<PostView>, ApiError> {
        match request {
            TimelineRequest::Profile(author_id) => {
                Ok(self.posts.list_by_author(author_id).await?)
            }
            TimelineRequest::Feed => {
                let followed = self.relationships.list_followed_ids(principal.id).await?;

                let Some(authors) = FeedAuthorSet::new(principal.id, followed) else {
                    warn!(
                        "No usable feed authors for principal {}, returning empty feed",
                        principal.id
                    );
                    return Ok(Vec::new());
                };

                debug!(
                    "Assembling feed for {} from {} authors",
                    principal.id,
                    authors.0.len()
                );

                Ok(self.posts.list_by_authors(&authors).await?)
            }
        }
    }
}
