//! Post resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::Identified;

/// A post as returned by the posts and feed listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique post id; the identity key across pages.
    pub id: String,

    pub title: String,

    pub body: String,

    #[serde(default)]
    pub like_count: u64,

    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub creator: Creator,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// The author summary embedded in a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl Identified for Post {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}
