//! Entities listed by the social client screens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::page::Identified;

/// A post in a reverse-chronological feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: i64,
    pub text: String,
    pub user_id: i64,
    pub user_screen_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub is_favorite: bool,
}

/// An account in a followers/friends/blocks/members listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub screen_name: String,
    pub name: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub friends_count: u64,
    #[serde(default)]
    pub is_protected: bool,
}

/// A curated user list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserList {
    pub id: i64,
    pub name: String,
    pub owner_screen_name: String,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub subscriber_count: u64,
}

impl Identified for Status {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for User {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for UserList {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}
