use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

//  USER & AUTHENTICATION STRUCTS

#[derive(Debug, Serialize, Deserialize, Display, EnumString, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// Authenticated identity carried by a token and attached to guarded requests.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub role: UserRole,
}

//  PROTECTED OPERATIONS

#[derive(Debug, Display, EnumString, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Operation {
    #[strum(serialize = "posts.delete")]
    DeletePost,
    #[strum(serialize = "profile.read")]
    ReadProfile,
}

//  FEED

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub likes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub has_more: bool,
    pub page: u32,
    pub total_pages: u32,
}
