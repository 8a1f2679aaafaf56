pub mod auth;
pub mod directory;
pub mod error;
pub mod mock_feed;
pub mod password;
pub mod policy;
