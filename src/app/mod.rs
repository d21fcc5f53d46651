pub mod auth;
pub mod engagement;
pub mod enrich;
pub mod feed;
pub mod posts;
pub mod presence;
pub mod reposts;
pub mod social;
pub mod users;
pub mod visibility;
