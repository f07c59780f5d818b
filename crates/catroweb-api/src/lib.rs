pub mod auth;
pub mod error;
pub mod likes;
pub mod logs;
pub mod media;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod users;
pub mod validation;
