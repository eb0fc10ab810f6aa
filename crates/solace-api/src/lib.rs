pub mod achievements;
pub mod auth;
pub mod chat;
pub mod clock;
pub mod community;
pub mod content;
mod convert;
pub mod diary;
pub mod error;
pub mod insights;
pub mod media;
pub mod memories;
pub mod middleware;
pub mod moderation;
pub mod pending;
pub mod profiles;
pub mod routes;
pub mod state;
pub mod stats;
pub mod storage;

pub use routes::router;
pub use state::{AppState, AppStateInner};
