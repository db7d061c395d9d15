//! Resource operations shared by the HTTP handlers and the CLI.
//!
//! Services are cheap to build per request: they hold clones of the shared
//! handles in [`AppState`](crate::state::AppState).

pub mod auth;
pub mod listing;
pub mod messages;
pub mod profile;
pub mod projects;
pub mod skills;

pub use auth::AuthService;
pub use messages::MessageService;
pub use profile::ProfileService;
pub use projects::ProjectService;
pub use skills::SkillService;
