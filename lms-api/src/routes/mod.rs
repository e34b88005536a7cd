/// HTTP handlers
///
/// Handlers only extract, call one service method and convert its error;
/// all rules live in [`crate::services`].
///
/// - `health`: liveness and store check
/// - `auth`: login
/// - `users`: account management
/// - `courses`: course tree, assignments and reports
/// - `board`: posts, comments and policies
/// - `progress`: chapter progress and last-seen markers

pub mod auth;
pub mod board;
pub mod courses;
pub mod health;
pub mod progress;
pub mod users;
