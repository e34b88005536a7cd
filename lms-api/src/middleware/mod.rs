/// Middleware for the API server
///
/// - `guard`: token strategies applied per route
/// - `security`: response security headers

pub mod guard;
pub mod security;
