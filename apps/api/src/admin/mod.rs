// Staff review: list, filter and search requests with their artifacts and
// mark finished songs as delivered. Every route sits behind `require_admin`.

pub mod auth;
pub mod handlers;
pub mod review;
