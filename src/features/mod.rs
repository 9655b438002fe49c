pub mod auth;
pub mod categories;
pub mod submissions;
pub mod users;
