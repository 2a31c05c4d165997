pub mod authorizor;
mod session;
mod user;

pub use session::session_token;
pub use user::User;
