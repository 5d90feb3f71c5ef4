mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod provision;
mod token;

pub use cookie::DEFAULT_SESSION_DURATION;
pub use log_in::post_log_in;
pub use log_out::get_log_out;
pub use middleware::{admin_guard, auth_guard};
pub use provision::provision_admin;
pub use token::Principal;

#[cfg(test)]
pub use cookie::COOKIE_SESSION;

#[cfg(test)]
pub use provision::SETUP_SECRET_HEADER;
