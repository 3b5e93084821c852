pub mod dashboard;
pub mod error;
pub mod form;
pub mod pages;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::ClientError;
pub use session::{AuthContext, SessionSubscription, SessionUser};
pub use store::{AdStore, HttpAdStore};
