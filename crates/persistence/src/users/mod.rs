//! Authentication users.
//!
//! [`AuthenticationUser`] holds the credentials and flags a sign-in layer
//! needs; [`UserStore`] persists any [`UserEntity`] with soft deletion.
//! Password hashing and sign-in rules live with the caller.

mod store;
mod user;

pub use store::UserStore;
pub use user::{AuthenticationUser, UserEntity};
