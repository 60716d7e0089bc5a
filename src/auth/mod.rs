pub mod user;

pub use user::{AuthenticatedUser, USER_ID_HEADER};
