//! Domain resources returned by the content API.
//!
//! Only the fields the client reads are modelled; the shapes follow the
//! API's camelCase JSON.

mod post;
mod user;

pub use post::{Creator, Post};
pub use user::User;
