mod handler;
pub mod model;

pub use handler::{delete_me, get_me, get_profile, search, update_me};
