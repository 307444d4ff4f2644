mod handler;
pub mod model;

pub use handler::{create_note, delete_all_notes, delete_note, get_note, list_notes, update_note};
