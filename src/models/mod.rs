pub mod note;
pub mod user;

pub use note::{NewNote, Note, NoteChanges};
pub use user::{ADMIN_LEVEL, NewUser, PublicProfile, Role, USER_LEVEL, User, UserSummary};
