pub mod groups;
pub mod kanji;
pub mod progress;
pub mod sessions;
pub mod users;
