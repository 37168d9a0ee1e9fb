pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";
pub const KANJI: &str = "kanji";
pub const GROUPS: &str = "reading_groups";
pub const MASTERY_RECORDS: &str = "mastery_records";
pub const CONFIG_VERSIONS: &str = "config_versions";

// Secondary index trees
pub const KANJI_BY_CHARACTER: &str = "kanji_by_character";
