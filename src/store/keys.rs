pub fn user_key(user_id: &str) -> String {
    user_id.to_string()
}

pub fn user_email_index_key(email: &str) -> String {
    format!("email:{}", email.to_lowercase())
}

pub fn session_key(token_hash: &str) -> String {
    token_hash.to_string()
}

pub fn session_user_index_key(user_id: &str, token_hash: &str) -> String {
    format!("user:{}:{}", user_id, token_hash)
}

pub fn session_user_index_prefix(user_id: &str) -> String {
    format!("user:{}:", user_id)
}

pub fn kanji_key(kanji_id: &str) -> String {
    kanji_id.to_string()
}

pub fn kanji_character_index_key(character: &str) -> String {
    format!("char:{}", character)
}

pub fn group_key(reading: &str) -> String {
    reading.to_string()
}

pub fn mastery_record_key(user_id: &str, kanji_id: &str) -> String {
    format!("{}:{}", user_id, kanji_id)
}

pub fn mastery_record_prefix(user_id: &str) -> String {
    format!("{}:", user_id)
}
