pub const MAX_PLAYER_NAME_LENGTH: usize = 20;

/// Collapses whitespace and caps the display name length.
pub fn sanitize_player_name(name: &str) -> String {
    let cleaned = name.split_whitespace().collect::<Vec<_>>().join(" ");
    cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect()
}
