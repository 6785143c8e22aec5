/// Generates a two-word display name for players who never picked one
pub fn generate_display_name() -> String {
    petname::Petnames::default().generate_one(2, "-")
}
