//! Canonical spelling of Taiwanese administrative-area names
//!
//! Geocoders frequently return the informal `台` glyph where the weather
//! dataset only recognises the official `臺`.

/// Legacy spelling to canonical spelling
const CITY_NAME_MAPPING: [(&str, &str); 4] = [
    ("台北市", "臺北市"),
    ("台中市", "臺中市"),
    ("台南市", "臺南市"),
    ("台東縣", "臺東縣"),
];

/// Map a legacy spelling to its canonical form; other names pass through
#[must_use]
pub fn normalize_city_name(name: &str) -> &str {
    CITY_NAME_MAPPING
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map_or(name, |(_, canonical)| *canonical)
}
