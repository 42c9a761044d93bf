//! Static country → cities catalog.
//!
//! Enumerated once at compile time and never mutated. The catalog only
//! drives the frontend's selection dropdowns; the store does not enforce
//! that a submitted country/city pair appears here.

/// Countries with their cities, in display order.
pub const CATALOG: &[(&str, &[&str])] = &[
    (
        "Saudi Arabia",
        &[
            "Riyadh", "Jeddah", "Mecca", "Medina", "Dammam", "Khobar", "Taif", "Tabuk",
        ],
    ),
    (
        "United Arab Emirates",
        &[
            "Dubai",
            "Abu Dhabi",
            "Sharjah",
            "Ajman",
            "Ras Al Khaimah",
            "Fujairah",
        ],
    ),
    (
        "Kuwait",
        &["Kuwait City", "Hawalli", "Salmiya", "Farwaniya", "Jahra"],
    ),
    ("Qatar", &["Doha", "Al Rayyan", "Al Wakrah", "Al Khor"]),
    ("Bahrain", &["Manama", "Muharraq", "Riffa", "Hamad Town"]),
    ("Oman", &["Muscat", "Salalah", "Sohar", "Nizwa"]),
    (
        "Egypt",
        &["Cairo", "Alexandria", "Giza", "Mansoura", "Tanta", "Luxor"],
    ),
    ("Jordan", &["Amman", "Zarqa", "Irbid", "Aqaba"]),
];

/// The catalog as a JSON object mapping country name to its city array.
pub fn as_json() -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (country, cities) in CATALOG {
        map.insert((*country).to_string(), serde_json::json!(cities));
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_nonempty_and_every_country_has_cities() {
        assert!(!CATALOG.is_empty());
        for (country, cities) in CATALOG {
            assert!(!country.is_empty());
            assert!(!cities.is_empty(), "{country} has no cities");
        }
    }

    #[test]
    fn json_shape_matches_catalog() {
        let json = as_json();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), CATALOG.len());

        let kuwait = obj.get("Kuwait").unwrap().as_array().unwrap();
        assert!(kuwait.iter().any(|c| *c == "Kuwait City"));
    }
}
