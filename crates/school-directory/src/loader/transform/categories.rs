use crate::loader::record::Ownership;

const KEYWORD_TAGS: &[(&str, &str)] = &[
    // Early childhood
    ("infant", "early-childhood"),
    ("kindergarten", "early-childhood"),
    ("basic", "early-childhood"),
    ("early childhood", "early-childhood"),
    // Primary & all-age
    ("primary", "primary-school"),
    ("all age", "primary-school"),
    ("junior high", "primary-school"),
    // Secondary
    ("secondary", "secondary-school"),
    ("technical", "technical-vocational"),
    ("vocational", "technical-vocational"),
    // Special needs
    ("special", "special-education"),
];

/// Base sector tag first, then keyword tags in table order without repeats.
pub(crate) fn derive_categories(ownership: Ownership, type_label: &str) -> Vec<String> {
    let lowered = type_label.to_lowercase();
    let mut categories = vec![ownership.base_tag().to_string()];

    for (keyword, tag) in KEYWORD_TAGS {
        if lowered.contains(keyword) && !categories.iter().any(|existing| existing == tag) {
            categories.push((*tag).to_string());
        }
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_tag_always_leads() {
        assert_eq!(derive_categories(Ownership::Public, ""), vec!["public-school"]);
        assert_eq!(
            derive_categories(Ownership::Private, "Preparatory"),
            vec!["private-school"]
        );
    }

    #[test]
    fn keyword_tags_are_deduplicated() {
        assert_eq!(
            derive_categories(Ownership::Public, "Primary and Junior High"),
            vec!["public-school", "primary-school"]
        );
        assert_eq!(
            derive_categories(Ownership::Public, "All Age & Infant Dept, Special"),
            vec![
                "public-school",
                "early-childhood",
                "primary-school",
                "special-education"
            ]
        );
        assert_eq!(
            derive_categories(Ownership::Private, "Technical High / Vocational"),
            vec!["private-school", "technical-vocational"]
        );
    }
}
