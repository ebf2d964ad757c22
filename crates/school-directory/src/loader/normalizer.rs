use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Drops BOM and zero-width characters, collapses whitespace runs, trims the ends.
pub(crate) fn normalize_whitespace(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical decomposition with combining marks removed ("é" becomes "e").
pub(crate) fn strip_diacritics(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Key used to compare school names across the CSV and existing entities.
pub(crate) fn normalize_name(value: &str) -> String {
    strip_diacritics(&normalize_whitespace(value)).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_collapsed_and_bom_removed() {
        assert_eq!(
            normalize_whitespace("\u{feff}  School \t\n Name  "),
            "School Name"
        );
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn diacritics_are_stripped() {
        assert_eq!(strip_diacritics("Mont\u{e9}go \u{c9}cole"), "Montego Ecole");
        assert_eq!(strip_diacritics("Ni\u{f1}o"), "Nino");
    }

    #[test]
    fn names_compare_case_and_accent_insensitive() {
        assert_eq!(
            normalize_name("  Santa  Cruz  Prim\u{e1}ry "),
            normalize_name("santa cruz primary")
        );
    }
}
