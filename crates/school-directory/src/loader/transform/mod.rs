mod address;
mod categories;
mod phone;

use super::normalizer::strip_diacritics;
use super::record::{CanonicalRecord, Ownership};

pub use address::{AddressCleaner, AddressCleanup, ParishSuffix, PassThrough, StructuredAddress};
pub use phone::{PhoneFormat, PhoneFormatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Phone,
    Email,
}

impl ContactKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub kind: ContactKind,
    pub value: String,
    pub label: String,
    pub is_public: bool,
    pub primary: bool,
}

/// Everything the writer needs to emit one organisation module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedModule {
    pub org_username: String,
    pub export_const: String,
    pub name: String,
    pub code: String,
    pub ownership: Ownership,
    pub categories: Vec<String>,
    pub address: StructuredAddress,
    pub contacts: Vec<Contact>,
}

/// Pure record-to-module conversion; no I/O.
#[derive(Debug)]
pub struct Transformer {
    phone: PhoneFormatter,
    cleaner: Box<dyn AddressCleaner>,
}

impl Transformer {
    pub fn new(phone: PhoneFormatter, cleaner: Box<dyn AddressCleaner>) -> Self {
        Self { phone, cleaner }
    }

    pub fn transform(&self, record: &CanonicalRecord) -> TransformedModule {
        let address = address::split_address(&self.cleaner.clean(&record.address));

        let mut contacts = Vec::new();
        if !record.phone.is_empty() {
            contacts.push(Contact {
                kind: ContactKind::Phone,
                value: self.phone.format(&record.phone),
                label: "Office".to_string(),
                is_public: true,
                primary: true,
            });
        }
        if !record.email.is_empty() {
            contacts.push(Contact {
                kind: ContactKind::Email,
                value: record.email.clone(),
                label: "General".to_string(),
                is_public: true,
                primary: false,
            });
        }

        TransformedModule {
            org_username: derive_org_username(record),
            export_const: derive_export_const(&record.school_name),
            name: record.school_name.clone(),
            code: record.code.clone(),
            ownership: record.ownership,
            categories: categories::derive_categories(record.ownership, &record.type_label),
            address,
            contacts,
        }
    }
}

/// Slug from the email local-part when there is an email, otherwise from the name.
/// Only `[a-z0-9-]` survives; the result may be empty.
pub fn derive_org_username(record: &CanonicalRecord) -> String {
    if !record.email.is_empty() {
        let local = record.email.split('@').next().unwrap_or_default();
        return strip_diacritics(&local.to_lowercase())
            .replace('_', "-")
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect();
    }

    strip_diacritics(&record.school_name.to_lowercase())
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// `"St. Mary's Prep"` becomes `ST_MARY_S_PREP_ORG`. A stem starting with a digit
/// gets a leading `_` so the constant stays a valid identifier.
pub fn derive_export_const(name: &str) -> String {
    let stem = identifier_stem(name);
    if stem.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{stem}_ORG")
    } else {
        format!("{stem}_ORG")
    }
}

/// Uppercase ASCII words joined by single underscores, no leading or trailing `_`.
pub(crate) fn identifier_stem(value: &str) -> String {
    strip_diacritics(value)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, email: &str) -> CanonicalRecord {
        CanonicalRecord {
            school_name: name.to_string(),
            address: "Main Road, Santa Cruz, St. Elizabeth".to_string(),
            phone: "965-1234".to_string(),
            ownership: Ownership::Public,
            type_label: "Primary".to_string(),
            code: "11045".to_string(),
            email: email.to_string(),
        }
    }

    fn transformer() -> Transformer {
        Transformer::new(
            PhoneFormatter::new(PhoneFormat::Parish, "876"),
            AddressCleanup::ParishSuffix.cleaner("St. Elizabeth"),
        )
    }

    fn is_slug(value: &str) -> bool {
        value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    fn is_export_const(value: &str) -> bool {
        value.ends_with("_ORG")
            && value
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    }

    #[test]
    fn username_prefers_email_local_part() {
        let module = transformer().transform(&record(
            "Santa Cruz Primary",
            "Santa_Cruz.Pr\u{ed}m+1@moey.gov.jm",
        ));
        assert_eq!(module.org_username, "santa-cruzprim1");
    }

    #[test]
    fn username_falls_back_to_squashed_name() {
        let module = transformer().transform(&record("B\u{e9}thel Town All-Age", ""));
        assert_eq!(module.org_username, "betheltownallage");
        assert_eq!(derive_org_username(&record("!!!", "")), "");
    }

    #[test]
    fn export_const_collapses_punctuation() {
        assert_eq!(derive_export_const("St. Mary's  Prep"), "ST_MARY_S_PREP_ORG");
        assert_eq!(derive_export_const("  M\u{f6}ntego -- Bay  "), "MONTEGO_BAY_ORG");
        assert_eq!(derive_export_const("..."), "_ORG");
        assert_eq!(derive_export_const("4-H Club"), "_4_H_CLUB_ORG");
    }

    #[test]
    fn generated_identifiers_stay_within_their_alphabets() {
        let names = [
            ("Balaclava High", "balaclava.high@moey.gov.jm"),
            ("\u{c9}cole d'\u{c9}t\u{e9}", ""),
            ("Sacred Heart (Prep)", "sacred__heart@x.com"),
            ("123 Academy", ""),
        ];
        for (name, email) in names {
            let module = transformer().transform(&record(name, email));
            assert!(is_slug(&module.org_username), "{}", module.org_username);
            assert!(is_export_const(&module.export_const), "{}", module.export_const);
            assert_eq!(module.categories[0], "public-school");
        }
    }

    #[test]
    fn contacts_follow_available_fields() {
        let module = transformer().transform(&record("Siloah Primary", "siloah@moey.gov.jm"));
        assert_eq!(module.contacts.len(), 2);
        assert_eq!(module.contacts[0].kind, ContactKind::Phone);
        assert_eq!(module.contacts[0].value, "+1-876-965-1234");
        assert_eq!(module.contacts[0].label, "Office");
        assert!(module.contacts[0].primary);
        assert_eq!(module.contacts[1].kind, ContactKind::Email);
        assert_eq!(module.contacts[1].label, "General");
        assert!(!module.contacts[1].primary);

        let mut bare = record("Siloah Primary", "");
        bare.phone.clear();
        assert!(transformer().transform(&bare).contacts.is_empty());
    }

    #[test]
    fn address_is_cleaned_before_splitting() {
        let module = transformer().transform(&record("Siloah Primary", ""));
        assert_eq!(module.address.line1.as_deref(), Some("Main Road"));
        assert_eq!(module.address.city.as_deref(), Some("Santa Cruz"));
        assert!(module.address.line2.is_none());
    }
}
