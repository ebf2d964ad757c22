use std::fmt;

/// Address broken into positional lines; absent parts stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub city: Option<String>,
}

impl StructuredAddress {
    pub fn is_empty(&self) -> bool {
        self.line1.is_none() && self.line2.is_none() && self.line3.is_none() && self.city.is_none()
    }
}

/// Which cleanup runs on the raw address before it is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressCleanup {
    None,
    ParishSuffix,
}

impl AddressCleanup {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "parish" | "parish-suffix" => Some(Self::ParishSuffix),
            _ => None,
        }
    }

    pub fn cleaner(self, region: &str) -> Box<dyn AddressCleaner> {
        match self {
            Self::None => Box::new(PassThrough),
            Self::ParishSuffix => Box::new(ParishSuffix::new(region)),
        }
    }
}

/// File-format specific fixups applied to the raw address text.
pub trait AddressCleaner: fmt::Debug + Send + Sync {
    fn clean(&self, raw: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl AddressCleaner for PassThrough {
    fn clean(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Removes a trailing parish name ("..., St. Elizabeth") and fixes the common
/// "Sr." misspelling of "St." first.
#[derive(Debug, Clone)]
pub struct ParishSuffix {
    parish: String,
}

impl ParishSuffix {
    pub fn new(parish: &str) -> Self {
        Self {
            parish: parish.trim().to_string(),
        }
    }
}

impl AddressCleaner for ParishSuffix {
    fn clean(&self, raw: &str) -> String {
        let fixed = raw
            .split(' ')
            .map(|word| if word == "Sr." { "St." } else { word })
            .collect::<Vec<_>>()
            .join(" ");
        let trimmed = fixed.trim();
        if self.parish.is_empty() {
            return trimmed.to_string();
        }

        // "..., St. Elizabeth." and "..., St. Elizabeth," still count as the parish tail
        let candidate = trimmed
            .strip_suffix(['.', ','])
            .map_or(trimmed, str::trim_end);
        let lowered = candidate.to_lowercase();
        let parish = self.parish.to_lowercase();
        if lowered.ends_with(&parish) && lowered.len() == candidate.len() {
            let split = candidate.len() - parish.len();
            if candidate.is_char_boundary(split) {
                let head = &candidate[..split];
                if head.is_empty() || head.ends_with([' ', ',']) {
                    return head.trim_end().trim_end_matches(',').trim_end().to_string();
                }
            }
        }

        trimmed.to_string()
    }
}

/// Comma-splits the cleaned address: one segment is line1, two are line1 and city,
/// three or more are line1, line2, city, with anything after the city in line3.
pub(crate) fn split_address(cleaned: &str) -> StructuredAddress {
    let segments: Vec<&str> = cleaned
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [] => StructuredAddress::default(),
        [line1] => StructuredAddress {
            line1: owned(line1),
            ..StructuredAddress::default()
        },
        [line1, city] => StructuredAddress {
            line1: owned(line1),
            city: owned(city),
            ..StructuredAddress::default()
        },
        [line1, line2, city, rest @ ..] => StructuredAddress {
            line1: owned(line1),
            line2: owned(line2),
            line3: if rest.is_empty() {
                None
            } else {
                Some(rest.join(", "))
            },
            city: owned(city),
        },
    }
}

fn owned(segment: &str) -> Option<String> {
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_assigns_segments_by_position() {
        assert!(split_address(" , ").is_empty());
        assert_eq!(
            split_address("Balaclava"),
            StructuredAddress {
                line1: Some("Balaclava".to_string()),
                ..StructuredAddress::default()
            }
        );
        assert_eq!(
            split_address("Main Road, Santa Cruz"),
            StructuredAddress {
                line1: Some("Main Road".to_string()),
                city: Some("Santa Cruz".to_string()),
                ..StructuredAddress::default()
            }
        );
        assert_eq!(
            split_address("Lot 4, Main Road,, Santa Cruz"),
            StructuredAddress {
                line1: Some("Lot 4".to_string()),
                line2: Some("Main Road".to_string()),
                city: Some("Santa Cruz".to_string()),
                line3: None,
            }
        );
        assert_eq!(
            split_address("Lot 4, Main Road, Santa Cruz, P.O. Box 12, Jamaica"),
            StructuredAddress {
                line1: Some("Lot 4".to_string()),
                line2: Some("Main Road".to_string()),
                city: Some("Santa Cruz".to_string()),
                line3: Some("P.O. Box 12, Jamaica".to_string()),
            }
        );
    }

    #[test]
    fn parish_suffix_is_stripped_from_the_tail() {
        let cleaner = ParishSuffix::new("St. Elizabeth");
        assert_eq!(
            cleaner.clean("Main Road, Santa Cruz, St. Elizabeth"),
            "Main Road, Santa Cruz"
        );
        assert_eq!(cleaner.clean("Black River Sr. Elizabeth."), "Black River");
        assert_eq!(cleaner.clean("Junction P.A., ST. ELIZABETH"), "Junction P.A.");
        assert_eq!(cleaner.clean("St. Elizabeth Technical"), "St. Elizabeth Technical");
    }

    #[test]
    fn trailing_abbreviations_survive_when_no_parish_is_removed() {
        let cleaner = ParishSuffix::new("St. Elizabeth");
        assert_eq!(
            cleaner.clean("Main Road, Santa Cruz P.O."),
            "Main Road, Santa Cruz P.O."
        );
        assert_eq!(
            split_address(&cleaner.clean("Main Road, Santa Cruz P.O.")).city.as_deref(),
            Some("Santa Cruz P.O.")
        );
        assert_eq!(cleaner.clean("  Lot 4, Malvern, "), "Lot 4, Malvern,");
        assert_eq!(
            split_address(&cleaner.clean("Lot 4, Malvern, ")).city.as_deref(),
            Some("Malvern")
        );
        assert_eq!(cleaner.clean("Malvern, St. Elizabeth,"), "Malvern");
    }

    #[test]
    fn pass_through_leaves_text_alone() {
        let cleaner = AddressCleanup::None.cleaner("St. Elizabeth");
        assert_eq!(
            cleaner.clean("Main Road, St. Elizabeth"),
            "Main Road, St. Elizabeth"
        );
    }
}
