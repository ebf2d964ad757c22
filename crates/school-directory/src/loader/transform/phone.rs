/// Target layout for reformatted phone numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneFormat {
    /// `+1-876-PPP-LLLL`: the configured area code is always used.
    Parish,
    /// `+1-AAA-PPP-LLLL`: the number's own area code is kept when it has one.
    NorthAmerican,
}

impl PhoneFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parish" | "local" => Some(Self::Parish),
            "north-american" | "north_american" | "nanp" => Some(Self::NorthAmerican),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Parish => "parish",
            Self::NorthAmerican => "north-american",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneFormatter {
    format: PhoneFormat,
    area_code: String,
}

impl PhoneFormatter {
    pub fn new(format: PhoneFormat, area_code: impl Into<String>) -> Self {
        Self {
            format,
            area_code: area_code.into(),
        }
    }

    /// Recognizes 7, 10, and 11 (leading `1`) digit numbers. Anything else comes back
    /// as the trimmed input.
    pub fn format(&self, raw: &str) -> String {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let area = self.area_code.as_str();
        let parts = match (self.format, digits.len()) {
            (_, 7) => Some((area, &digits[0..3], &digits[3..7])),
            (PhoneFormat::Parish, 10) => Some((area, &digits[3..6], &digits[6..10])),
            (PhoneFormat::Parish, 11)
                if digits.starts_with('1') && digits[1..].starts_with(area) =>
            {
                Some((area, &digits[4..7], &digits[7..11]))
            }
            (PhoneFormat::NorthAmerican, 10) => {
                Some((&digits[0..3], &digits[3..6], &digits[6..10]))
            }
            (PhoneFormat::NorthAmerican, 11) if digits.starts_with('1') => {
                Some((&digits[1..4], &digits[4..7], &digits[7..11]))
            }
            _ => None,
        };

        match parts {
            Some((area, prefix, line)) => format!("+1-{area}-{prefix}-{line}"),
            None => raw.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parish() -> PhoneFormatter {
        PhoneFormatter::new(PhoneFormat::Parish, "876")
    }

    fn north_american() -> PhoneFormatter {
        PhoneFormatter::new(PhoneFormat::NorthAmerican, "876")
    }

    #[test]
    fn parish_format_pins_the_area_code() {
        let formatter = parish();
        assert_eq!(formatter.format("965-1234"), "+1-876-965-1234");
        assert_eq!(formatter.format("(876) 965 1234"), "+1-876-965-1234");
        assert_eq!(formatter.format("1 876 965 1234"), "+1-876-965-1234");
        assert_eq!(formatter.format("658-965-1234"), "+1-876-965-1234");
    }

    #[test]
    fn parish_format_requires_local_country_prefix_for_eleven_digits() {
        assert_eq!(parish().format(" 1-658-965-1234 "), "1-658-965-1234");
    }

    #[test]
    fn north_american_format_keeps_area_code() {
        let formatter = north_american();
        assert_eq!(formatter.format("9651234"), "+1-876-965-1234");
        assert_eq!(formatter.format("658.965.1234"), "+1-658-965-1234");
        assert_eq!(formatter.format("+1 (658) 965-1234"), "+1-658-965-1234");
    }

    #[test]
    fn unrecognized_lengths_pass_through_trimmed() {
        for formatter in [parish(), north_american()] {
            assert_eq!(formatter.format("  965-123 "), "965-123");
            assert_eq!(
                formatter.format("876-965-1234 / 876-965-9999"),
                "876-965-1234 / 876-965-9999"
            );
            assert_eq!(formatter.format("2-876-965-1234"), "2-876-965-1234");
            assert_eq!(formatter.format(""), "");
        }
    }

    #[test]
    fn format_names_parse_back() {
        for format in [PhoneFormat::Parish, PhoneFormat::NorthAmerican] {
            assert_eq!(PhoneFormat::parse(format.label()), Some(format));
        }
        assert_eq!(PhoneFormat::parse("e164"), None);
    }
}
