use super::normalizer::normalize_whitespace;
use super::reader::RawCsvRow;
use super::LoaderError;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    Public,
    Private,
}

impl Ownership {
    pub const fn ordered() -> [Self; 2] {
        [Self::Public, Self::Private]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }

    /// Directory segment for the sector under the region root.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    pub const fn base_tag(self) -> &'static str {
        match self {
            Self::Public => "public-school",
            Self::Private => "private-school",
        }
    }

    /// Capitalizes the raw value and accepts only the two sector labels.
    pub fn parse(raw: &str) -> Option<Self> {
        match capitalize(raw).as_str() {
            "Public" => Some(Self::Public),
            "Private" => Some(Self::Private),
            _ => None,
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// One school per row with a non-empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    pub school_name: String,
    pub address: String,
    pub phone: String,
    pub ownership: Ownership,
    pub type_label: String,
    pub code: String,
    pub email: String,
}

/// A row dropped because its ownership column is neither sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub row: usize,
    pub school_name: String,
    pub ownership: String,
}

#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub records: Vec<CanonicalRecord>,
    pub dropped: usize,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    SchoolName,
    Address,
    Phone,
    Ownership,
    Type,
    Code,
    Email,
}

impl Column {
    const fn ordered() -> [Self; 7] {
        [
            Self::SchoolName,
            Self::Address,
            Self::Phone,
            Self::Ownership,
            Self::Type,
            Self::Code,
            Self::Email,
        ]
    }

    /// Header labels accepted for the column; the first one is reported when missing.
    const fn labels(self) -> &'static [&'static str] {
        match self {
            Self::SchoolName => &["School Name"],
            Self::Address => &["Address"],
            Self::Phone => &["Number", "Phone Number", "Telephone"],
            Self::Ownership => &["Ownership Type", "Ownership"],
            Self::Type => &["Type"],
            Self::Code => &["MOEY Code", "Code"],
            Self::Email => &["Email", "Email Address"],
        }
    }
}

#[derive(Debug)]
struct HeaderIndex {
    positions: [usize; 7],
}

impl HeaderIndex {
    fn from_header(header: &[String]) -> Result<Self, LoaderError> {
        let normalized: Vec<String> = header.iter().map(|h| normalize_whitespace(h)).collect();
        let mut positions = [0; 7];

        for (slot, column) in Column::ordered().into_iter().enumerate() {
            let labels = column.labels();
            positions[slot] = normalized
                .iter()
                .position(|h| labels.contains(&h.as_str()))
                .ok_or_else(|| LoaderError::MissingColumn {
                    column: labels[0].to_string(),
                })?;
        }

        Ok(Self { positions })
    }

    fn cell(&self, row: &[String], column: Column) -> String {
        row.get(self.positions[column as usize])
            .map(|value| normalize_whitespace(value))
            .unwrap_or_default()
    }
}

/// Maps header-labelled rows to canonical records. The first row must be the header.
pub(crate) fn normalize_rows(rows: &[RawCsvRow]) -> Result<NormalizedBatch, LoaderError> {
    let (header, data) = rows.split_first().ok_or(LoaderError::EmptyCsv)?;
    let index = HeaderIndex::from_header(header)?;
    let mut batch = NormalizedBatch::default();

    for (offset, row) in data.iter().enumerate() {
        let school_name = index.cell(row, Column::SchoolName);
        if school_name.is_empty() {
            batch.dropped += 1;
            continue;
        }

        let raw_ownership = index.cell(row, Column::Ownership);
        let Some(ownership) = Ownership::parse(&raw_ownership) else {
            // header is line 1
            let row_number = offset + 2;
            warn!(
                row = row_number,
                school = %school_name,
                ownership = %raw_ownership,
                "rejecting record with unrecognized ownership type"
            );
            batch.rejected.push(RejectedRecord {
                row: row_number,
                school_name,
                ownership: raw_ownership,
            });
            continue;
        };

        batch.records.push(CanonicalRecord {
            school_name,
            address: index.cell(row, Column::Address),
            phone: index.cell(row, Column::Phone),
            ownership,
            type_label: index.cell(row, Column::Type),
            code: index.cell(row, Column::Code),
            email: index.cell(row, Column::Email),
        });
    }

    Ok(batch)
}
