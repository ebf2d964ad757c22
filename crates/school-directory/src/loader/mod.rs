//! CSV-to-module pipeline for school registry exports.
//!
//! Rows flow reader -> record normalizer -> transformer -> writer. The writer reads
//! back what earlier runs generated, so re-running with the same input is a no-op
//! unless `overwrite` is set.

mod normalizer;
pub mod reader;
pub mod record;
pub mod transform;
pub mod writer;

use crate::config::LoaderConfig;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

pub use record::{CanonicalRecord, NormalizedBatch, Ownership, RejectedRecord};
pub use transform::{
    AddressCleanup, PhoneFormat, PhoneFormatter, TransformedModule, Transformer,
};
pub use writer::catalog::{CatalogEntry, EntityMeta};
pub use writer::{ModuleWriter, RecordOutcome, SectorReport, SectorTarget, WriteOptions};

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("empty CSV: no header row found")]
    EmptyCsv,
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },
    #[error("could not encode entity metadata for {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoaderError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Everything a run needs; usually built from [`LoaderConfig`] plus CLI overrides.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub input: PathBuf,
    pub output_root: PathBuf,
    pub region: String,
    pub phone_format: PhoneFormat,
    pub area_code: String,
    pub address_cleanup: AddressCleanup,
    pub dry_run: bool,
    pub overwrite: bool,
}

impl LoadOptions {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            input: config.input.clone(),
            output_root: config.output_root.clone(),
            region: config.region.clone(),
            phone_format: config.phone_format,
            area_code: config.area_code.clone(),
            address_cleanup: config.address_cleanup,
            dry_run: false,
            overwrite: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub records: usize,
    pub dropped: usize,
    pub rejected: Vec<RejectedRecord>,
    pub sectors: Vec<SectorReport>,
}

impl LoadSummary {
    pub fn count(&self, label: &str) -> usize {
        self.sectors.iter().map(|sector| sector.count(label)).sum()
    }
}

/// Entities currently on disk for one sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorCatalog {
    pub target: SectorTarget,
    pub entries: Vec<CatalogEntry>,
}

#[derive(Debug)]
pub struct SchoolLoader {
    options: LoadOptions,
}

impl SchoolLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn run(&self) -> Result<LoadSummary, LoaderError> {
        let path = &self.options.input;
        let file = File::open(path).map_err(|source| LoaderError::io(path, source))?;
        info!(input = %path.display(), "loading school registry export");
        self.run_from_reader(file)
    }

    /// Parses and normalizes the whole input before touching the output tree, so a
    /// malformed header aborts with nothing written.
    pub fn run_from_reader<R: Read>(&self, reader: R) -> Result<LoadSummary, LoaderError> {
        let rows = reader::read_rows(reader)?;
        let batch = record::normalize_rows(&rows)?;
        let transformer = Transformer::new(
            PhoneFormatter::new(self.options.phone_format, self.options.area_code.clone()),
            self.options.address_cleanup.cleaner(&self.options.region),
        );

        let options = WriteOptions {
            dry_run: self.options.dry_run,
            overwrite: self.options.overwrite,
        };

        let mut sectors = Vec::new();
        for sector in Ownership::ordered() {
            let modules: Vec<TransformedModule> = batch
                .records
                .iter()
                .filter(|record| record.ownership == sector)
                .map(|record| transformer.transform(record))
                .collect();

            let target = self.sector_target(sector);
            let report = ModuleWriter::new(&target, options).reconcile(&modules)?;
            sectors.push(report);
        }

        let summary = LoadSummary {
            records: batch.records.len(),
            dropped: batch.dropped,
            rejected: batch.rejected,
            sectors,
        };
        info!(
            records = summary.records,
            dropped = summary.dropped,
            rejected = summary.rejected.len(),
            created = summary.count("created"),
            overwritten = summary.count("overwritten"),
            skipped = summary.count("skipped"),
            "load complete"
        );
        Ok(summary)
    }

    pub fn sector_target(&self, sector: Ownership) -> SectorTarget {
        SectorTarget::new(&self.options.output_root, &self.options.region, sector)
    }

    /// What is on disk right now, per sector, without reading any input.
    pub fn catalog(&self) -> Result<Vec<SectorCatalog>, LoaderError> {
        Ownership::ordered()
            .into_iter()
            .map(|sector| {
                let target = self.sector_target(sector);
                let entries = writer::catalog::discover(&target.base_dir)?;
                Ok(SectorCatalog { target, entries })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn options(root: &Path) -> LoadOptions {
        LoadOptions {
            input: root.join("missing.csv"),
            output_root: root.to_path_buf(),
            region: "St. Elizabeth".to_string(),
            phone_format: PhoneFormat::Parish,
            area_code: "876".to_string(),
            address_cleanup: AddressCleanup::ParishSuffix,
            dry_run: false,
            overwrite: false,
        }
    }

    #[test]
    fn missing_input_file_is_an_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let error = SchoolLoader::new(options(temp.path()))
            .run()
            .expect_err("missing input");
        match error {
            LoaderError::Io { path, .. } => assert!(path.ends_with("missing.csv")),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_aborts_before_writing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let error = SchoolLoader::new(options(temp.path()))
            .run_from_reader(Cursor::new(""))
            .expect_err("empty csv");
        assert!(matches!(error, LoaderError::EmptyCsv));
        assert!(!temp.path().join("st-elizabeth").exists());
    }

    #[test]
    fn rejected_and_dropped_rows_are_counted() {
        let temp = tempfile::tempdir().expect("tempdir");
        let csv = "School Name,Address,Number,Ownership Type,Type,MOEY Code,Email\n\
,,,Public,,,\n\
Unknown,,,Church,,,\n\
Siloah Primary,Siloah,9651234,Public,Primary,11045,\n";
        let summary = SchoolLoader::new(options(temp.path()))
            .run_from_reader(Cursor::new(csv))
            .expect("load");

        assert_eq!(summary.records, 1);
        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.rejected.len(), 1);
        assert_eq!(summary.count("created"), 1);
    }

    #[test]
    fn error_messages_name_the_problem() {
        let error = LoaderError::MissingColumn {
            column: "Email".to_string(),
        };
        assert_eq!(error.to_string(), "missing required column 'Email'");
        assert_eq!(
            LoaderError::EmptyCsv.to_string(),
            "empty CSV: no header row found"
        );
    }
}
