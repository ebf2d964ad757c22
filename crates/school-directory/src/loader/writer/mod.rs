pub mod catalog;
mod render;

use super::record::Ownership;
use super::transform::{identifier_stem, TransformedModule};
use super::LoaderError;
use catalog::{discover, CatalogEntry, EntityLookup, EntityMeta, SIDECAR_FILE};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CONSTANTS_FILE: &str = "constants.ts";
pub const MODULE_FILE: &str = "index.ts";
pub const BARREL_FILE: &str = "index.ts";

/// Where one sector's entities and barrel live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorTarget {
    pub sector: Ownership,
    pub base_dir: PathBuf,
    pub barrel_const: String,
    pub region: String,
}

impl SectorTarget {
    /// `<output_root>/<region-slug>/<sector>` with a `<REGION>_<SECTOR>_SCHOOLS` barrel.
    pub fn new(output_root: &Path, region: &str, sector: Ownership) -> Self {
        let region_stem = identifier_stem(region);
        let barrel_const = if region_stem.is_empty() {
            format!("{}_SCHOOLS", identifier_stem(sector.label()))
        } else {
            format!("{region_stem}_{}_SCHOOLS", identifier_stem(sector.label()))
        };

        Self {
            sector,
            base_dir: output_root.join(region_slug(region)).join(sector.slug()),
            barrel_const,
            region: region.to_string(),
        }
    }

    pub fn barrel_path(&self) -> PathBuf {
        self.base_dir.join(BARREL_FILE)
    }
}

/// "St. Elizabeth" becomes "st-elizabeth".
pub fn region_slug(region: &str) -> String {
    identifier_stem(region).to_ascii_lowercase().replace('_', "-")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub dry_run: bool,
    pub overwrite: bool,
}

/// What happened to one incoming module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Created { dir_name: String, meta: EntityMeta },
    Overwritten { dir_name: String, meta: EntityMeta },
    Skipped { dir_name: String, meta: EntityMeta },
    /// A second input record resolved to an entity already handled in this run.
    Duplicate { name: String, dir_name: String },
    /// Neither the slug nor the export constant yielded a directory name.
    Unnamed { name: String },
}

impl RecordOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Overwritten { .. } => "overwritten",
            Self::Skipped { .. } => "skipped",
            Self::Duplicate { .. } => "duplicate",
            Self::Unnamed { .. } => "unnamed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorReport {
    pub sector: Ownership,
    pub base_dir: PathBuf,
    pub outcomes: Vec<RecordOutcome>,
    /// Entities listed in the regenerated barrel.
    pub barrel_entries: Vec<CatalogEntry>,
    pub barrel_changed: bool,
}

impl SectorReport {
    pub fn count(&self, label: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.label() == label)
            .count()
    }
}

/// Reconciles one sector's modules with the directory tree.
#[derive(Debug)]
pub struct ModuleWriter<'a> {
    target: &'a SectorTarget,
    options: WriteOptions,
}

impl<'a> ModuleWriter<'a> {
    pub fn new(target: &'a SectorTarget, options: WriteOptions) -> Self {
        Self { target, options }
    }

    pub fn reconcile(&self, modules: &[TransformedModule]) -> Result<SectorReport, LoaderError> {
        let existing = discover(&self.target.base_dir)?;
        self.record_missing_sidecars(&existing)?;
        let mut lookup = EntityLookup::from_entries(existing);
        let mut claimed = HashSet::new();
        let mut outcomes = Vec::with_capacity(modules.len());

        for module in modules {
            outcomes.push(self.write_module(module, &mut lookup, &mut claimed)?);
        }

        let (barrel_entries, barrel_changed) =
            self.regenerate_barrel(&lookup, !modules.is_empty())?;

        let report = SectorReport {
            sector: self.target.sector,
            base_dir: self.target.base_dir.clone(),
            outcomes,
            barrel_entries,
            barrel_changed,
        };
        info!(
            sector = self.target.sector.label(),
            created = report.count("created"),
            overwritten = report.count("overwritten"),
            skipped = report.count("skipped"),
            barrel_entries = report.barrel_entries.len(),
            dry_run = self.options.dry_run,
            "sector reconciled"
        );

        Ok(report)
    }

    /// Decides skip or write for one module and keeps `lookup` and `claimed` current.
    pub fn write_module(
        &self,
        module: &TransformedModule,
        lookup: &mut EntityLookup,
        claimed: &mut HashSet<String>,
    ) -> Result<RecordOutcome, LoaderError> {
        let existing = lookup.find(&module.export_const, &module.name).cloned();

        let (dir_name, export_const, is_existing) = match existing {
            Some(entry) if claimed.contains(&entry.dir_name) => {
                warn!(
                    school = %module.name,
                    directory = %entry.dir_name,
                    "input repeats a school already handled in this run"
                );
                return Ok(RecordOutcome::Duplicate {
                    name: module.name.clone(),
                    dir_name: entry.dir_name,
                });
            }
            Some(entry) if !self.options.overwrite => {
                info!(
                    school = %module.name,
                    directory = %entry.dir_name,
                    "skipping existing entity"
                );
                claimed.insert(entry.dir_name.clone());
                return Ok(RecordOutcome::Skipped {
                    dir_name: entry.dir_name,
                    meta: entry.meta,
                });
            }
            Some(entry) => (entry.dir_name, entry.meta.export_const, true),
            None => {
                let Some(dir_name) = self.allocate_dir(module, lookup, claimed) else {
                    warn!(school = %module.name, "no usable directory name for school");
                    return Ok(RecordOutcome::Unnamed {
                        name: module.name.clone(),
                    });
                };
                (dir_name, module.export_const.clone(), false)
            }
        };

        let meta = EntityMeta {
            export_const,
            display_name: module.name.clone(),
            org_username: if module.org_username.is_empty() {
                dir_name.clone()
            } else {
                module.org_username.clone()
            },
            code: module.code.clone(),
        };
        self.write_entity_files(&dir_name, &meta, module)?;

        claimed.insert(dir_name.clone());
        lookup.insert(CatalogEntry {
            dir_name: dir_name.clone(),
            meta: meta.clone(),
        });

        Ok(if is_existing {
            RecordOutcome::Overwritten { dir_name, meta }
        } else {
            RecordOutcome::Created { dir_name, meta }
        })
    }

    /// Slug-based directory for a new entity, suffixed `-2`, `-3`, ... when taken.
    fn allocate_dir(
        &self,
        module: &TransformedModule,
        lookup: &EntityLookup,
        claimed: &HashSet<String>,
    ) -> Option<String> {
        let base = if module.org_username.is_empty() {
            identifier_stem(&module.name)
                .to_ascii_lowercase()
                .replace('_', "-")
        } else {
            module.org_username.clone()
        };
        if base.is_empty() {
            return None;
        }

        let taken = |candidate: &str| {
            claimed.contains(candidate)
                || lookup.contains_dir(candidate)
                || self.target.base_dir.join(candidate).exists()
        };

        if !taken(&base) {
            return Some(base);
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !taken(candidate))
    }

    /// Gives entities that were discovered from their module source a sidecar, so
    /// later runs read the same metadata back.
    fn record_missing_sidecars(&self, entries: &[CatalogEntry]) -> Result<(), LoaderError> {
        for entry in entries {
            let path = self.target.base_dir.join(&entry.dir_name).join(SIDECAR_FILE);
            if path.exists() {
                continue;
            }
            if self.options.dry_run {
                info!(
                    directory = %entry.dir_name,
                    "dry run: would record metadata for existing entity"
                );
                continue;
            }

            let contents = catalog::render_sidecar(&entry.meta).map_err(|source| {
                LoaderError::Metadata {
                    path: path.clone(),
                    source,
                }
            })?;
            write_if_changed(&path, &contents)?;
            info!(
                directory = %entry.dir_name,
                export_const = %entry.meta.export_const,
                "recorded metadata for existing entity"
            );
        }
        Ok(())
    }

    fn write_entity_files(
        &self,
        dir_name: &str,
        meta: &EntityMeta,
        module: &TransformedModule,
    ) -> Result<(), LoaderError> {
        let dir = self.target.base_dir.join(dir_name);
        let sidecar = catalog::render_sidecar(meta).map_err(|source| LoaderError::Metadata {
            path: dir.join(SIDECAR_FILE),
            source,
        })?;
        let files = [
            (CONSTANTS_FILE, render::render_constants(&meta.org_username)),
            (
                MODULE_FILE,
                render::render_module(&meta.export_const, module, &self.target.region),
            ),
            (SIDECAR_FILE, sidecar),
        ];

        if self.options.dry_run {
            info!(
                school = %module.name,
                directory = %dir.display(),
                "dry run: would write entity files"
            );
            return Ok(());
        }

        fs::create_dir_all(&dir).map_err(|source| LoaderError::io(&dir, source))?;
        for (file_name, contents) in files {
            let path = dir.join(file_name);
            let changed = write_if_changed(&path, &contents)?;
            debug!(path = %path.display(), changed, "entity file written");
        }
        info!(school = %module.name, directory = %dir_name, "wrote entity");
        Ok(())
    }

    /// Re-scans the sector and rewrites the barrel from what is actually on disk.
    /// Dry runs list the in-memory view instead since nothing new was written.
    fn regenerate_barrel(
        &self,
        lookup: &EntityLookup,
        had_input: bool,
    ) -> Result<(Vec<CatalogEntry>, bool), LoaderError> {
        if !had_input && !self.target.base_dir.exists() {
            return Ok((Vec::new(), false));
        }

        let path = self.target.barrel_path();
        if self.options.dry_run {
            let mut entries = lookup.entries().to_vec();
            catalog::sort_entries(&mut entries);
            info!(
                path = %path.display(),
                entries = entries.len(),
                "dry run: would regenerate barrel"
            );
            return Ok((entries, false));
        }

        let entries = discover(&self.target.base_dir)?;
        let contents = render::render_barrel(&self.target.barrel_const, &entries);
        fs::create_dir_all(&self.target.base_dir)
            .map_err(|source| LoaderError::io(&self.target.base_dir, source))?;
        let changed = write_if_changed(&path, &contents)?;
        info!(
            path = %path.display(),
            entries = entries.len(),
            changed,
            "barrel regenerated"
        );
        Ok((entries, changed))
    }
}

/// Writes only when the contents differ; returns whether the file changed.
fn write_if_changed(path: &Path, contents: &str) -> Result<bool, LoaderError> {
    match fs::read_to_string(path) {
        Ok(current) if current == contents => return Ok(false),
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(source) => return Err(LoaderError::io(path, source)),
    }

    fs::write(path, contents).map_err(|source| LoaderError::io(path, source))?;
    Ok(true)
}
