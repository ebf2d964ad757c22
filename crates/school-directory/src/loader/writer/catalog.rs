use super::{CONSTANTS_FILE, MODULE_FILE};
use crate::loader::normalizer::normalize_name;
use crate::loader::LoaderError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// Sidecar written next to every generated entity.
pub const SIDECAR_FILE: &str = "entity.json";

/// Declaration in `constants.ts` that carries the username.
const USERNAME_DECLARATION: &str = "ORG_USERNAME =";

/// Suffixes tried against existing display names when matching by name.
const NAME_SUFFIXES: &[&str] = &[" School", " Primary School", " High School", " College"];

/// Contents of `entity.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMeta {
    pub export_const: String,
    pub display_name: String,
    pub org_username: String,
    #[serde(default)]
    pub code: String,
}

/// An entity directory together with its sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub dir_name: String,
    pub meta: EntityMeta,
}

/// Scans the immediate subdirectories of `base_dir`. A missing base directory is an
/// empty catalog. Directories without a sidecar are read from their `index.ts`
/// instead; anything still unreadable is left out with a warning.
pub fn discover(base_dir: &Path) -> Result<Vec<CatalogEntry>, LoaderError> {
    let read_dir = match fs::read_dir(base_dir) {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(LoaderError::io(base_dir, source)),
    };

    let mut dirs = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| LoaderError::io(base_dir, source))?;
        let file_type = entry
            .file_type()
            .map_err(|source| LoaderError::io(entry.path(), source))?;
        if file_type.is_dir() {
            dirs.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    dirs.sort();

    let mut entries = Vec::with_capacity(dirs.len());
    for dir_name in dirs {
        let dir = base_dir.join(&dir_name);
        match read_entity(&dir, &dir_name) {
            Ok(meta) => entries.push(CatalogEntry { dir_name, meta }),
            Err(reason) => {
                warn!(
                    directory = %dir_name,
                    path = %dir.display(),
                    %reason,
                    "skipping entity directory without usable metadata"
                );
            }
        }
    }

    sort_entries(&mut entries);
    Ok(entries)
}

pub(crate) fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| {
        a.meta
            .export_const
            .cmp(&b.meta.export_const)
            .then_with(|| a.dir_name.cmp(&b.dir_name))
    });
}

fn read_entity(dir: &Path, dir_name: &str) -> Result<EntityMeta, String> {
    match fs::read_to_string(dir.join(SIDECAR_FILE)) {
        Ok(raw) => parse_sidecar(&raw),
        Err(err) if err.kind() == ErrorKind::NotFound => read_module_source(dir, dir_name),
        Err(err) => Err(err.to_string()),
    }
}

fn parse_sidecar(raw: &str) -> Result<EntityMeta, String> {
    let meta: EntityMeta = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    if meta.export_const.trim().is_empty() {
        return Err("sidecar has an empty exportConst".to_string());
    }
    Ok(meta)
}

/// Metadata for an entity written before sidecars existed, or maintained by hand:
/// the first exported constant and its `name`/`code` fields, with the username taken
/// from `constants.ts` when present.
fn read_module_source(dir: &Path, dir_name: &str) -> Result<EntityMeta, String> {
    let source = fs::read_to_string(dir.join(MODULE_FILE))
        .map_err(|err| format!("no {SIDECAR_FILE} and no readable {MODULE_FILE}: {err}"))?;
    let export_const = first_export_const(&source)
        .ok_or_else(|| format!("no {SIDECAR_FILE} and no exported constant in {MODULE_FILE}"))?;

    let org_username = fs::read_to_string(dir.join(CONSTANTS_FILE))
        .ok()
        .and_then(|constants| {
            let at = constants.find(USERNAME_DECLARATION)?;
            string_literal(&constants[at + USERNAME_DECLARATION.len()..])
        })
        .filter(|username| !username.is_empty())
        .unwrap_or_else(|| dir_name.to_string());

    Ok(EntityMeta {
        export_const,
        display_name: quoted_field(&source, "name").unwrap_or_default(),
        org_username,
        code: quoted_field(&source, "code").unwrap_or_default(),
    })
}

fn first_export_const(source: &str) -> Option<String> {
    const MARKER: &str = "export const ";
    let at = source.find(MARKER)?;
    let name: String = source[at + MARKER.len()..]
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    (!name.is_empty()).then_some(name)
}

/// First `key: "..."` property whose key is not the tail of a longer identifier.
fn quoted_field(source: &str, key: &str) -> Option<String> {
    let pattern = format!("{key}:");
    source.match_indices(&pattern).find_map(|(at, _)| {
        let standalone = source[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'));
        if standalone {
            string_literal(&source[at + pattern.len()..])
        } else {
            None
        }
    })
}

/// Decodes the single- or double-quoted literal at the start of `text`.
fn string_literal(text: &str) -> Option<String> {
    let text = text.trim_start();
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;

    let mut value = String::new();
    let mut escaped = false;
    for c in text[1..].chars() {
        if escaped {
            value.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(value);
        } else {
            value.push(c);
        }
    }
    None
}

/// Pretty JSON with a trailing newline, as written to disk.
pub(crate) fn render_sidecar(meta: &EntityMeta) -> Result<String, serde_json::Error> {
    let mut rendered = serde_json::to_string_pretty(meta)?;
    rendered.push('\n');
    Ok(rendered)
}

/// Normalized keys an existing display name answers to.
pub(crate) fn name_variants(display_name: &str) -> Vec<String> {
    let base = normalize_name(display_name);
    if base.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![base.clone()];
    for suffix in NAME_SUFFIXES {
        let suffix = normalize_name(suffix);
        variants.push(format!("{base} {suffix}"));
        if let Some(stripped) = base.strip_suffix(&format!(" {suffix}")) {
            if !stripped.is_empty() {
                variants.push(stripped.to_string());
            }
        }
    }

    let mut seen = HashSet::new();
    variants.retain(|variant| seen.insert(variant.clone()));
    variants
}

/// Export-name and normalized-name indexes over a sector's entities.
#[derive(Debug, Default)]
pub struct EntityLookup {
    entries: Vec<CatalogEntry>,
    by_export: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl EntityLookup {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut lookup = Self::default();
        for entry in entries {
            lookup.insert(entry);
        }
        lookup
    }

    /// Adds or replaces the entry stored under the same directory.
    pub fn insert(&mut self, entry: CatalogEntry) {
        let slot = match self
            .entries
            .iter()
            .position(|existing| existing.dir_name == entry.dir_name)
        {
            Some(slot) => {
                self.entries[slot] = entry;
                slot
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };

        let meta = &self.entries[slot].meta;
        self.by_export.insert(meta.export_const.clone(), slot);

        let mut variants = name_variants(&meta.display_name).into_iter();
        if let Some(exact) = variants.next() {
            self.by_name.insert(exact, slot);
        }
        for variant in variants {
            self.by_name.entry(variant).or_insert(slot);
        }
    }

    /// Export constant first, then the normalized school name.
    pub fn find(&self, export_const: &str, name: &str) -> Option<&CatalogEntry> {
        self.by_export
            .get(export_const)
            .or_else(|| self.by_name.get(&normalize_name(name)))
            .map(|slot| &self.entries[*slot])
    }

    pub fn contains_dir(&self, dir_name: &str) -> bool {
        self.entries.iter().any(|entry| entry.dir_name == dir_name)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}
