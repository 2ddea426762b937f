//! Checklist definitions per regulatory pathway

use crate::error::{CheckerError, Result};
use crate::processing::pathway::Pathway;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One required informational field of a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecklistField {
    pub id: String,
    pub question: String,
    pub key_phrases: Vec<String>,
}

impl ChecklistField {
    pub fn new(id: &str, question: &str, key_phrases: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            question: question.to_string(),
            key_phrases: key_phrases.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Template-style field: the name doubles as id, question and sole key phrase.
    pub fn from_name(name: &str) -> Self {
        Self::new(name, name, &[name])
    }
}

/// A checklist file entry is either a full record or a bare field name.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChecklistEntry {
    Field(ChecklistField),
    Name(String),
}

impl From<ChecklistEntry> for ChecklistField {
    fn from(entry: ChecklistEntry) -> Self {
        match entry {
            ChecklistEntry::Field(field) => field,
            ChecklistEntry::Name(name) => ChecklistField::from_name(name.trim()),
        }
    }
}

/// Supplies the ordered field list for a pathway.
pub trait ChecklistSource: Send + Sync {
    fn load(&self, pathway: Pathway) -> Result<Vec<ChecklistField>>;
}

/// Parse and validate a checklist document. `origin` only labels error messages.
pub fn parse_checklist(content: &str, origin: &str) -> Result<Vec<ChecklistField>> {
    let entries: Vec<ChecklistEntry> = serde_json::from_str(content)
        .map_err(|e| CheckerError::Configuration(format!("Invalid checklist {}: {}", origin, e)))?;

    let fields: Vec<ChecklistField> = entries.into_iter().map(ChecklistField::from).collect();
    validate_checklist(&fields, origin)?;
    Ok(fields)
}

pub fn validate_checklist(fields: &[ChecklistField], origin: &str) -> Result<()> {
    if fields.is_empty() {
        return Err(CheckerError::Configuration(format!("Checklist {} has no fields", origin)));
    }

    let mut seen = HashSet::new();
    for (position, field) in fields.iter().enumerate() {
        let id = field.id.trim();
        if id.is_empty() {
            return Err(CheckerError::Configuration(format!(
                "Checklist {}: field #{} has an empty id",
                origin,
                position + 1
            )));
        }
        if !seen.insert(id) {
            return Err(CheckerError::Configuration(format!(
                "Checklist {}: duplicate field id '{}'",
                origin, id
            )));
        }
        if !field.key_phrases.iter().any(|p| !p.trim().is_empty()) {
            return Err(CheckerError::Configuration(format!(
                "Checklist {}: field '{}' has no key phrases",
                origin, id
            )));
        }
    }

    Ok(())
}

/// Checklists compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinChecklists;

impl BuiltinChecklists {
    fn resource(pathway: Pathway) -> &'static str {
        match pathway {
            Pathway::PremarketNotification => include_str!("../resources/checklists/510k.json"),
            Pathway::DeNovo => include_str!("../resources/checklists/denovo.json"),
            Pathway::PremarketApproval => include_str!("../resources/checklists/pma.json"),
        }
    }
}

impl ChecklistSource for BuiltinChecklists {
    fn load(&self, pathway: Pathway) -> Result<Vec<ChecklistField>> {
        parse_checklist(Self::resource(pathway), &format!("builtin:{}", pathway))
    }
}

/// Checklists read from `<dir>/<pathway>.json` on every load.
#[derive(Debug, Clone)]
pub struct DirectoryChecklists {
    dir: PathBuf,
}

impl DirectoryChecklists {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, pathway: Pathway) -> PathBuf {
        self.dir.join(format!("{}.json", pathway.id()))
    }
}

impl ChecklistSource for DirectoryChecklists {
    fn load(&self, pathway: Pathway) -> Result<Vec<ChecklistField>> {
        let path = self.path_for(pathway);
        debug!("Loading checklist from {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| {
            CheckerError::Configuration(format!("Cannot read checklist {}: {}", path.display(), e))
        })?;

        parse_checklist(&content, &path.display().to_string())
    }
}
