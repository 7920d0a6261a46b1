//! Card file validation.
//!
//! Checks card JSON against the card schema and reports every violation in a
//! file rather than stopping at the first one. Works on untyped JSON so that
//! hand-edited or foreign files can be diagnosed field by field.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use strum::VariantNames;
use tracing::{error, info};

use crate::card::{AbilityType, AttackChance, AttackType, Rarity, MAX_MOVES};
use crate::error::Result;

pub const REQUIRED_FIELDS: &[&str] = &[
    "name",
    "username",
    "followers",
    "following",
    "isBlueCheck",
    "profilePic",
    "profileBanner",
    "title",
    "weakness",
    "resists",
    "createdOn",
    "rarity",
    "hp",
    "abilities",
    "attacks",
];

const DATA_IMAGE_PREFIX: &str = "data:image";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "\"{}\" {}", self.field, self.message)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub violations: Vec<Violation>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    pub reports: Vec<FileReport>,
}

impl ValidationSummary {
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_valid()).count()
    }

    pub fn all_valid(&self) -> bool {
        self.failed() == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_valid() {
            0
        } else {
            1
        }
    }
}

struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    fn string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) {
        if let Some(v) = obj.get(key) {
            if !v.is_string() {
                self.push(path, "must be a string");
            }
        }
    }

    fn number(&mut self, obj: &Map<String, Value>, key: &str, path: &str, non_negative: bool) {
        if let Some(v) = obj.get(key) {
            match v.as_f64() {
                None => self.push(path, "must be a number"),
                Some(n) if non_negative && n < 0.0 => self.push(path, "must not be negative"),
                Some(_) => {}
            }
        }
    }

    fn one_of(&mut self, value: Option<&Value>, path: &str, options: &[&str]) {
        let ok = value
            .and_then(|v| v.as_str())
            .is_some_and(|s| options.contains(&s));
        if !ok {
            self.push(path, format!("must be one of: {}", options.join(", ")));
        }
    }

    fn data_image(&mut self, obj: &Map<String, Value>, key: &str) {
        if let Some(v) = obj.get(key) {
            let ok = v.as_str().is_some_and(|s| s.starts_with(DATA_IMAGE_PREFIX));
            if !ok {
                self.push(key, "must be a data URL starting with 'data:image'");
            }
        }
    }

    fn affinity(&mut self, obj: &Map<String, Value>, key: &str) {
        let Some(v) = obj.get(key) else {
            return;
        };
        let Some(aff) = v.as_object() else {
            self.push(key, "must be an object");
            return;
        };

        let amount_path = format!("{}.amount", key);
        match aff.get("amount").and_then(|a| a.as_f64()) {
            None => self.push(amount_path, "must be a number"),
            Some(n) if !(0.0..=100.0).contains(&n) => self.push(amount_path, "must be between 0 and 100"),
            Some(_) => {}
        }
        self.one_of(aff.get("type"), &format!("{}.type", key), AttackType::VARIANTS);
    }

    fn created_on(&mut self, obj: &Map<String, Value>) {
        let Some(v) = obj.get("createdOn") else {
            return;
        };
        let ok = v.as_str().is_some_and(|s| {
            DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        });
        if !ok {
            self.push("createdOn", "must be a valid date string");
        }
    }

    fn moves(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        check_entry: fn(&mut Checker, &Map<String, Value>, &str),
    ) {
        let Some(v) = obj.get(key) else {
            return;
        };
        let Some(entries) = v.as_array() else {
            self.push(key, "must be an array");
            return;
        };
        if entries.len() > MAX_MOVES {
            self.push(key, format!("can have a maximum of {} items", MAX_MOVES));
            return;
        }
        for (index, entry) in entries.iter().enumerate() {
            let path = format!("{}[{}]", key, index);
            match entry.as_object() {
                Some(entry) => check_entry(self, entry, &path),
                None => self.push(path, "must be an object"),
            }
        }
    }

    fn ability(&mut self, entry: &Map<String, Value>, path: &str) {
        self.required_string(entry, "name", path);
        self.one_of(entry.get("type"), &format!("{}.type", path), AbilityType::VARIANTS);
        self.required_string(entry, "description", path);
    }

    fn attack(&mut self, entry: &Map<String, Value>, path: &str) {
        self.required_string(entry, "name", path);
        self.one_of(entry.get("type"), &format!("{}.type", path), AttackType::VARIANTS);
        if !entry.get("damage").is_some_and(|d| d.is_number()) {
            self.push(format!("{}.damage", path), "must be a number");
        }
        self.one_of(entry.get("chance"), &format!("{}.chance", path), AttackChance::VARIANTS);
        self.required_string(entry, "description", path);
    }

    fn required_string(&mut self, entry: &Map<String, Value>, key: &str, path: &str) {
        if !entry.get(key).is_some_and(|v| v.is_string()) {
            self.push(format!("{}.{}", path, key), "must be a string");
        }
    }
}

/// Validate one parsed card. Returns every violation found.
pub fn validate_card_value(value: &Value) -> Vec<Violation> {
    let mut c = Checker {
        violations: Vec::new(),
    };

    let Some(obj) = value.as_object() else {
        c.push("", "card must be a JSON object");
        return c.violations;
    };

    for field in REQUIRED_FIELDS {
        if !obj.contains_key(*field) {
            c.push(*field, "is a required field and is missing");
        }
    }

    c.string(obj, "name", "name");
    c.string(obj, "username", "username");
    c.string(obj, "title", "title");
    c.number(obj, "followers", "followers", true);
    c.number(obj, "following", "following", true);
    if obj.get("isBlueCheck").is_some_and(|v| !v.is_boolean()) {
        c.push("isBlueCheck", "must be a boolean");
    }
    c.data_image(obj, "profilePic");
    c.data_image(obj, "profileBanner");
    c.affinity(obj, "weakness");
    c.affinity(obj, "resists");
    c.created_on(obj);
    if obj.contains_key("rarity") {
        c.one_of(obj.get("rarity"), "rarity", Rarity::VARIANTS);
    }
    if obj.get("hp").is_some_and(|v| !v.is_null() && !v.is_number()) {
        c.push("hp", "must be a number or null");
    }
    c.moves(obj, "abilities", Checker::ability);
    c.moves(obj, "attacks", Checker::attack);

    c.violations
}

/// Validate one file. Unreadable files and invalid JSON are reported as violations.
pub fn validate_file(path: &Path) -> FileReport {
    let violations = match std::fs::read_to_string(path) {
        Err(e) => vec![Violation::new("", format!("Cannot read file: {}", e))],
        Ok(content) => match serde_json::from_str::<Value>(&content) {
            Err(e) => vec![Violation::new("", format!("Invalid JSON: {}", e))],
            Ok(value) => validate_card_value(&value),
        },
    };

    FileReport {
        path: path.to_path_buf(),
        violations,
    }
}

/// Validate every `*.json` file directly inside `dir`, in file-name order.
pub fn validate_dir(dir: &Path) -> Result<ValidationSummary> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut summary = ValidationSummary::default();
    for path in paths {
        let report = validate_file(&path);
        if report.is_valid() {
            info!(file = %report.file_name(), "card is valid");
        } else {
            for violation in &report.violations {
                error!(file = %report.file_name(), "{}", violation);
            }
        }
        summary.reports.push(report);
    }

    Ok(summary)
}
