//! Ini - ConfigParser-compatible INI reader and writer
//!
//! Used for `.gitsuper` provenance files and for the parameter files handed
//! to test executables. Section and key order is preserved.

use crate::{DuneCiError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// A named section with ordered entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace a value, keeping the original position on replace
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Iterate over entries in file order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn value_mut(&mut self, key: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// An INI document
///
/// Keys that appear before the first `[section]` header live in the unnamed
/// root section (name `""`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ini {
    sections: Vec<IniSection>,
}

impl Ini {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text
    pub fn parse(text: &str) -> Result<Self> {
        let mut ini = Ini::new();
        let mut current = String::new();
        let mut last_key: Option<String> = None;
        // blank lines inside a value, kept if a continuation line follows
        let mut pending_blank = 0;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                if last_key.is_some() {
                    pending_blank += 1;
                }
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if raw.starts_with([' ', '\t']) {
                let key = last_key.as_deref().ok_or_else(|| DuneCiError::Ini {
                    line: line_no,
                    message: "continuation line without a preceding key".to_string(),
                })?;
                let section = ini.section_mut(&current);
                if let Some(value) = section.value_mut(key) {
                    for _ in 0..pending_blank {
                        value.push('\n');
                    }
                    value.push('\n');
                    value.push_str(trimmed);
                }
                pending_blank = 0;
                continue;
            }
            pending_blank = 0;

            if let Some(name) = trimmed.strip_prefix('[') {
                let name = name.strip_suffix(']').ok_or_else(|| DuneCiError::Ini {
                    line: line_no,
                    message: format!("unterminated section header '{}'", trimmed),
                })?;
                current = name.trim().to_string();
                ini.section_mut(&current);
                last_key = None;
                continue;
            }

            let split_at = trimmed.find(['=', ':']).ok_or_else(|| DuneCiError::Ini {
                line: line_no,
                message: format!("expected 'key = value', got '{}'", trimmed),
            })?;
            let key = trimmed[..split_at].trim();
            let value = trimmed[split_at + 1..].trim();
            if key.is_empty() {
                return Err(DuneCiError::Ini {
                    line: line_no,
                    message: "empty key".to_string(),
                });
            }

            ini.section_mut(&current).set(key, value);
            last_key = Some(key.to_string());
        }

        Ok(ini)
    }

    /// Get a section by name (`""` for the root section)
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Get or create a section
    pub fn section_mut(&mut self, name: &str) -> &mut IniSection {
        let pos = match self.sections.iter().position(|s| s.name == name) {
            Some(pos) => pos,
            None => {
                self.sections.push(IniSection::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[pos]
    }

    /// Get a value
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Set a value, creating the section if needed
    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.section_mut(section).set(key, value);
    }

    /// Flatten into `section.key -> value`; root keys stay unprefixed
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();
        for section in &self.sections {
            for (key, value) in section.entries() {
                let full_key = if section.name.is_empty() {
                    key.to_string()
                } else {
                    format!("{}.{}", section.name, key)
                };
                flat.insert(full_key, value.to_string());
            }
        }
        flat
    }
}

impl fmt::Display for Ini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            if section.name.is_empty() {
                if section.entries.is_empty() {
                    continue;
                }
            } else {
                writeln!(f, "[{}]", section.name)?;
            }
            for (key, value) in section.entries() {
                writeln!(f, "{} = {}", key, value.replace('\n', "\n\t"))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
