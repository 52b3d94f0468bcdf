//! Minimal INI reader/writer matching the grammar the profile loader
//! expects: `[Section]` headers, `#`-led comments preserved verbatim,
//! `Key = v1 v2 ...` assignments.

use crate::error::{DriverError, ErrorKind, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Key {
    pub name: String,
    pub comment: bool,
    pub values: Vec<String>,
}

impl Key {
    fn comment_line(line: impl Into<String>) -> Self {
        Self {
            name: line.into(),
            comment: true,
            values: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub keys: Vec<Key>,
}

/// A vector of string values with C++-`ValVec`-style lossy numeric
/// accessors: an unparsable or missing value yields `0` rather than an
/// error, matching the original's `try { ... } catch (...) { return 0; }`.
pub struct ValVec<'a>(pub &'a [String]);

impl<'a> ValVec<'a> {
    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn string(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn int(&self, index: usize) -> i64 {
        self.0.get(index).and_then(|s| s.parse().ok()).unwrap_or(0)
    }

    pub fn double(&self, index: usize) -> f64 {
        self.0.get(index).and_then(|s| s.parse().ok()).unwrap_or(0.0)
    }
}

/// An in-memory parsed `.ini` document.
#[derive(Debug, Clone, Default)]
pub struct IniFile {
    sections: Vec<Section>,
}

fn is_alnum(s: &str) -> bool {
    s.chars().all(|c| c.is_alphanumeric())
}

impl IniFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        self.sections.clear();

        if !path.exists() {
            return Err(DriverError::new(
                ErrorKind::FileNotFound,
                format!("{} not found", path.display()),
            ));
        }
        let contents = fs::read_to_string(path)?;

        // The first, unnamed section holds any comments before the first
        // `[Section]` header.
        self.sections.push(Section {
            name: "NONE".to_string(),
            keys: Vec::new(),
        });

        for (line_num, line) in contents.lines().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();

            if tokens.is_empty() {
                self.sections.last_mut().unwrap().keys.push(Key::comment_line(""));
                continue;
            }

            let first = tokens[0];
            if let Some(rest) = first.strip_prefix('[') {
                if first.len() > 2 && !first.ends_with(']') {
                    tracing::debug!(line_num, "unclosed section name, aborting");
                    return Err(DriverError::new(ErrorKind::InvalidFormat, "unclosed section name"));
                }
                let name = rest.strip_suffix(']').unwrap_or(rest);
                if name == "NONE" {
                    tracing::debug!(line_num, "section name 'NONE' is reserved");
                    return Err(DriverError::new(ErrorKind::InvalidFormat, "section name 'NONE' is reserved"));
                }
                if !is_alnum(name) {
                    tracing::debug!(line_num, "section name contains invalid characters, aborting");
                    return Err(DriverError::new(ErrorKind::InvalidFormat, "invalid section name"));
                }
                self.sections.push(Section {
                    name: name.to_string(),
                    keys: Vec::new(),
                });
                continue;
            }

            if first.starts_with('#') {
                self.sections.last_mut().unwrap().keys.push(Key::comment_line(line));
                continue;
            }

            if tokens.len() > 2 {
                if tokens[1] != "=" {
                    tracing::debug!(line_num, "expected key assignment, missing '=', ignoring line");
                    continue;
                }
                if !is_alnum(first) {
                    tracing::debug!(line_num, "invalid key name, ignoring line");
                    continue;
                }
                self.sections.last_mut().unwrap().keys.push(Key {
                    name: first.to_string(),
                    comment: false,
                    values: tokens[2..].iter().map(|s| s.to_string()).collect(),
                });
            }
        }

        Ok(())
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if self.sections.is_empty() {
            return Err(DriverError::new(ErrorKind::Empty, "nothing to save"));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    DriverError::new(ErrorKind::CannotCreate, format!("create {}: {e}", parent.display()))
                })?;
            }
        }

        let mut out = String::new();
        for section in &self.sections {
            if section.name != "NONE" {
                out.push('[');
                out.push_str(&section.name);
                out.push_str("]\n");
            }
            for key in &section.keys {
                if key.comment {
                    if key.name.is_empty() {
                        out.push('\n');
                    } else if key.name.starts_with('#') {
                        out.push_str(&key.name);
                        out.push('\n');
                    } else {
                        out.push_str("# ");
                        out.push_str(&key.name);
                        out.push('\n');
                    }
                } else if !key.values.is_empty() {
                    out.push_str(&key.name);
                    out.push_str(" =");
                    for v in &key.values {
                        out.push(' ');
                        out.push_str(v);
                    }
                    out.push('\n');
                }
            }
            out.push('\n');
        }

        fs::write(path, out).map_err(|e| DriverError::new(ErrorKind::WriteFailed, e.to_string()))
    }

    pub fn section_list(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| s.name != "NONE")
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn key_list(&self, section: &str) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| s.name == section)
            .flat_map(|s| s.keys.iter())
            .filter(|k| !k.comment)
            .map(|k| k.name.as_str())
            .collect()
    }

    pub fn get_val(&self, section: &str, key: &str) -> Vec<String> {
        if section == "NONE" || !is_alnum(section) || !is_alnum(key) {
            return Vec::new();
        }
        for s in &self.sections {
            if s.name == section {
                for k in &s.keys {
                    if !k.comment && k.name == key {
                        return k.values.clone();
                    }
                }
            }
        }
        Vec::new()
    }

    pub fn set_val(&mut self, section: &str, key: &str, vals: Vec<String>) -> Result<()> {
        if section == "NONE" || !is_alnum(section) || !is_alnum(key) {
            return Err(DriverError::new(ErrorKind::InvalidParameter, "invalid section/key name"));
        }
        for s in &mut self.sections {
            if s.name == section {
                for k in &mut s.keys {
                    if !k.comment && k.name == key {
                        k.values = vals;
                        return Ok(());
                    }
                }
                s.keys.push(Key {
                    name: key.to_string(),
                    comment: false,
                    values: vals,
                });
                return Ok(());
            }
        }
        self.sections.push(Section {
            name: section.to_string(),
            keys: vec![Key {
                name: key.to_string(),
                comment: false,
                values: vals,
            }],
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.ini");

        let mut ini = IniFile::new();
        ini.set_val("Features", "LizardMode", vec!["true".into()]).unwrap();
        ini.set_val("Deadzones", "LStick", vec!["0.1".into()]).unwrap();
        ini.save_file(&path).unwrap();

        let mut reloaded = IniFile::new();
        reloaded.load_file(&path).unwrap();
        assert_eq!(reloaded.get_val("Features", "LizardMode"), vec!["true"]);
        assert_eq!(reloaded.get_val("Deadzones", "LStick"), vec!["0.1"]);
    }

    #[test]
    fn unclosed_section_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ini");
        fs::write(&path, "[Broken\nKey = 1\n").unwrap();

        let mut ini = IniFile::new();
        let err = ini.load_file(&path).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
    }

    #[test]
    fn malformed_assignment_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.ini");
        fs::write(&path, "[Section]\nBadLine no equals here\nGood = 1 2\n").unwrap();

        let mut ini = IniFile::new();
        ini.load_file(&path).unwrap();
        assert_eq!(ini.get_val("Section", "Good"), vec!["1", "2"]);
    }

    #[test]
    fn reserved_section_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.ini");
        fs::write(&path, "[NONE]\n").unwrap();

        let mut ini = IniFile::new();
        assert!(ini.load_file(&path).is_err());
    }
}
