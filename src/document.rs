//! Ordered sectioned key/value documents, the INI dialect read and written by supervisor.
//!
//! Section order and per-section key order are preserved exactly so that compiled
//! configuration diffs cleanly against its template.
use std::{
    fmt, fs, io,
    path::Path,
};

use tracing::debug;

use crate::error::{DocumentError, Result, SupmanError};

/// A named section holding ordered `key = value` entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Section name as written between brackets.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the section has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sets `key`, replacing an existing value in place or appending a new entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }
}

/// An ordered list of uniquely named sections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    sections: Vec<Section>,
}

impl ConfigDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses document text.
    ///
    /// Accepts `[section]` headers, `key = value` or `key: value` options, `#` and `;`
    /// comment lines, and indented continuation lines. A value continues across
    /// blank lines as long as the next non-blank line is indented. Duplicate
    /// sections and duplicate keys within a section are rejected.
    pub fn parse(input: &str) -> std::result::Result<Self, DocumentError> {
        let mut document = Self::new();
        // Key of the last option read, eligible for continuation lines.
        let mut open_key: Option<String> = None;
        // Blank lines seen since that option; kept only if an indented line follows.
        let mut pending_blank = 0;

        for (index, raw) in input.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                if open_key.is_some() {
                    pending_blank += 1;
                }
                continue;
            }

            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = raw.starts_with([' ', '\t']);
            if indented
                && let Some(key) = &open_key
                && let Some(section) = document.sections.last_mut()
            {
                if let Some(entry) = section.entries.iter_mut().find(|(k, _)| k == key) {
                    for _ in 0..pending_blank {
                        entry.1.push('\n');
                    }
                    entry.1.push('\n');
                    entry.1.push_str(trimmed);
                }
                pending_blank = 0;
                continue;
            }

            open_key = None;
            pending_blank = 0;

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| DocumentError::new(line_no, "unterminated section header"))?
                    .trim();
                if name.is_empty() {
                    return Err(DocumentError::new(line_no, "empty section name"));
                }
                if document.section(name).is_some() {
                    return Err(DocumentError::new(
                        line_no,
                        format!("duplicate section '{name}'"),
                    ));
                }
                document.sections.push(Section::new(name));
                continue;
            }

            let Some(section) = document.sections.last_mut() else {
                return Err(DocumentError::new(
                    line_no,
                    "option appears before any section header",
                ));
            };

            let split = trimmed
                .find(['=', ':'])
                .ok_or_else(|| DocumentError::new(line_no, "expected `key = value`"))?;
            let key = trimmed[..split].trim();
            let value = trimmed[split + 1..].trim();
            if key.is_empty() {
                return Err(DocumentError::new(line_no, "option has an empty key"));
            }
            if section.contains_key(key) {
                return Err(DocumentError::new(
                    line_no,
                    format!("duplicate key '{key}' in section '{}'", section.name),
                ));
            }
            section.entries.push((key.to_string(), value.to_string()));
            open_key = Some(key.to_string());
        }

        Ok(document)
    }

    /// Section names in document order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(Section::name)
    }

    /// Looks up a section by exact name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the document has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Replaces the contents of section `name`, keeping its position if it already
    /// exists and appending it otherwise. Returns `true` when an existing section
    /// was overwritten.
    pub fn set_section<K, V>(
        &mut self,
        name: &str,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> bool
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut replacement = Section::new(name);
        for (key, value) in entries {
            replacement.insert(key, value);
        }

        match self.sections.iter_mut().find(|section| section.name == name) {
            Some(existing) => {
                *existing = replacement;
                true
            }
            None => {
                self.sections.push(replacement);
                false
            }
        }
    }

    /// Serialises the document. Each section is followed by a blank line and
    /// multi-line values continue on tab-indented lines, with empty lines inside a
    /// value left blank.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Overwrites `path` with the rendered document.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render()).map_err(|source| SupmanError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} sections to {}", self.len(), path.display());
        Ok(())
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                if value.is_empty() {
                    writeln!(f, "{key} =")?;
                } else {
                    let mut lines = value.split('\n');
                    write!(f, "{key} = {}", lines.next().unwrap_or_default())?;
                    for line in lines {
                        if line.is_empty() {
                            writeln!(f)?;
                        } else {
                            write!(f, "\n\t{line}")?;
                        }
                    }
                    writeln!(f)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Whether `key` survives a render and re-parse unchanged.
///
/// Keys may not be empty, carry surrounding whitespace, contain a delimiter or a
/// line break, or begin like a comment or a section header.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.trim() == key
        && !key.contains(['=', ':', '\n', '\r'])
        && !key.starts_with(['#', ';', '['])
}

/// Whether `name` can be written as a section header.
pub fn is_valid_section_name(name: &str) -> bool {
    !name.is_empty() && name.trim() == name && !name.contains(['\n', '\r'])
}

/// Reads the template that supplies supervisor-wide defaults.
pub fn load_template(path: &Path) -> Result<ConfigDocument> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SupmanError::TemplateNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SupmanError::TemplateRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let document =
        ConfigDocument::parse(&content).map_err(|source| SupmanError::TemplateParse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        "Loaded template {} with {} sections",
        path.display(),
        document.len()
    );
    Ok(document)
}
