use std::fmt::{self, Display, Formatter};

use crate::comment::comment_lines;

/// One UCI configuration file (for example `/etc/config/network`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UciConfig {
    /// Comment lines emitted at the top of the file, without the `#` marker.
    pub header: Vec<String>,
    pub sections: Vec<UciSection>,
    /// Comment lines emitted after the last section.
    pub notes: Vec<String>,
}

impl UciConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_line(&mut self, line: impl Into<String>) {
        self.header.push(line.into());
    }

    pub fn push(&mut self, section: UciSection) {
        self.sections.push(section);
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.notes.push(line.into());
    }

    /// Serialize the file to UCI text.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        for line in &self.header {
            lines.extend(comment_lines(line));
        }
        if !self.header.is_empty() {
            lines.push(String::new());
        }
        for section in &self.sections {
            if let Some(comment) = &section.comment {
                lines.extend(comment_lines(comment));
            }
            match &section.name {
                Some(name) => lines.push(format!("config {} {}", section.kind, quote(name))),
                None => lines.push(format!("config {}", section.kind)),
            }
            for entry in &section.entries {
                lines.push(entry.render());
            }
            lines.push(String::new());
        }
        for note in &self.notes {
            lines.extend(comment_lines(note));
        }
        if !self.notes.is_empty() {
            lines.push(String::new());
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl Display for UciConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A `config <kind> ['<name>']` stanza.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciSection {
    pub comment: Option<String>,
    pub kind: String,
    pub name: Option<String>,
    pub entries: Vec<UciEntry>,
}

impl UciSection {
    /// Anonymous section (`config zone`).
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            comment: None,
            kind: kind.into(),
            name: None,
            entries: Vec::new(),
        }
    }

    /// Named section (`config interface 'lan'`).
    pub fn named(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(kind)
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.entries
            .push(UciEntry::Option(key.into(), value.to_string()));
        self
    }

    pub fn option_opt<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.option(key, value),
            None => self,
        }
    }

    pub fn list(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.entries.push(UciEntry::List(key.into(), value.to_string()));
        self
    }

    /// Append one `list` entry per value.
    pub fn lists<I, V>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        values
            .into_iter()
            .fold(self, |section, value| section.list(key, value))
    }

    /// First `option` value stored under `key`.
    pub fn get_option(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            UciEntry::Option(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciEntry {
    Option(String, String),
    List(String, String),
}

impl UciEntry {
    fn render(&self) -> String {
        match self {
            UciEntry::Option(key, value) => format!("\toption {key} {}", quote(value)),
            UciEntry::List(key, value) => format!("\tlist {key} {}", quote(value)),
        }
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
