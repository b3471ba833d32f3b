use std::fmt::{self, Display, Formatter};

use crate::comment::comment_lines;

/// Commands longer than this are wrapped with ` \` continuations.
const WRAP_COLUMN: usize = 100;
const CONTINUATION_INDENT: &str = "    ";

/// A RouterOS-style script: header comments followed by titled sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    /// Comment lines emitted at the top of the script, without the `#` marker.
    pub header: Vec<String>,
    /// Sections in emission order.
    pub sections: Vec<ScriptSection>,
}

impl Script {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header comment line.
    pub fn header_line(&mut self, line: impl Into<String>) {
        self.header.push(line.into());
    }

    /// Append a section.
    pub fn push_section(&mut self, section: ScriptSection) {
        self.sections.push(section);
    }

    /// Serialize the script to text.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        for line in &self.header {
            lines.extend(comment_lines(line));
        }
        if !self.header.is_empty() {
            lines.push(String::new());
        }
        for section in &self.sections {
            lines.push(format!("# === {} ===", section.title.replace(['\n', '\r'], " ")));
            for item in &section.items {
                lines.extend(item.render_lines());
            }
            lines.push(String::new());
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl Display for Script {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A titled group of script items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSection {
    pub title: String,
    pub items: Vec<ScriptItem>,
}

impl ScriptSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.items.push(ScriptItem::Comment(text.into()));
        self
    }

    /// Switch the current menu path, e.g. `/ip address`.
    pub fn menu(&mut self, path: impl Into<String>) -> &mut Self {
        self.items.push(ScriptItem::Menu(path.into()));
        self
    }

    pub fn command(&mut self, command: Command) -> &mut Self {
        self.items.push(ScriptItem::Command(command));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.items.push(ScriptItem::Blank);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One line-level element of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptItem {
    Comment(String),
    Menu(String),
    Command(Command),
    Blank,
}

impl ScriptItem {
    fn render_lines(&self) -> Vec<String> {
        match self {
            ScriptItem::Comment(text) => comment_lines(text),
            ScriptItem::Menu(path) => vec![path.clone()],
            ScriptItem::Command(command) => command.render_lines(),
            ScriptItem::Blank => vec![String::new()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Arg {
    key: String,
    value: String,
    force_quote: bool,
}

impl Arg {
    fn render(&self) -> String {
        if self.force_quote || needs_quoting(&self.value) {
            format!("{}={}", self.key, quote(&self.value))
        } else {
            format!("{}={}", self.key, self.value)
        }
    }
}

/// A single menu command such as `add name=x interface=y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub selector: Option<String>,
    args: Vec<Arg>,
}

impl Command {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            selector: None,
            args: Vec::new(),
        }
    }

    pub fn add() -> Self {
        Self::new("add")
    }

    pub fn set() -> Self {
        Self::new("set")
    }

    /// Target existing items with `[ find <filter> ]`.
    pub fn find(mut self, filter: impl Into<String>) -> Self {
        self.selector = Some(format!("[ find {} ]", filter.into()));
        self
    }

    /// Append `key=value`, quoting only when the value requires it.
    pub fn arg(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.args.push(Arg {
            key: key.into(),
            value: value.to_string(),
            force_quote: false,
        });
        self
    }

    /// Append `key="value"` with quoting forced.
    pub fn quoted(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.args.push(Arg {
            key: key.into(),
            value: value.to_string(),
            force_quote: true,
        });
        self
    }

    /// Append `key=value` only when a value is present.
    pub fn arg_opt<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.arg(key, value),
            None => self,
        }
    }

    /// Render the command, wrapping long ones across continuation lines.
    pub fn render_lines(&self) -> Vec<String> {
        let mut head = self.verb.clone();
        if let Some(selector) = &self.selector {
            head.push(' ');
            head.push_str(selector);
        }
        let args = self.args.iter().map(Arg::render).collect::<Vec<_>>();
        let single = std::iter::once(head.clone())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        if single.len() <= WRAP_COLUMN || args.len() < 2 {
            return vec![single];
        }

        let mut lines = vec![format!("{head} {} \\", args[0])];
        let rest = &args[1..];
        for (idx, arg) in rest.iter().enumerate() {
            if idx + 1 == rest.len() {
                lines.push(format!("{CONTINUATION_INDENT}{arg}"));
            } else {
                lines.push(format!("{CONTINUATION_INDENT}{arg} \\"));
            }
        }
        lines
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_lines().join("\n"))
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value.chars().any(|c| {
            c.is_whitespace() || matches!(c, '"' | '\\' | '$' | ';' | '=' | '[' | ']' | '{' | '}')
        })
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::{Command, Script, ScriptSection};

    #[test]
    fn plain_values_stay_bare() {
        let cmd = Command::add().arg("name", "bridge-main").arg("disabled", "no");
        assert_eq!(cmd.render_lines(), vec!["add name=bridge-main disabled=no"]);
    }

    #[test]
    fn quotes_and_escapes_special_values() {
        let cmd = Command::add()
            .arg("comment", "Allow LAN to WAN")
            .arg("password", "pa$$\"word")
            .arg("empty", "");
        assert_eq!(
            cmd.render_lines(),
            vec![r#"add comment="Allow LAN to WAN" password="pa\$\$\"word" empty="""#]
        );
    }

    #[test]
    fn forced_quotes_apply_to_simple_values() {
        let cmd = Command::add().quoted("user", "alice");
        assert_eq!(cmd.render_lines(), vec![r#"add user="alice""#]);
    }

    #[test]
    fn long_commands_wrap_one_arg_per_line() {
        let cmd = Command::add()
            .arg("name", "pppoe-out1")
            .arg("interface", "ether1")
            .quoted("user", "a-rather-long-username@isp.example.net")
            .quoted("password", "an-equally-long-password-value")
            .arg("disabled", "no");
        let lines = cmd.render_lines();
        assert_eq!(lines[0], "add name=pppoe-out1 \\");
        assert_eq!(lines[1], "    interface=ether1 \\");
        assert_eq!(lines.last().map(String::as_str), Some("    disabled=no"));
    }

    #[test]
    fn selector_precedes_arguments() {
        let cmd = Command::set().find("default-name=wlan1").arg("ssid", "home");
        assert_eq!(cmd.render_lines(), vec!["set [ find default-name=wlan1 ] ssid=home"]);
    }

    #[test]
    fn renders_header_and_section_banner() {
        let mut script = Script::new();
        script.header_line("Generated from policy: home");
        let mut section = ScriptSection::new("WAN Configuration");
        section
            .menu("/ip dhcp-client")
            .command(Command::add().arg("interface", "ether1"));
        script.push_section(section);

        assert_eq!(
            script.render(),
            "# Generated from policy: home\n\n# === WAN Configuration ===\n/ip dhcp-client\nadd interface=ether1\n\n"
        );
    }

    #[test]
    fn multi_line_comments_cannot_become_commands() {
        let mut script = Script::new();
        script.header_line("Home router\n/system reset-configuration no-defaults=yes");
        let mut section = ScriptSection::new("LAN Configuration");
        section
            .comment("LAN: main\r\n/ip address remove 0")
            .command(Command::add().arg("comment", "a\r\nb"));
        script.push_section(section);

        let out = script.render();
        for line in out.lines().filter(|line| !line.is_empty()) {
            assert!(
                line.starts_with('#') || line.starts_with("add "),
                "uncommented line: {line}"
            );
        }
        assert!(out.contains("# /system reset-configuration no-defaults=yes\n"));
        assert!(out.contains("# /ip address remove 0\n"));
        assert!(out.contains(r#"add comment="a\r\nb""#));
    }
}
