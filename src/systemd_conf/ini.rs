use std::fmt;

use ordered_multimap::list_ordered_multimap::ListOrderedMultimap;

use super::ConfError;

pub type SectionName = String;

/// A single pre-formatted `key=value` line.
///
/// The value is written verbatim: any quoting or escaping systemd expects has
/// to be done by whoever builds the line.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct OptionLine(String);

impl OptionLine {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        Self(format!("{key}={value}"))
    }

    /// Boolean option the way systemd spells it (`yes`/`no`)
    pub fn flag<K: fmt::Display>(key: K, value: bool) -> Self {
        Self::new(key, if value { "yes" } else { "no" })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OptionLine {
    fn from(line: &str) -> Self {
        Self(line.to_owned())
    }
}

impl From<String> for OptionLine {
    fn from(line: String) -> Self {
        Self(line)
    }
}

impl fmt::Display for OptionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered sections, each with ordered option lines.
///
/// Sections with the same name may occur multiple times. They are kept
/// apart and rendered in the order they were added.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IniDocument {
    pub(crate) sections: ListOrderedMultimap<SectionName, Vec<OptionLine>>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new instance of `section`
    pub fn add_section<S, I, L>(&mut self, section: S, lines: I)
    where
        S: Into<SectionName>,
        I: IntoIterator<Item = L>,
        L: Into<OptionLine>,
    {
        self.sections
            .append(section.into(), lines.into_iter().map(Into::into).collect());
    }

    /// Builder flavor of [`IniDocument::add_section`]
    pub fn with_section<S, I, L>(mut self, section: S, lines: I) -> Self
    where
        S: Into<SectionName>,
        I: IntoIterator<Item = L>,
        L: Into<OptionLine>,
    {
        self.add_section(section, lines);
        self
    }

    /// Appends `line` to the last instance of `section`
    pub fn append<S, L>(&mut self, section: S, line: L)
    where
        S: Into<SectionName>,
        L: Into<OptionLine>,
    {
        let section = section.into();
        let line = line.into();

        if let Some(lines) = self.sections.get_all_mut(&section).next_back() {
            lines.push(line);
            return;
        }

        self.sections.append(section, vec![line]);
    }

    /// `true` if rendering would produce no output
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(Vec::is_empty)
    }

    /// Unique section names in order of first appearance
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    /// All lines of all instances of `section`
    pub fn section_lines(&self, section: &str) -> Vec<&OptionLine> {
        self.sections.get_all(section).flatten().collect()
    }

    /// Sections in insertion order, including empty ones
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OptionLine])> {
        self.sections
            .iter()
            .map(|(name, lines)| (name.as_str(), lines.as_slice()))
    }
}

/// Turns an [`IniDocument`] into text.
#[derive(Clone, Copy, Debug, Default)]
pub struct IniRenderer;

impl IniRenderer {
    /// Renders all non-empty sections, separated by a blank line.
    ///
    /// Fails with [`ConfError::InvalidInput`] if a section name can't be used
    /// as a header or an option line would spill into more than one line.
    pub fn render(document: &IniDocument) -> Result<String, ConfError> {
        let mut res = String::new();

        for (i, (section, lines)) in document
            .iter()
            .filter(|(_, lines)| !lines.is_empty())
            .enumerate()
        {
            check_section_name(section)?;

            if i > 0 {
                res.push('\n');
            }

            res.push('[');
            res.push_str(&capitalize(section));
            res.push_str("]\n");

            for line in lines {
                if line.as_str().contains(['\n', '\r']) {
                    return Err(ConfError::InvalidInput(format!(
                        "option {:?} in section {section:?} contains a line break",
                        line.as_str()
                    )));
                }
                res.push_str(line.as_str());
                res.push('\n');
            }
        }

        Ok(res)
    }
}

fn check_section_name(section: &str) -> Result<(), ConfError> {
    if section.is_empty() {
        return Err(ConfError::InvalidInput("empty section name".into()));
    }
    if section.contains(['[', ']', '\n', '\r']) || section.trim() != section {
        return Err(ConfError::InvalidInput(format!(
            "invalid section name {section:?}"
        )));
    }

    Ok(())
}

/// Upper-cases the first character if it is ASCII, leaving the rest alone
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_uppercase()).chain(chars).collect(),
        None => String::new(),
    }
}
