use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{DaemonKind, IniDocument, OptionLine};

static CAMELIZE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|_)(.)").expect("valid regex"));
static ACRONYM_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid regex"));
static WORD_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

/// `process_size_max` -> `ProcessSizeMax`
pub fn camelize(s: &str) -> String {
    CAMELIZE_RE
        .replace_all(s, |caps: &regex_lite::Captures| caps[1].to_uppercase())
        .into_owned()
}

/// `ProcessSizeMax` -> `process_size_max`
pub fn underscore(s: &str) -> String {
    let s = s.replace("::", "/");
    let s = ACRONYM_BOUNDARY_RE.replace_all(&s, "${1}_${2}");
    let s = WORD_BOUNDARY_RE.replace_all(&s, "${1}_${2}");

    s.replace('-', "_").to_lowercase()
}

impl OptionLine {
    /// Option line for a snake_case attribute name, e.g.
    /// `("max_use", "2G")` gives `MaxUse=2G`
    pub fn from_attribute<V: fmt::Display>(attribute: &str, value: V) -> Self {
        Self::new(camelize(attribute), value)
    }
}

/// Settings of `systemd-coredump`, see coredump.conf(5).
///
/// Unset attributes are left out, so systemd keeps its defaults for them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CoredumpOptions {
    /// `none`, `external` or `journal`
    pub storage: Option<String>,
    pub compress: Option<bool>,
    pub process_size_max: Option<String>,
    pub external_size_max: Option<String>,
    pub journal_size_max: Option<String>,
    pub max_use: Option<String>,
    pub keep_free: Option<String>,
}

impl CoredumpOptions {
    pub fn option_lines(&self) -> Vec<OptionLine> {
        let sized = [
            ("process_size_max", &self.process_size_max),
            ("external_size_max", &self.external_size_max),
            ("journal_size_max", &self.journal_size_max),
            ("max_use", &self.max_use),
            ("keep_free", &self.keep_free),
        ];

        let mut lines = Vec::new();
        if let Some(storage) = &self.storage {
            lines.push(OptionLine::from_attribute("storage", storage));
        }
        if let Some(compress) = self.compress {
            lines.push(OptionLine::flag(camelize("compress"), compress));
        }
        lines.extend(sized.into_iter().filter_map(|(attribute, value)| {
            value
                .as_ref()
                .map(|value| OptionLine::from_attribute(attribute, value))
        }));

        lines
    }

    /// A document with a single `[Coredump]` section
    pub fn to_document(&self) -> IniDocument {
        IniDocument::new().with_section(DaemonKind::Coredump.section_name(), self.option_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systemd_conf::IniRenderer;

    mod camelize {
        use super::*;

        #[test]
        fn converts_snake_case() {
            assert_eq!(camelize("process_size_max"), "ProcessSizeMax");
            assert_eq!(camelize("storage"), "Storage");
            assert_eq!(camelize("x"), "X");
        }

        #[test]
        fn keeps_camel_case() {
            assert_eq!(camelize("MaxUse"), "MaxUse");
        }

        #[test]
        fn empty_string() {
            assert_eq!(camelize(""), "");
        }
    }

    mod underscore {
        use super::*;

        #[test]
        fn converts_camel_case() {
            assert_eq!(underscore("ProcessSizeMax"), "process_size_max");
            assert_eq!(underscore("KeepFree"), "keep_free");
        }

        #[test]
        fn splits_acronyms() {
            assert_eq!(underscore("DNSOverTLS"), "dns_over_tls");
            assert_eq!(underscore("RuntimeWatchdogSec"), "runtime_watchdog_sec");
        }

        #[test]
        fn converts_dashes_and_namespaces() {
            assert_eq!(underscore("x-my-tool"), "x_my_tool");
            assert_eq!(underscore("Systemd::Coredump"), "systemd/coredump");
        }
    }

    mod coredump_options {
        use super::*;

        #[test]
        fn renders_set_attributes_in_order() {
            let opts = CoredumpOptions {
                storage: Some("external".into()),
                compress: Some(true),
                process_size_max: Some("2G".into()),
                external_size_max: None,
                journal_size_max: Some("767M".into()),
                max_use: None,
                keep_free: Some("1G".into()),
            };

            assert_eq!(
                IniRenderer::render(&opts.to_document()).unwrap(),
                "[Coredump]
Storage=external
Compress=yes
ProcessSizeMax=2G
JournalSizeMax=767M
KeepFree=1G
"
            );
        }

        #[test]
        fn unset_attributes_render_nothing() {
            let opts = CoredumpOptions::default();

            assert!(opts.to_document().is_empty());
            assert_eq!(IniRenderer::render(&opts.to_document()).unwrap(), "");
        }

        #[test]
        fn disabled_compression() {
            let opts = CoredumpOptions {
                compress: Some(false),
                ..Default::default()
            };

            assert_eq!(opts.option_lines(), vec![OptionLine::from("Compress=no")]);
        }
    }
}
