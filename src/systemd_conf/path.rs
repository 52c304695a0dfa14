use std::env;
use std::path::{Path, PathBuf};

use super::constants::*;
use super::{ConfigTarget, Mode, TargetKind};

/// Computes where configuration files belong.
///
/// see https://www.freedesktop.org/software/systemd/man/latest/systemd.unit.html#Unit%20File%20Load%20Path
/// and https://www.freedesktop.org/software/systemd/man/latest/systemd-system.conf.html#Configuration%20Directories%20and%20Precedence
///
/// Pure path arithmetic: the filesystem is never touched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathResolver {
    root: PathBuf,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            root: PathBuf::from(LOCAL_CONF_ROOT),
        }
    }
}

impl PathResolver {
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Use the root from `env_var_name` if it is set and non-empty,
    /// [`LOCAL_CONF_ROOT`] otherwise.
    pub fn from_env_or_default(env_var_name: &str) -> Self {
        match env::var_os(env_var_name) {
            Some(root) if !root.is_empty() => Self::with_root(root),
            _ => Self::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// e.g. `/etc/systemd/system`
    pub fn unit_conf_root(&self, mode: Mode) -> PathBuf {
        self.root.join(mode.as_str())
    }

    /// Directory holding drop-in fragments for `target`'s primary file.
    pub fn drop_in_root(&self, target: &ConfigTarget) -> PathBuf {
        match target.kind() {
            TargetKind::Unit {
                unit_type,
                mode,
                override_name,
            } => {
                // builders only let drop-ins carry an override name; a plain
                // unit gets the drop-in dir of its own file
                let unit_name = override_name.as_deref().unwrap_or(target.name());
                self.unit_conf_root(*mode)
                    .join(format!("{unit_name}.{unit_type}{DROP_IN_DIR_SUFFIX}"))
            }
            TargetKind::Daemon(daemon) => self
                .root
                .join(format!("{daemon}.{CONF_EXTENSION}{DROP_IN_DIR_SUFFIX}")),
        }
    }

    /// Path of the file `target` describes
    pub fn conf_path(&self, target: &ConfigTarget) -> PathBuf {
        if target.is_drop_in() {
            return self
                .drop_in_root(target)
                .join(format!("{}.{CONF_EXTENSION}", target.name()));
        }

        match target.kind() {
            TargetKind::Unit {
                unit_type, mode, ..
            } => self
                .unit_conf_root(*mode)
                .join(format!("{}.{unit_type}", target.name())),
            TargetKind::Daemon(daemon) => self.root.join(format!("{daemon}.{CONF_EXTENSION}")),
        }
    }
}
