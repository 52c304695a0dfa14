use super::{ConfError, ConfType, DaemonKind, Mode, UnitKind};

/// What a [`ConfigTarget`] configures, with the fields only meaningful for
/// that kind.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TargetKind {
    Daemon(DaemonKind),
    Unit {
        unit_type: UnitKind,
        mode: Mode,
        // the unit a drop-in overrides
        override_name: Option<String>,
    },
}

/// A validated description of a configuration file.
///
/// Can only be created through [`ConfigTargetBuilder`], so every value
/// upholds these invariants:
/// * `name` (and `override_name`) are single, non-empty path segments
/// * unit drop-ins always name the unit they override
/// * only unit drop-ins carry an override name
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ConfigTarget {
    name: String,
    kind: TargetKind,
    drop_in: bool,
}

impl ConfigTarget {
    pub fn daemon<N: Into<String>>(name: N, daemon: DaemonKind) -> ConfigTargetBuilder {
        ConfigTargetBuilder::new(name, ConfType::Daemon(daemon))
    }

    pub fn unit<N: Into<String>>(name: N, unit_type: UnitKind) -> ConfigTargetBuilder {
        ConfigTargetBuilder::new(name, ConfType::Unit(unit_type))
    }

    pub fn builder<N, C>(name: N, conf_type: C) -> Result<ConfigTargetBuilder, ConfError>
    where
        N: Into<String>,
        C: AsRef<str>,
    {
        Ok(ConfigTargetBuilder::new(name, conf_type.as_ref().parse()?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TargetKind {
        &self.kind
    }

    pub fn conf_type(&self) -> ConfType {
        match &self.kind {
            TargetKind::Daemon(daemon) => ConfType::Daemon(*daemon),
            TargetKind::Unit { unit_type, .. } => ConfType::Unit(*unit_type),
        }
    }

    /// `None` for daemons, which aren't scoped by mode
    pub fn mode(&self) -> Option<Mode> {
        match &self.kind {
            TargetKind::Daemon(_) => None,
            TargetKind::Unit { mode, .. } => Some(*mode),
        }
    }

    pub fn override_name(&self) -> Option<&str> {
        match &self.kind {
            TargetKind::Daemon(_) => None,
            TargetKind::Unit { override_name, .. } => override_name.as_deref(),
        }
    }

    pub fn is_drop_in(&self) -> bool {
        self.drop_in
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, TargetKind::Unit { .. })
    }
}

#[derive(Clone, Debug)]
pub struct ConfigTargetBuilder {
    name: String,
    conf_type: ConfType,
    mode: Mode,
    override_name: Option<String>,
    drop_in: bool,
}

impl ConfigTargetBuilder {
    fn new<N: Into<String>>(name: N, conf_type: ConfType) -> Self {
        Self {
            name: name.into(),
            conf_type,
            mode: Mode::default(),
            override_name: None,
            drop_in: false,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn drop_in(mut self, drop_in: bool) -> Self {
        self.drop_in = drop_in;
        self
    }

    pub fn override_name<S: Into<String>>(mut self, override_name: S) -> Self {
        self.override_name = Some(override_name.into());
        self
    }

    pub fn build(self) -> Result<ConfigTarget, ConfError> {
        check_segment("name", &self.name)?;
        if let Some(override_name) = &self.override_name {
            check_segment("override name", override_name)?;
        }

        let kind = match self.conf_type {
            ConfType::Daemon(daemon) => {
                if self.override_name.is_some() {
                    return Err(ConfError::InvalidTarget(format!(
                        "daemon {daemon:?} can't have an override name"
                    )));
                }
                TargetKind::Daemon(daemon)
            }
            ConfType::Unit(unit_type) => {
                match (self.drop_in, &self.override_name) {
                    (true, None) => {
                        return Err(ConfError::InvalidTarget(format!(
                            "drop-in {:?} for a {unit_type} unit needs an override name",
                            self.name
                        )))
                    }
                    (false, Some(override_name)) => {
                        return Err(ConfError::InvalidTarget(format!(
                            "override name {override_name:?} is only valid for drop-ins"
                        )))
                    }
                    _ => {}
                }
                TargetKind::Unit {
                    unit_type,
                    mode: self.mode,
                    override_name: self.override_name,
                }
            }
        };

        Ok(ConfigTarget {
            name: self.name,
            kind,
            drop_in: self.drop_in,
        })
    }
}

/// Make sure `value` can be used as a single file name
fn check_segment(what: &str, value: &str) -> Result<(), ConfError> {
    let problem = if value.is_empty() {
        "must not be empty"
    } else if value == "." || value == ".." {
        "must not be a relative path component"
    } else if value.contains('/') {
        "must not contain a path separator"
    } else if value.contains(['\0', '\n', '\r']) {
        "must not contain NUL or line breaks"
    } else {
        return Ok(());
    };

    Err(ConfError::InvalidTarget(format!("{what} {value:?} {problem}")))
}
