use std::fmt;
use std::str::FromStr;

use super::ConfError;

/// Systemd daemons and utilities configured through a single global
/// `<kind>.conf` file (plus optional drop-ins) directly below the config root.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DaemonKind {
    // daemons
    Journald,
    Logind,
    Resolved,
    Timesyncd,
    // utilities
    Bootchart,
    Coredump,
    Sleep,
    System,
    User,
}

impl DaemonKind {
    pub const ALL: [DaemonKind; 9] = [
        DaemonKind::Journald,
        DaemonKind::Logind,
        DaemonKind::Resolved,
        DaemonKind::Timesyncd,
        DaemonKind::Bootchart,
        DaemonKind::Coredump,
        DaemonKind::Sleep,
        DaemonKind::System,
        DaemonKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DaemonKind::Journald => "journald",
            DaemonKind::Logind => "logind",
            DaemonKind::Resolved => "resolved",
            DaemonKind::Timesyncd => "timesyncd",
            DaemonKind::Bootchart => "bootchart",
            DaemonKind::Coredump => "coredump",
            DaemonKind::Sleep => "sleep",
            DaemonKind::System => "system",
            DaemonKind::User => "user",
        }
    }

    /// `true` for utilities, `false` for long running daemons
    pub fn is_util(&self) -> bool {
        !matches!(
            self,
            DaemonKind::Journald | DaemonKind::Logind | DaemonKind::Resolved | DaemonKind::Timesyncd
        )
    }

    /// Name of the section the daemon reads its settings from
    pub fn section_name(&self) -> &'static str {
        match self {
            DaemonKind::Journald => "Journal",
            DaemonKind::Logind => "Login",
            DaemonKind::Resolved => "Resolve",
            DaemonKind::Timesyncd => "Time",
            DaemonKind::Bootchart => "Bootchart",
            DaemonKind::Coredump => "Coredump",
            DaemonKind::Sleep => "Sleep",
            DaemonKind::System | DaemonKind::User => "Manager",
        }
    }
}

impl fmt::Display for DaemonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DaemonKind {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DaemonKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfError::InvalidTarget(format!("unsupported daemon {s:?}")))
    }
}

/// Systemd unit types
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnitKind {
    Service,
    Socket,
    Device,
    Mount,
    Automount,
    Swap,
    Target,
    Path,
    Timer,
    Slice,
}

impl UnitKind {
    pub const ALL: [UnitKind; 10] = [
        UnitKind::Service,
        UnitKind::Socket,
        UnitKind::Device,
        UnitKind::Mount,
        UnitKind::Automount,
        UnitKind::Swap,
        UnitKind::Target,
        UnitKind::Path,
        UnitKind::Timer,
        UnitKind::Slice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Service => "service",
            UnitKind::Socket => "socket",
            UnitKind::Device => "device",
            UnitKind::Mount => "mount",
            UnitKind::Automount => "automount",
            UnitKind::Swap => "swap",
            UnitKind::Target => "target",
            UnitKind::Path => "path",
            UnitKind::Timer => "timer",
            UnitKind::Slice => "slice",
        }
    }

    /// Device and target units have no type specific section
    pub fn accepts_options(&self) -> bool {
        !matches!(self, UnitKind::Device | UnitKind::Target)
    }

    /// Name of the type specific section, e.g. `Service` for `.service` units
    pub fn section_name(&self) -> &'static str {
        match self {
            UnitKind::Service => "Service",
            UnitKind::Socket => "Socket",
            UnitKind::Device => "Device",
            UnitKind::Mount => "Mount",
            UnitKind::Automount => "Automount",
            UnitKind::Swap => "Swap",
            UnitKind::Target => "Target",
            UnitKind::Path => "Path",
            UnitKind::Timer => "Timer",
            UnitKind::Slice => "Slice",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitKind {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfError::InvalidTarget(format!("unsupported unit type {s:?}")))
    }
}

/// Either kind of configuration type identifier
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConfType {
    Daemon(DaemonKind),
    Unit(UnitKind),
}

impl ConfType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfType::Daemon(kind) => kind.as_str(),
            ConfType::Unit(kind) => kind.as_str(),
        }
    }

    pub fn section_name(&self) -> &'static str {
        match self {
            ConfType::Daemon(kind) => kind.section_name(),
            ConfType::Unit(kind) => kind.section_name(),
        }
    }
}

impl fmt::Display for ConfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfType {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // the two identifier sets don't overlap
        if let Ok(kind) = s.parse::<DaemonKind>() {
            return Ok(ConfType::Daemon(kind));
        }

        match s.parse::<UnitKind>() {
            Ok(kind) => Ok(ConfType::Unit(kind)),
            Err(_) => Err(ConfError::InvalidTarget(format!(
                "unsupported configuration type {s:?}"
            ))),
        }
    }
}

/// Which unit tree a unit lives in
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    #[default]
    System,
    User,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::System => "system",
            Mode::User => "user",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Mode::System),
            "user" => Ok(Mode::User),
            _ => Err(ConfError::InvalidTarget(format!("unsupported mode {s:?}"))),
        }
    }
}
