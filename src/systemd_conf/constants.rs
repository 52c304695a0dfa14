/// Directory for sysadmin owned Systemd configuration
pub const LOCAL_CONF_ROOT: &str = "/etc/systemd";

/// Environment variable to relocate [`LOCAL_CONF_ROOT`] (e.g. for chroots or tests)
pub const CONF_ROOT_ENV: &str = "SYSTEMD_CONF_ROOT";

/// Extension of daemon config files and drop-in fragments
pub const CONF_EXTENSION: &str = "conf";

/// Suffix appended to a file name to get its drop-in directory
pub const DROP_IN_DIR_SUFFIX: &str = ".d";
