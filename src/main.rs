use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use log::{debug, error, info, warn, LevelFilter};
use once_cell::sync::Lazy;
use regex_lite::Regex;

use systemd_conf_rs::systemd_conf::*;

const SYSTEMD_CONF_VERSION: &str = env!("CARGO_PKG_VERSION");

// [SECTION.]KEY=VALUE
static ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([A-Za-z][A-Za-z0-9-]*)\.)?([A-Za-z_][A-Za-z0-9_]*)=(.*)$")
        .expect("valid regex")
});

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Conf(#[from] ConfError),
    #[error("can't write to stdout: {0}")]
    Stdout(#[from] io::Error),
}

#[derive(Debug, PartialEq)]
struct Assignment {
    section: Option<String>,
    key: String,
    value: String,
}

impl Assignment {
    fn parse(arg: &str) -> Option<Self> {
        let caps = ASSIGNMENT_RE.captures(arg)?;

        Some(Assignment {
            section: caps.get(1).map(|m| m.as_str().to_owned()),
            key: caps[2].to_owned(),
            value: caps[3].to_owned(),
        })
    }
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    assignments: Vec<Assignment>,
    conf_type: Option<String>,
    delete: bool,
    drop_in: Option<String>,
    dry_run: bool,
    mode: Mode,
    name: Option<String>,
    root: Option<PathBuf>,
    verbose: bool,
    version: bool,
}

fn help() {
    println!(
        "Usage:
systemd-conf --version
systemd-conf [-v|--verbose] [-n|--dry-run] [--delete] [--root DIR] [--user]
             [--drop-in NAME] TYPE [NAME] [[SECTION.]KEY=VALUE ...]

TYPE is one of the daemons ({}) or unit types ({}).
NAME is required for units. With --drop-in it names the unit being overridden.",
        DaemonKind::ALL.map(|k| k.as_str()).join(", "),
        UnitKind::ALL.map(|k| k.as_str()).join(", "),
    );
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, CliError> {
    let mut cfg = CliOptions::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" => cfg.version = true,
            "-v" | "--verbose" => cfg.verbose = true,
            "-n" | "--dry-run" => cfg.dry_run = true,
            "--delete" => cfg.delete = true,
            "--user" => cfg.mode = Mode::User,
            "--root" => cfg.root = Some(option_value(&arg, args.next())?.into()),
            "--drop-in" => cfg.drop_in = Some(option_value(&arg, args.next())?),
            s if s.starts_with("--root=") => {
                let value = s.trim_start_matches("--root=").to_owned();
                cfg.root = Some(option_value("--root", Some(value))?.into())
            }
            s if s.starts_with("--drop-in=") => {
                let value = s.trim_start_matches("--drop-in=").to_owned();
                cfg.drop_in = Some(option_value("--drop-in", Some(value))?)
            }
            s if s.starts_with('-') => {
                return Err(CliError::Usage(format!("Unknown argument: {s}")))
            }
            _ if cfg.conf_type.is_none() => cfg.conf_type = Some(arg),
            s if s.contains('=') => match Assignment::parse(s) {
                Some(assignment) => cfg.assignments.push(assignment),
                None => return Err(CliError::Usage(format!("Invalid assignment: {s}"))),
            },
            _ if cfg.name.is_none() && cfg.assignments.is_empty() => cfg.name = Some(arg),
            s => return Err(CliError::Usage(format!("Unexpected argument: {s}"))),
        }
    }

    if !cfg.version && cfg.conf_type.is_none() {
        return Err(CliError::Usage("Missing TYPE argument".into()));
    }

    Ok(cfg)
}

fn option_value(option: &str, value: Option<String>) -> Result<String, CliError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CliError::Usage(format!("{option} requires a value"))),
    }
}

fn build_conf_file(cfg: &CliOptions) -> Result<ConfFile, CliError> {
    let conf_type: ConfType = cfg.conf_type.as_deref().unwrap_or_default().parse()?;

    let builder = match conf_type {
        ConfType::Unit(unit_type) => {
            let unit_name = cfg
                .name
                .as_deref()
                .ok_or_else(|| CliError::Usage(format!("Missing NAME of the {unit_type} unit")))?;

            match &cfg.drop_in {
                Some(drop_in) => ConfigTarget::unit(drop_in, unit_type)
                    .drop_in(true)
                    .override_name(unit_name),
                None => ConfigTarget::unit(unit_name, unit_type),
            }
        }
        ConfType::Daemon(daemon) => match (&cfg.drop_in, &cfg.name) {
            (Some(_), Some(name)) => {
                return Err(CliError::Usage(format!(
                    "Unexpected NAME {name:?}: {daemon} drop-ins are named by --drop-in"
                )))
            }
            (Some(drop_in), None) => ConfigTarget::daemon(drop_in, daemon).drop_in(true),
            (None, name) => ConfigTarget::daemon(name.as_deref().unwrap_or(daemon.as_str()), daemon),
        },
    };

    let target = builder.mode(cfg.mode).build()?;

    let mut document = IniDocument::new();
    for assignment in &cfg.assignments {
        let section = match &assignment.section {
            Some(section) => camelize(section),
            None => conf_type.section_name().to_owned(),
        };
        document.append(
            section,
            OptionLine::from_attribute(&assignment.key, &assignment.value),
        );
    }

    Ok(ConfFile::new(target, document)?)
}

fn run(cfg: &CliOptions) -> Result<(), CliError> {
    let resolver = match &cfg.root {
        Some(root) => PathResolver::with_root(root),
        None => PathResolver::from_env_or_default(CONF_ROOT_ENV),
    };
    debug!("Using configuration root {:?}", resolver.root());

    let conf_file = build_conf_file(cfg)?;
    let path = conf_file.path(&resolver);

    if cfg.dry_run {
        let mut stdout = io::stdout().lock();
        if cfg.delete {
            writeln!(stdout, "# would remove {}", path.display())?;
        } else {
            writeln!(stdout, "# {}", path.display())?;
            conf_file.write_to(&mut stdout)?;
        }
        return Ok(());
    }

    if cfg.delete {
        if !conf_file.delete(&resolver)? {
            info!("Nothing to remove at {path:?}");
        }
        return Ok(());
    }

    if conf_file.document().is_empty() {
        warn!("No options given, {path:?} will be empty");
    }

    if !conf_file.target().is_drop_in() {
        for drop_in in list_drop_ins(&resolver, conf_file.target())? {
            info!("{drop_in:?} overrides settings of {path:?}");
        }
    }

    conf_file.save(&resolver)?;

    Ok(())
}

fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let cfg = match parse_args(args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {e}");
            help();
            return ExitCode::FAILURE;
        }
    };

    if cfg.version {
        println!("systemd-conf {SYSTEMD_CONF_VERSION}");
        return ExitCode::SUCCESS;
    }

    // stdout is reserved for --dry-run output
    let _ = simplelog::WriteLogger::init(
        log_level(cfg.verbose),
        simplelog::ConfigBuilder::new()
            .set_time_level(LevelFilter::Off)
            .build(),
        io::stderr(),
    );

    debug!("Starting systemd-conf with {cfg:?}");

    match run(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("systemd-conf")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    mod parse_args {
        use super::*;

        #[test]
        fn version_needs_no_type() {
            let cfg = parse_args(args(&["--version"])).unwrap();

            assert!(cfg.version);
        }

        #[test]
        fn missing_type_fails() {
            let res = parse_args(args(&["-v"]));

            assert!(matches!(res, Err(CliError::Usage(_))));
        }

        #[test]
        fn unknown_flag_fails() {
            let res = parse_args(args(&["--force", "coredump"]));

            assert!(matches!(res, Err(CliError::Usage(_))));
        }

        #[test]
        fn option_without_value_fails() {
            let res = parse_args(args(&["service", "sshd", "--drop-in"]));

            assert!(matches!(res, Err(CliError::Usage(_))));
        }

        #[test]
        fn full_command_line() {
            let cfg = parse_args(args(&[
                "-v",
                "--root",
                "/mnt/etc/systemd",
                "--user",
                "--drop-in=10-restart",
                "service",
                "syncthing",
                "restart=always",
                "unit.description=File sync",
                "ExecStart=",
            ]))
            .unwrap();

            assert_eq!(
                cfg,
                CliOptions {
                    assignments: vec![
                        Assignment {
                            section: None,
                            key: "restart".into(),
                            value: "always".into(),
                        },
                        Assignment {
                            section: Some("unit".into()),
                            key: "description".into(),
                            value: "File sync".into(),
                        },
                        Assignment {
                            section: None,
                            key: "ExecStart".into(),
                            value: "".into(),
                        },
                    ],
                    conf_type: Some("service".into()),
                    delete: false,
                    drop_in: Some("10-restart".into()),
                    dry_run: false,
                    mode: Mode::User,
                    name: Some("syncthing".into()),
                    root: Some("/mnt/etc/systemd".into()),
                    verbose: true,
                    version: false,
                }
            );
        }

        #[test]
        fn empty_inline_option_value_fails() {
            for arg in ["--root=", "--drop-in="] {
                let res = parse_args(args(&[arg, "service", "sshd", "restart=always"]));

                assert!(matches!(res, Err(CliError::Usage(_))), "{arg:?} should be rejected");
            }
        }

        #[test]
        fn inline_and_separate_option_values_agree() {
            let inline = parse_args(args(&["--root=/mnt/etc/systemd", "coredump"])).unwrap();
            let separate = parse_args(args(&["--root", "/mnt/etc/systemd", "coredump"])).unwrap();

            assert_eq!(inline, separate);
            assert_eq!(inline.root, Some(PathBuf::from("/mnt/etc/systemd")));
        }

        #[test]
        fn name_after_assignments_fails() {
            let res = parse_args(args(&["service", "restart=always", "sshd"]));

            assert!(matches!(res, Err(CliError::Usage(_))));
        }

        #[test]
        fn invalid_assignment_fails() {
            let res = parse_args(args(&["coredump", "=external"]));

            assert!(matches!(res, Err(CliError::Usage(_))));
        }
    }

    mod log_level {
        use super::*;

        #[test]
        fn verbose_enables_debug_messages() {
            assert_eq!(log_level(true), LevelFilter::Debug);
            assert_eq!(log_level(false), LevelFilter::Info);
        }
    }

    mod build_conf_file {
        use super::*;

        #[test]
        fn coredump_daemon() {
            let cfg = parse_args(args(&[
                "coredump",
                "storage=external",
                "compress=yes",
                "process_size_max=2G",
            ]))
            .unwrap();

            let conf_file = build_conf_file(&cfg).unwrap();

            assert_eq!(
                conf_file.path(&PathResolver::default()),
                PathBuf::from("/etc/systemd/coredump.conf")
            );
            assert_eq!(
                conf_file.contents().unwrap(),
                "[Coredump]\nStorage=external\nCompress=yes\nProcessSizeMax=2G\n"
            );
        }

        #[test]
        fn daemon_drop_in() {
            let cfg = parse_args(args(&["--drop-in", "50-custom", "coredump", "storage=none"]))
                .unwrap();

            let conf_file = build_conf_file(&cfg).unwrap();

            assert_eq!(
                conf_file.path(&PathResolver::default()),
                PathBuf::from("/etc/systemd/coredump.conf.d/50-custom.conf")
            );
        }

        #[test]
        fn daemon_drop_in_with_name_fails() {
            let cfg = parse_args(args(&["--drop-in", "50-custom", "journald", "journald"]))
                .unwrap();

            assert!(matches!(build_conf_file(&cfg), Err(CliError::Usage(_))));
        }

        #[test]
        fn unit_drop_in_groups_sections() {
            let cfg = parse_args(args(&[
                "--drop-in",
                "10-restart",
                "service",
                "sshd",
                "restart=always",
                "unit.after=network.target",
                "restart_sec=5",
            ]))
            .unwrap();

            let conf_file = build_conf_file(&cfg).unwrap();

            assert_eq!(
                conf_file.path(&PathResolver::default()),
                PathBuf::from("/etc/systemd/system/sshd.service.d/10-restart.conf")
            );
            assert_eq!(
                conf_file.contents().unwrap(),
                "[Service]\nRestart=always\nRestartSec=5\n\n[Unit]\nAfter=network.target\n"
            );
        }

        #[test]
        fn unit_without_name_fails() {
            let cfg = parse_args(args(&["timer", "on_calendar=daily"])).unwrap();

            assert!(matches!(build_conf_file(&cfg), Err(CliError::Usage(_))));
        }

        #[test]
        fn unsupported_type_fails() {
            let cfg = parse_args(args(&["container", "web"])).unwrap();

            assert!(matches!(
                build_conf_file(&cfg),
                Err(CliError::Conf(ConfError::InvalidTarget(_)))
            ));
        }

        #[test]
        fn stub_unit_options_fail() {
            let cfg = parse_args(args(&["target", "backup", "foo=bar"])).unwrap();

            assert!(matches!(
                build_conf_file(&cfg),
                Err(CliError::Conf(ConfError::InvalidInput(_)))
            ));
        }
    }
}
