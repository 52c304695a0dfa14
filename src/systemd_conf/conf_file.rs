use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use super::constants::*;
use super::{ConfError, ConfigTarget, IniDocument, IniRenderer, PathResolver, TargetKind};

/// What [`ConfFile::save`] did to the file on disk
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Change {
    Created,
    Updated,
    Unchanged,
}

/// A configuration file: where it goes and what goes into it
#[derive(Clone, Debug, PartialEq)]
pub struct ConfFile {
    target: ConfigTarget,
    document: IniDocument,
}

impl ConfFile {
    pub fn new(target: ConfigTarget, document: IniDocument) -> Result<Self, ConfError> {
        if let TargetKind::Unit { unit_type, .. } = target.kind() {
            let type_section = unit_type.section_name();
            let has_type_options = document
                .iter()
                .any(|(section, lines)| section.eq_ignore_ascii_case(type_section) && !lines.is_empty());

            if !unit_type.accepts_options() && has_type_options {
                return Err(ConfError::InvalidInput(format!(
                    "{unit_type} units don't support [{type_section}] options"
                )));
            }
        }

        Ok(Self { target, document })
    }

    pub fn target(&self) -> &ConfigTarget {
        &self.target
    }

    pub fn document(&self) -> &IniDocument {
        &self.document
    }

    pub fn path(&self, resolver: &PathResolver) -> PathBuf {
        resolver.conf_path(&self.target)
    }

    pub fn contents(&self) -> Result<String, ConfError> {
        IniRenderer::render(&self.document)
    }

    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> Result<(), ConfError> {
        let contents = self.contents()?;

        writer
            .write_all(contents.as_bytes())
            .map_err(|e| ConfError::Io(format!("can't write {:?}", self.target.name()), e))
    }

    /// Writes the file (creating missing directories), unless it already
    /// has the right contents.
    pub fn save(&self, resolver: &PathResolver) -> Result<Change, ConfError> {
        let path = self.path(resolver);
        let contents = self.contents()?;

        let change = match fs::read(&path) {
            Ok(current) if current == contents.as_bytes() => {
                debug!("{path:?} is up to date");
                return Ok(Change::Unchanged);
            }
            Ok(_) => Change::Updated,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Change::Created,
            Err(e) => return Err(ConfError::Io(format!("can't read {path:?}"), e)),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfError::Io(format!("can't create {parent:?}"), e))?;
        }

        debug!("Writing {path:?}");

        write_file(&path, &contents).map_err(|e| ConfError::Io(format!("can't write {path:?}"), e))?;

        info!("{change:?} {path:?}");

        Ok(change)
    }

    /// Removes the file, and for drop-ins the drop-in directory once it's
    /// empty. Returns `false` if there was nothing to remove.
    pub fn delete(&self, resolver: &PathResolver) -> Result<bool, ConfError> {
        let path = self.path(resolver);

        match fs::remove_file(&path) {
            Ok(()) => info!("Removed {path:?}"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{path:?} doesn't exist");
                return Ok(false);
            }
            Err(e) => return Err(ConfError::Io(format!("can't remove {path:?}"), e)),
        }

        if self.target.is_drop_in() {
            let drop_in_dir = resolver.drop_in_root(&self.target);
            let is_empty = fs::read_dir(&drop_in_dir)
                .map_err(|e| ConfError::Io(format!("can't read {drop_in_dir:?}"), e))?
                .next()
                .is_none();

            if is_empty {
                debug!("Removing empty drop-in directory {drop_in_dir:?}");
                fs::remove_dir(&drop_in_dir)
                    .map_err(|e| ConfError::Io(format!("can't remove {drop_in_dir:?}"), e))?;
            }
        }

        Ok(true)
    }
}

fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    let out_file = File::create(path)?;
    let mut writer = BufWriter::new(out_file);

    writer.write_all(contents.as_bytes())?;
    writer.flush()
}

/// Drop-in fragments (`*.conf`) that exist for `target`'s primary file,
/// sorted by name, i.e. in the order systemd applies them.
pub fn list_drop_ins(
    resolver: &PathResolver,
    target: &ConfigTarget,
) -> Result<Vec<PathBuf>, ConfError> {
    let drop_in_dir = resolver.drop_in_root(target);
    let mut drop_ins = Vec::new();

    for entry in WalkDir::new(&drop_in_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if let Some(io_error) = e.io_error() {
                    // ignore missing drop-in directories
                    if io_error.kind() == io::ErrorKind::NotFound {
                        continue;
                    }
                }
                return Err(ConfError::Io(
                    format!("can't read {drop_in_dir:?}"),
                    e.into(),
                ));
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        // Only *.conf supported
        if entry.path().extension().unwrap_or_default() != CONF_EXTENSION {
            continue;
        }

        drop_ins.push(entry.into_path());
    }

    Ok(drop_ins)
}
