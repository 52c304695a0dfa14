mod conf_file;
mod constants;
mod ini;
mod kinds;
mod options;
mod path;
mod target;

pub use self::conf_file::*;
pub use self::constants::*;
pub use self::ini::*;
pub use self::kinds::*;
pub use self::options::*;
pub use self::path::*;
pub use self::target::*;

use std::io;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}: {1}")]
    Io(String, #[source] io::Error),
}
