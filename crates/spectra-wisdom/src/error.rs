//! Error types for wisdom import and export.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Which import transport rejected a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportPath {
    /// The platform default wisdom file.
    FromSystem,
    /// A caller-named file.
    FromFile,
    /// An in-memory string.
    FromString,
    /// The registered byte source.
    Import,
}

impl fmt::Display for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FromSystem => "from_system",
            Self::FromFile => "from_file",
            Self::FromString => "from_string",
            Self::Import => "import",
        })
    }
}

/// Errors from wisdom transports and hook registration.
#[derive(Debug)]
pub enum WisdomError {
    /// A file could not be opened or written during export.
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// An import was rejected; the accumulated wisdom is unchanged.
    Import(ImportPath),
    /// An export sink is already registered for this process.
    SinkAlreadyBound,
    /// An import source is already registered for this process.
    SourceAlreadyBound,
    /// Callback export was requested before a sink was registered.
    SinkUnbound,
    /// Callback import was requested before a source was registered.
    SourceUnbound,
}

impl fmt::Display for WisdomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "wisdom I/O error on {}: {source}", path.display())
            }
            Self::Import(path) => write!(f, "wisdom import failed: {path}"),
            Self::SinkAlreadyBound => write!(f, "wisdom export sink already registered"),
            Self::SourceAlreadyBound => write!(f, "wisdom import source already registered"),
            Self::SinkUnbound => write!(f, "no wisdom export sink registered"),
            Self::SourceUnbound => write!(f, "no wisdom import source registered"),
        }
    }
}

impl std::error::Error for WisdomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
