use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod capacities;
pub mod file_reader;
pub mod lanes;
pub mod network;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("could not open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path:?} at '{location}': {message}")]
    Parse {
        path: PathBuf,
        location: String,
        message: String,
    },
    #[error("unsupported file format of {0:?}. Expected .yml, .yaml or .json, optionally .gz")]
    UnsupportedFormat(PathBuf),
    #[error("{kind} '{id}' referenced by {referenced_by} does not exist")]
    UnknownReference {
        kind: &'static str,
        id: String,
        referenced_by: String,
    },
    #[error("link {link} has more than one lane leading to other lanes. Only an original lane followed by to-node lanes is supported")]
    LaneTree { link: String },
    #[error("lanes of link {link} are defined more than once")]
    DuplicateAssignment { link: String },
}

/// Resolves paths in a config file relative to the config file. Absolute paths and paths starting
/// with './' are taken as they are.
pub fn resolve_path(config_path: Option<&Path>, file: &str) -> PathBuf {
    let file_path = PathBuf::from(file);
    if file_path.is_absolute() || file_path.starts_with("./") {
        return file_path;
    }

    if let Some(path) = config_path.and_then(|c| c.parent()) {
        path.join(file_path)
    } else {
        file_path
    }
}
