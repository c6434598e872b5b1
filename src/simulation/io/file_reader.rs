use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::simulation::io::IoError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<(Format, bool), IoError> {
    let name = path.to_string_lossy();
    let (name, gzipped) = match name.strip_suffix(".gz") {
        Some(stripped) => (stripped, true),
        None => (name.as_ref(), false),
    };

    if name.ends_with(".yml") || name.ends_with(".yaml") {
        Ok((Format::Yaml, gzipped))
    } else if name.ends_with(".json") {
        Ok((Format::Json, gzipped))
    } else {
        Err(IoError::UnsupportedFormat(path.to_path_buf()))
    }
}

/// Reads a yaml or json file into T. Files ending with '.gz' are decompressed on the fly.
pub fn read<T>(file_path: &Path) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    info!("file_reader::read: Starting to read file at: {file_path:?}");
    let (format, gzipped) = format_of(file_path)?;
    let file = File::open(file_path).map_err(|source| IoError::Open {
        path: file_path.to_path_buf(),
        source,
    })?;
    let buffered_reader = BufReader::new(file);

    let reader: Box<dyn BufRead> = if gzipped {
        // use full name, to avoid ambiguity
        let decoder = flate2::read::GzDecoder::new(buffered_reader);
        Box::new(BufReader::new(decoder))
    } else {
        Box::new(buffered_reader)
    };

    match format {
        Format::Yaml => {
            let deserializer = serde_yaml::Deserializer::from_reader(reader);
            serde_path_to_error::deserialize(deserializer)
                .map_err(|e| parse_error(file_path, e.path().to_string(), e.inner()))
        }
        Format::Json => {
            let mut deserializer = serde_json::Deserializer::from_reader(reader);
            serde_path_to_error::deserialize(&mut deserializer)
                .map_err(|e| parse_error(file_path, e.path().to_string(), e.inner()))
        }
    }
}

fn parse_error(path: &Path, location: String, error: &impl std::fmt::Display) -> IoError {
    IoError::Parse {
        path: path.to_path_buf(),
        location,
        message: error.to_string(),
    }
}

/// Writes T as pretty printed json. Missing parent directories are created.
pub fn write_json<T: Serialize>(value: &T, file_path: &Path) -> Result<(), IoError> {
    let write_error = |source| IoError::Write {
        path: PathBuf::from(file_path),
        source,
    };

    if let Some(prefix) = file_path.parent() {
        std::fs::create_dir_all(prefix).map_err(write_error)?;
    }
    let file = File::create(file_path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| write_error(std::io::Error::other(e)))?;
    writer.flush().map_err(write_error)?;

    info!("file_reader::write_json: Finished writing {file_path:?}");
    Ok(())
}
