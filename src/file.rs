//! Whole-file loading.
use std::{
    fs::File,
    io::{self, Cursor, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Errors that can occur while loading a file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be opened.
    #[error("failed to open file {path:?}")]
    Open {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file could not be read.
    #[error("failed to read file {path:?}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not a SPIR-V module.
    #[error("invalid SPIR-V in {path:?}")]
    InvalidSpirv {
        /// Path that was read.
        path: PathBuf,
        /// Why the contents were rejected.
        #[source]
        source: io::Error,
    },
}

/// Reads the entire file at `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, FileError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| FileError::Open {
        path: path.to_owned(),
        source,
    })?;

    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|source| FileError::Read {
            path: path.to_owned(),
            source,
        })?;

    Ok(buffer)
}

/// Reads a SPIR-V module as words, fixing up endianness if needed.
pub fn read_spirv(path: impl AsRef<Path>) -> Result<Vec<u32>, FileError> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    ash::util::read_spv(&mut Cursor::new(bytes)).map_err(|source| FileError::InvalidSpirv {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPIRV_MAGIC: u32 = 0x0723_0203;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "vulkan-windowed-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_whole_file() {
        let path = temp_file("whole", b"\x00\x01binary\xff");
        assert_eq!(read_file(&path).unwrap(), b"\x00\x01binary\xff");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_fails_to_open() {
        let path = std::env::temp_dir().join("vulkan-windowed-does-not-exist.spv");
        match read_file(&path) {
            Err(FileError::Open { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn reads_spirv_words() {
        let words = [SPIRV_MAGIC, 0x0001_0000, 0, 1, 0];
        let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).collect();
        let path = temp_file("valid.spv", &bytes);

        assert_eq!(read_spirv(&path).unwrap(), words);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_truncated_spirv() {
        let path = temp_file("truncated.spv", &SPIRV_MAGIC.to_le_bytes()[..3]);

        assert!(matches!(
            read_spirv(&path),
            Err(FileError::InvalidSpirv { .. })
        ));
        std::fs::remove_file(path).unwrap();
    }
}
