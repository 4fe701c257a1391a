//! Image loaders.

use std::path::Path;

use tracing::debug;

use crate::constants::REGA_MAGIC;
use crate::image::RegaImage;
use crate::Result;

/// Turns container bytes into an analyzable image.
pub trait ImageLoader: Send + Sync {
    /// Short format name.
    fn name(&self) -> &'static str;

    /// Cheap check on leading bytes.
    fn is_valid_for_data(&self, data: &[u8]) -> bool;

    fn load(&self, data: &[u8]) -> Result<RegaImage>;

    /// Read and load a file.
    fn load_file(&self, path: &Path) -> Result<RegaImage> {
        let data = std::fs::read(path)?;
        self.load(&data)
    }
}

/// Loader for REGA files.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegaLoader;

impl ImageLoader for RegaLoader {
    fn name(&self) -> &'static str {
        "REGA"
    }

    fn is_valid_for_data(&self, data: &[u8]) -> bool {
        data.starts_with(&REGA_MAGIC)
    }

    fn load(&self, data: &[u8]) -> Result<RegaImage> {
        let image = RegaImage::parse(data)?;
        debug!(
            program_size = ?image.program_size,
            symbols = image.symbols.len(),
            "loaded REGA image"
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::RegaError;
    use crate::file::tests::rega;

    #[test]
    fn test_is_valid_for_data() {
        assert!(RegaLoader.is_valid_for_data(b"rg\x00\x00"));
        assert!(RegaLoader.is_valid_for_data(b"rg"));
        assert!(!RegaLoader.is_valid_for_data(b"r"));
        assert!(!RegaLoader.is_valid_for_data(b"\x7fELF"));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&rega(&[0xFF, 0, 0, 0], &[("start", 0)]))
            .unwrap();

        let image = RegaLoader.load_file(file.path()).unwrap();
        assert_eq!(image.program_size, Some(4));
        assert_eq!(image.lookup_symbol("start"), Some(0));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegaLoader
            .load_file(&dir.path().join("missing.rega"))
            .unwrap_err();
        assert!(matches!(err, RegaError::Io(_)));
    }

    #[test]
    fn test_load_rejects_bad_magic() {
        assert!(matches!(
            RegaLoader.load(b"MZ\x00\x00"),
            Err(RegaError::InvalidMagic)
        ));
    }
}
