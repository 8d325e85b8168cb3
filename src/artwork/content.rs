use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use url::Url;

use super::ArtworkError;

/// Opens byte streams for content locators.
pub trait ContentResolver {
    fn open(&self, locator: &str) -> Result<Box<dyn Read + '_>, ArtworkError>;
}

/// Local filesystem resolver for `file://` URLs and plain paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentResolver;

impl ContentResolver for FsContentResolver {
    fn open(&self, locator: &str) -> Result<Box<dyn Read + '_>, ArtworkError> {
        let path = locator_path(locator)?;
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Map a locator to a filesystem path. `file://` URLs are percent-decoded;
/// anything that does not parse as an absolute URL is taken as a path.
pub fn locator_path(locator: &str) -> Result<PathBuf, ArtworkError> {
    match Url::parse(locator) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| ArtworkError::InvalidLocator(locator.to_string())),
        Ok(url) => Err(ArtworkError::UnsupportedScheme(url.scheme().to_string())),
        Err(_) => Ok(PathBuf::from(locator)),
    }
}
