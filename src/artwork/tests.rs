use super::content::locator_path;
use super::*;
use image::{DynamicImage, ImageFormat, Rgba};
use std::cell::Cell;
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, Rgba(px));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// In-memory resolver that counts opens and live streams.
#[derive(Default)]
struct MemoryResolver {
    blobs: HashMap<String, Vec<u8>>,
    opens: Cell<usize>,
    live: Rc<Cell<usize>>,
}

struct TrackedStream {
    inner: Cursor<Vec<u8>>,
    live: Rc<Cell<usize>>,
}

impl Read for TrackedStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

impl ContentResolver for MemoryResolver {
    fn open(&self, locator: &str) -> Result<Box<dyn Read + '_>, ArtworkError> {
        self.opens.set(self.opens.get() + 1);
        let bytes = self.blobs.get(locator).cloned().ok_or_else(|| {
            ArtworkError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                locator.to_string(),
            ))
        })?;
        self.live.set(self.live.get() + 1);
        Ok(Box::new(TrackedStream {
            inner: Cursor::new(bytes),
            live: self.live.clone(),
        }))
    }
}

fn resolver_with(entries: &[(&str, Vec<u8>)]) -> MemoryResolver {
    MemoryResolver {
        blobs: entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        ..Default::default()
    }
}

#[test]
fn absent_or_empty_reference_does_no_io() {
    let r = resolver_with(&[]);
    assert_eq!(resolve(&r, None, 1024), DecodedArtwork::Absent);
    assert_eq!(resolve(&r, Some(""), 1024), DecodedArtwork::Absent);
    assert_eq!(r.opens.get(), 0);
}

#[test]
fn valid_png_decodes_to_bitmap() {
    let r = resolver_with(&[("mem://cover", png_bytes(3, 2, [10, 20, 30, 255]))]);
    let art = resolve(&r, Some("mem://cover"), 1 << 20);
    let img = art.bitmap().expect("bitmap");
    assert_eq!((img.width(), img.height()), (3, 2));
    assert_eq!(img.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    assert_eq!(r.live.get(), 0);
}

#[test]
fn open_failure_and_garbage_are_decode_failed() {
    let r = resolver_with(&[("mem://junk", b"definitely not an image".to_vec())]);
    assert_eq!(
        resolve(&r, Some("mem://missing"), 1024),
        DecodedArtwork::DecodeFailed
    );
    assert_eq!(
        resolve(&r, Some("mem://junk"), 1024),
        DecodedArtwork::DecodeFailed
    );
    assert_eq!(r.live.get(), 0);
}

#[test]
fn truncated_png_is_decode_failed_and_stream_released() {
    let mut bytes = png_bytes(8, 8, [1, 2, 3, 255]);
    bytes.truncate(bytes.len() / 2);
    let r = resolver_with(&[("mem://half", bytes)]);
    assert_eq!(
        resolve(&r, Some("mem://half"), 1 << 20),
        DecodedArtwork::DecodeFailed
    );
    assert_eq!(r.opens.get(), 1);
    assert_eq!(r.live.get(), 0);
}

#[test]
fn oversized_content_is_decode_failed() {
    let bytes = png_bytes(16, 16, [1, 2, 3, 255]);
    let limit = (bytes.len() - 1) as u64;
    let r = resolver_with(&[("mem://big", bytes)]);
    assert_eq!(
        resolve(&r, Some("mem://big"), limit),
        DecodedArtwork::DecodeFailed
    );
    assert_eq!(r.live.get(), 0);
}

#[test]
fn empty_bitmap_is_not_exposed() {
    let art = DecodedArtwork::Bitmap(Arc::new(RgbaImage::new(0, 0)));
    assert!(art.bitmap().is_none());
}

#[test]
fn locator_path_handles_file_urls_and_plain_paths() {
    assert_eq!(
        locator_path("file:///tmp/My%20Cover.png").unwrap(),
        std::path::PathBuf::from("/tmp/My Cover.png")
    );
    assert_eq!(
        locator_path("/tmp/cover.png").unwrap(),
        std::path::PathBuf::from("/tmp/cover.png")
    );
    assert_eq!(
        locator_path("covers/a.jpg").unwrap(),
        std::path::PathBuf::from("covers/a.jpg")
    );
    assert!(matches!(
        locator_path("https://example.com/a.png"),
        Err(ArtworkError::UnsupportedScheme(s)) if s == "https"
    ));
}

#[test]
fn fs_resolver_reads_file_urls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cover art.png");
    std::fs::write(&path, png_bytes(2, 2, [9, 9, 9, 255])).unwrap();
    let url = url::Url::from_file_path(&path).unwrap();

    let art = resolve(&FsContentResolver, Some(url.as_str()), 1 << 20);
    assert!(art.bitmap().is_some());

    let missing = dir.path().join("missing.png");
    assert_eq!(
        resolve(&FsContentResolver, missing.to_str(), 1 << 20),
        DecodedArtwork::DecodeFailed
    );
}
