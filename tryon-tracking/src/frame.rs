//! Frame sources
//!
//! A [`FrameSource`] stands in for the capture device: each detection cycle
//! takes one frame from it. A still image never advances; sequences and
//! blank frames behave like a live camera.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tryon_core::{Error, Result};

/// One captured frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic frame counter of the source
    pub index: u64,
    pub image: Arc<RgbaImage>,
}

impl Frame {
    pub fn new(index: u64, image: Arc<RgbaImage>) -> Self {
        Self { index, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Supplies frames to the detection loop
pub trait FrameSource {
    /// Frame size in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Whether the source produces new frames over time
    fn is_live(&self) -> bool;

    /// Capture the next frame
    fn next_frame(&mut self) -> Result<Frame>;
}

fn open_rgba(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)
        .map_err(|e| Error::asset_load(path, e))?
        .into_rgba8())
}

/// A single image that never changes
#[derive(Debug, Clone)]
pub struct StillImage {
    image: Arc<RgbaImage>,
}

impl StillImage {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(open_rgba(path.as_ref())?))
    }
}

impl FrameSource for StillImage {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn is_live(&self) -> bool {
        false
    }

    fn next_frame(&mut self) -> Result<Frame> {
        Ok(Frame::new(0, self.image.clone()))
    }
}

/// Image files played in name order, looping at the end
#[derive(Debug, Clone)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    dimensions: (u32, u32),
    next: u64,
}

const SEQUENCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

impl ImageSequence {
    /// Sequence over the given files; the first file fixes the frame size
    pub fn new(paths: Vec<PathBuf>) -> Result<Self> {
        let first = paths
            .first()
            .ok_or_else(|| Error::InvalidData("image sequence is empty".into()))?;
        let dimensions = image::image_dimensions(first).map_err(|e| Error::asset_load(first, e))?;
        Ok(Self {
            paths,
            dimensions,
            next: 0,
        })
    }

    /// Every image file in a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SEQUENCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image {
                paths.push(path);
            }
        }
        paths.sort();
        info!(dir = %dir.display(), frames = paths.len(), "image sequence opened");
        Self::new(paths)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn is_live(&self) -> bool {
        true
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let index = self.next;
        let path = &self.paths[(index % self.paths.len() as u64) as usize];
        let image = open_rgba(path)?;
        if image.dimensions() != self.dimensions {
            return Err(Error::InvalidData(format!(
                "{} is {:?}, expected {:?}",
                path.display(),
                image.dimensions(),
                self.dimensions
            )));
        }
        self.next += 1;
        Ok(Frame::new(index, Arc::new(image)))
    }
}

/// Live source of solid frames, for running without a camera
#[derive(Debug, Clone)]
pub struct BlankFrames {
    image: Arc<RgbaImage>,
    next: u64,
}

impl BlankFrames {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: Arc::new(RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]))),
            next: 0,
        }
    }
}

impl FrameSource for BlankFrames {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn is_live(&self) -> bool {
        true
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let frame = Frame::new(self.next, self.image.clone());
        self.next += 1;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_image_does_not_advance() {
        let mut still = StillImage::new(RgbaImage::new(4, 3));
        assert!(!still.is_live());
        assert_eq!(still.next_frame().unwrap().index, 0);
        assert_eq!(still.next_frame().unwrap().index, 0);
        assert_eq!(still.dimensions(), (4, 3));
    }

    #[test]
    fn test_blank_frames_count_up() {
        let mut blank = BlankFrames::new(8, 6);
        assert!(blank.is_live());
        let a = blank.next_frame().unwrap();
        let b = blank.next_frame().unwrap();
        assert_eq!((a.index, b.index), (0, 1));
        assert_eq!(b.dimensions(), (8, 6));
    }

    #[test]
    fn test_sequence_loops() {
        let dir = std::env::temp_dir().join(format!("tryon-seq-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b.png", "a.png"] {
            RgbaImage::new(2, 2).save(dir.join(name)).unwrap();
        }
        std::fs::write(dir.join("notes.txt"), "skip me").unwrap();

        let mut seq = ImageSequence::from_dir(&dir).unwrap();
        assert_eq!(seq.len(), 2);
        let indices: Vec<u64> = (0..3).map(|_| seq.next_frame().unwrap().index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        assert!(ImageSequence::new(Vec::new()).is_err());
    }
}
