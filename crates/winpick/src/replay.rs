//! Recorded desktop replay.
//!
//! A directory of screenshots stands in for a live remote session: the
//! capture returns the screenshot under the cursor and each window switch
//! moves the cursor to the next one, wrapping around.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};
use winpick_core::{Error, Frame, PixelFormat, Result};
use winpick_session::{Cycler, FrameSource};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Desktop replayed from recorded frames.
#[derive(Debug, Default)]
pub struct ReplayDesktop {
    frames: Vec<Frame>,
    cursor: AtomicUsize,
    advances: AtomicUsize,
}

impl ReplayDesktop {
    /// Replay the given frames.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            cursor: AtomicUsize::new(0),
            advances: AtomicUsize::new(0),
        }
    }

    /// Load every PNG/JPEG file in `dir`, ordered by file name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_frame_file(path))
            .collect();
        paths.sort();

        let frames = paths
            .iter()
            .map(|path| load_frame(path))
            .collect::<Result<Vec<_>>>()?;

        info!("Loaded {} frames from {}", frames.len(), dir.display());
        Ok(Self::new(frames))
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the frame the next capture returns.
    pub fn position(&self) -> usize {
        match self.frames.len() {
            0 => 0,
            n => self.cursor.load(Ordering::SeqCst) % n,
        }
    }

    /// Number of window switches so far.
    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path)
        .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    debug!("Loaded {} ({}x{})", path.display(), width, height);

    Ok(Frame::new(image.into_raw(), width, height, PixelFormat::Rgba8))
}

#[async_trait]
impl FrameSource for ReplayDesktop {
    async fn capture(&self) -> Result<Option<Frame>> {
        Ok(self.frames.get(self.position()).cloned())
    }
}

#[async_trait]
impl Cycler for ReplayDesktop {
    async fn advance(&self) -> Result<()> {
        self.cursor.fetch_add(1, Ordering::SeqCst);
        self.advances.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gray_frame(value: u8) -> Frame {
        Frame::new(vec![value], 1, 1, PixelFormat::Gray8)
    }

    #[tokio::test]
    async fn test_cycler_wraps_around() {
        let desktop = ReplayDesktop::new(vec![gray_frame(1), gray_frame(2)]);

        assert_eq!(desktop.capture().await.unwrap().unwrap().pixels(), &[1]);
        desktop.advance().await.unwrap();
        assert_eq!(desktop.capture().await.unwrap().unwrap().pixels(), &[2]);
        desktop.advance().await.unwrap();
        assert_eq!(desktop.capture().await.unwrap().unwrap().pixels(), &[1]);
        assert_eq!(desktop.advances(), 2);
    }

    #[tokio::test]
    async fn test_empty_desktop_has_no_frames() {
        let desktop = ReplayDesktop::default();
        assert!(desktop.capture().await.unwrap().is_none());
        desktop.advance().await.unwrap();
        assert_eq!(desktop.position(), 0);
    }

    #[test]
    fn test_from_dir_orders_by_name_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(2, 1, Rgba([9, 9, 9, 255]))
            .save(dir.path().join("b.png"))
            .unwrap();
        RgbaImage::from_pixel(3, 1, Rgba([9, 9, 9, 255]))
            .save(dir.path().join("a.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let desktop = ReplayDesktop::from_dir(dir.path()).unwrap();

        assert_eq!(desktop.len(), 2);
        assert_eq!(desktop.frames[0].width(), 3);
        assert_eq!(desktop.frames[1].width(), 2);
    }

    #[test]
    fn test_frame_extensions() {
        assert!(is_frame_file(Path::new("shot-01.png")));
        assert!(is_frame_file(Path::new("shot-01.JPG")));
        assert!(is_frame_file(Path::new("shot.jpeg")));
        assert!(!is_frame_file(Path::new("shot.gif")));
        assert!(!is_frame_file(Path::new("README")));
    }

    #[test]
    fn test_from_dir_rejects_corrupt_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        assert!(matches!(
            ReplayDesktop::from_dir(dir.path()),
            Err(Error::Image(_))
        ));
    }

    #[test]
    fn test_missing_dir() {
        assert!(matches!(
            ReplayDesktop::from_dir("/nonexistent/frames"),
            Err(Error::Io(_))
        ));
    }
}
