use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageDecoder};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

/// Frame rate assumed for animations whose frames carry no delay.
pub const DEFAULT_ANIMATION_FPS: f32 = 10.0;

// --- Image Metadata ---

/// What the layout engine needs to know about a decoded picture. Pixel data
/// stays with the image collaborator; frames are texture handles it can
/// resolve.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<String>,
    pub fps: f32,
}

impl ImageInfo {
    pub fn still(path: &str, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: vec![texture_key(path, 0, 1)],
            fps: 0.0,
        }
    }

    pub fn animation(path: &str, width: u32, height: u32, frame_count: usize, fps: f32) -> Self {
        let frame_count = frame_count.max(1);
        Self {
            width,
            height,
            frames: (0..frame_count)
                .map(|i| texture_key(path, i, frame_count))
                .collect(),
            fps: if frame_count > 1 { fps } else { 0.0 },
        }
    }

    #[inline(always)]
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Handle of the first frame, used for still renditions.
    pub fn first_frame(&self) -> &str {
        self.frames.first().map_or("", String::as_str)
    }
}

/// Texture handle for one frame: the path itself for stills, `path#N` for
/// animation frames.
pub fn texture_key(path: &str, frame: usize, frame_count: usize) -> String {
    let path = canonical_path(path);
    if frame_count > 1 {
        format!("{path}#{frame}")
    } else {
        path
    }
}

/// Interface files are written on Windows; normalize separators.
pub fn canonical_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}

// --- Image Sources ---

/// Image collaborator seam: resolves a picture value to its metadata.
pub trait ImageSource {
    fn load(&self, path: &str) -> Result<Arc<ImageInfo>, String>;
}

/// Reads headers (and GIF frame tables) from an art directory.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    root: PathBuf,
}

impl FileImageSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn load_gif(&self, path: &str, full: &Path) -> Result<ImageInfo, String> {
        let file = File::open(full).map_err(|e| format!("failed to open '{}': {e}", full.display()))?;
        let decoder = GifDecoder::new(BufReader::new(file))
            .map_err(|e| format!("failed to read gif '{}': {e}", full.display()))?;
        let (w, h) = decoder.dimensions();
        // Frames are dropped as soon as they are counted; only the first delay is kept.
        let (count, first_delay) = decoder
            .into_frames()
            .try_fold((0usize, None), |(count, first), frame| {
                let frame = frame?;
                Ok::<_, image::ImageError>((count + 1, first.or(Some(frame.delay()))))
            })
            .map_err(|e| format!("failed to decode gif frames '{}': {e}", full.display()))?;
        let fps = first_delay.map_or(DEFAULT_ANIMATION_FPS, |delay| {
            let (num, den) = delay.numer_denom_ms();
            let ms = num as f32 / den.max(1) as f32;
            if ms > 0.0 { 1000.0 / ms } else { DEFAULT_ANIMATION_FPS }
        });
        Ok(ImageInfo::animation(path, w, h, count, fps))
    }
}

impl ImageSource for FileImageSource {
    fn load(&self, path: &str) -> Result<Arc<ImageInfo>, String> {
        let rel = canonical_path(path);
        let full = self.root.join(&rel);
        let is_gif = full
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
        let info = if is_gif {
            self.load_gif(&rel, &full)?
        } else {
            let (w, h) = image::image_dimensions(&full)
                .map_err(|e| format!("failed to read image '{}': {e}", full.display()))?;
            ImageInfo::still(&rel, w, h)
        };
        debug!(
            "Loaded '{}' ({}x{}, {} frame(s))",
            rel,
            info.width,
            info.height,
            info.frames.len()
        );
        Ok(Arc::new(info))
    }
}

/// Images already decoded by the codec collaborator, keyed by filename.
#[derive(Debug, Clone, Default)]
pub struct DecodedImages {
    images: FxHashMap<String, Arc<ImageInfo>>,
}

impl DecodedImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, info: ImageInfo) {
        self.images.insert(canonical_path(path), Arc::new(info));
    }

    pub fn insert_still(&mut self, path: &str, width: u32, height: u32) {
        self.insert(path, ImageInfo::still(path, width, height));
    }

    pub fn insert_animation(&mut self, path: &str, width: u32, height: u32, frames: usize, fps: f32) {
        self.insert(path, ImageInfo::animation(path, width, height, frames, fps));
    }
}

impl ImageSource for DecodedImages {
    fn load(&self, path: &str) -> Result<Arc<ImageInfo>, String> {
        self.images
            .get(&canonical_path(path))
            .cloned()
            .ok_or_else(|| format!("image '{path}' has not been decoded"))
    }
}

/// Caller-owned memo over another source. Failures are cached too so a
/// missing file is reported once.
pub struct ImageCache<S> {
    source: S,
    entries: RwLock<FxHashMap<String, Result<Arc<ImageInfo>, String>>>,
}

impl<S: ImageSource> ImageCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        info!("Dropping {} cached image entries", entries.len());
        entries.clear();
    }
}

impl<S: ImageSource> ImageSource for ImageCache<S> {
    fn load(&self, path: &str) -> Result<Arc<ImageInfo>, String> {
        let key = canonical_path(path);
        {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(hit) = entries.get(&key) {
                return hit.clone();
            }
        }
        let loaded = self.source.load(&key);
        if let Err(e) = &loaded {
            warn!("{e}");
        }
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key, loaded.clone());
        loaded
    }
}
