//! Media assets addressed by fixed logical names.
//!
//! The two layers involved in the timed cross-fade are decoded eagerly at
//! startup; the final frame is decoded lazily on first use. A missing or
//! broken asset is logged and its layer renders as absent.

use anyhow::{Context, Result, bail};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};
use log::{debug, error, info, warn};
use once_cell::unsync::OnceCell;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Start image.
pub const START_IMAGE: &str = "image.png";
/// Animated sequence.
pub const ANIMATION: &str = "video.gif";
/// Freeze-frame shown at the end.
pub const FINAL_FRAME: &str = "final-frame.jpg";
/// Audio cue.
pub const AUDIO_CUE: &str = "audio.mp3";

/// Lower clamp for any frame delay.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);
/// Browsers treat GIF delays at or under 10 ms as this.
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// One decoded animation frame.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub image: RgbaImage,
    pub delay: Duration,
}

/// Decoded animated image. Loops over its own frame delays.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<AnimationFrame>,
    total: Duration,
}

impl Animation {
    pub fn from_frames(frames: Vec<AnimationFrame>) -> Result<Self> {
        if frames.is_empty() {
            bail!("animation has no frames");
        }
        let total = frames.iter().map(|f| f.delay).sum();
        Ok(Self { frames, total })
    }

    /// Decode every frame of a GIF stream.
    pub fn decode_gif<R: BufRead + Seek>(reader: R) -> Result<Self> {
        let decoder = GifDecoder::new(reader).context("Invalid GIF header")?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .context("Failed to decode GIF frames")?
            .into_iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                let delay = normalize_delay(Duration::from_millis(u64::from(numer / denom.max(1))));
                AnimationFrame {
                    image: frame.into_buffer(),
                    delay,
                }
            })
            .collect();
        Self::from_frames(frames)
    }

    /// Load from disk. Non-GIF files become a single still frame.
    pub fn from_path(path: &Path) -> Result<Self> {
        let is_gif = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
        if is_gif {
            let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            Self::decode_gif(BufReader::new(file)).with_context(|| format!("Failed to load {}", path.display()))
        } else {
            let image = load_still(path)?;
            Self::from_frames(vec![AnimationFrame {
                image,
                delay: DEFAULT_FRAME_DELAY,
            }])
        }
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Length of one loop.
    pub fn duration(&self) -> Duration {
        self.total
    }

    pub fn size(&self) -> [u32; 2] {
        let first = &self.frames[0].image;
        [first.width(), first.height()]
    }

    /// Index of the frame visible `elapsed` after the animation started.
    pub fn frame_at(&self, elapsed: Duration) -> usize {
        if self.frames.len() == 1 || self.total.is_zero() {
            return 0;
        }
        let total_ns = self.total.as_nanos();
        let mut t = elapsed.as_nanos() % total_ns;
        for (idx, frame) in self.frames.iter().enumerate() {
            let d = frame.delay.as_nanos();
            if t < d {
                return idx;
            }
            t -= d;
        }
        self.frames.len() - 1
    }
}

fn normalize_delay(delay: Duration) -> Duration {
    if delay <= Duration::from_millis(10) {
        DEFAULT_FRAME_DELAY
    } else {
        delay.max(MIN_FRAME_DELAY)
    }
}

/// Decode a still image to RGBA8.
pub fn load_still(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("Failed to load image {}", path.display()))?;
    debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image.to_rgba8())
}

/// Still image decoded on first access. A failed decode is logged once and
/// remembered.
pub struct LazyImage {
    path: PathBuf,
    cell: OnceCell<Option<RgbaImage>>,
}

impl LazyImage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cell: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Option<&RgbaImage> {
        self.cell
            .get_or_init(|| match load_still(&self.path) {
                Ok(image) => {
                    info!("Final frame loaded: {}", self.path.display());
                    Some(image)
                }
                Err(e) => {
                    error!("{:#}", e);
                    None
                }
            })
            .as_ref()
    }
}

/// Everything the screen presents.
pub struct Assets {
    pub dir: PathBuf,
    pub start: Option<RgbaImage>,
    pub animation: Option<Animation>,
    pub final_frame: LazyImage,
}

impl Assets {
    /// Decode the eager assets from `dir`.
    pub fn load(dir: &Path) -> Self {
        info!("Loading assets from {}", dir.display());

        let start = load_still(&dir.join(START_IMAGE))
            .map_err(|e| warn!("{:#}", e))
            .ok();
        let animation = Animation::from_path(&dir.join(ANIMATION))
            .map_err(|e| warn!("{:#}", e))
            .ok();
        if let Some(anim) = &animation {
            info!(
                "Animation: {} frames, {:.2}s per loop",
                anim.len(),
                anim.duration().as_secs_f32()
            );
        }

        Self {
            dir: dir.to_path_buf(),
            start,
            animation,
            final_frame: LazyImage::new(dir.join(FINAL_FRAME)),
        }
    }

    pub fn audio_path(&self) -> PathBuf {
        self.dir.join(AUDIO_CUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba};
    use std::io::Cursor;

    fn gif_bytes(delays_ms: &[u32]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut buf);
            let frames = delays_ms.iter().enumerate().map(|(i, &ms)| {
                let shade = (i * 60) as u8;
                let image = RgbaImage::from_pixel(4, 3, Rgba([shade, 0, 0, 255]));
                Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(ms, 1))
            });
            encoder.encode_frames(frames).unwrap();
        }
        buf
    }

    fn frame(delay_ms: u64) -> AnimationFrame {
        AnimationFrame {
            image: RgbaImage::new(1, 1),
            delay: Duration::from_millis(delay_ms),
        }
    }

    #[test]
    fn test_decode_gif_frames_and_delays() {
        let anim = Animation::decode_gif(Cursor::new(gif_bytes(&[100, 200, 50]))).unwrap();
        assert_eq!(anim.len(), 3);
        assert_eq!(anim.size(), [4, 3]);
        assert_eq!(anim.duration(), Duration::from_millis(350));
    }

    #[test]
    fn test_zero_delay_treated_as_default() {
        let anim = Animation::decode_gif(Cursor::new(gif_bytes(&[0, 0]))).unwrap();
        assert!(anim.frames().iter().all(|f| f.delay == DEFAULT_FRAME_DELAY));
    }

    #[test]
    fn test_frame_at_loops() {
        let anim = Animation::from_frames(vec![frame(100), frame(200), frame(50)]).unwrap();
        let at = |ms| anim.frame_at(Duration::from_millis(ms));
        assert_eq!(at(0), 0);
        assert_eq!(at(99), 0);
        assert_eq!(at(100), 1);
        assert_eq!(at(299), 1);
        assert_eq!(at(300), 2);
        assert_eq!(at(350), 0);
        assert_eq!(at(350 * 4 + 120), 1);
    }

    #[test]
    fn test_empty_animation_rejected() {
        assert!(Animation::from_frames(Vec::new()).is_err());
        assert!(Animation::decode_gif(Cursor::new(b"not a gif".to_vec())).is_err());
    }

    #[test]
    fn test_lazy_image_defers_and_remembers_failure() {
        let lazy = LazyImage::new(std::env::temp_dir().join("bootseq_test_missing_final.jpg"));
        assert!(!lazy.is_loaded());
        assert!(lazy.get().is_none());
        assert!(lazy.is_loaded());
        assert!(lazy.get().is_none());
    }

    #[test]
    fn test_short_delays_normalized() {
        let ms = Duration::from_millis;
        assert_eq!(normalize_delay(ms(0)), DEFAULT_FRAME_DELAY);
        assert_eq!(normalize_delay(ms(10)), DEFAULT_FRAME_DELAY);
        assert_eq!(normalize_delay(ms(11)), MIN_FRAME_DELAY);
        assert_eq!(normalize_delay(ms(40)), ms(40));
    }

    #[test]
    fn test_final_frame_left_undecoded_by_load() {
        let dir = std::env::temp_dir().join("bootseq_test_lazy_final");
        std::fs::create_dir_all(&dir).unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255])).save(dir.join(START_IMAGE)).unwrap();
        image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])).save(dir.join(FINAL_FRAME)).unwrap();

        let assets = Assets::load(&dir);
        assert!(assets.start.is_some());
        assert!(!assets.final_frame.is_loaded());
        assert_eq!(assets.final_frame.get().map(|img| img.dimensions()), Some((2, 2)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_dir_loads_nothing_without_panicking() {
        let assets = Assets::load(&std::env::temp_dir().join("bootseq_test_no_such_dir"));
        assert!(assets.start.is_none());
        assert!(assets.animation.is_none());
        assert!(assets.audio_path().ends_with(AUDIO_CUE));
    }
}
