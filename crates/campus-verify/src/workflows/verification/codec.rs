//! Transcoding seam used by the normalization pipeline.
//!
//! [`FileImageCodec`] is the on-device implementation: it decodes whatever the `image` crate
//! understands, rotates it upright per its EXIF orientation, resizes against the longest edge,
//! and re-encodes RGB8 pixels as baseline JPEG. Re-encoding from raw pixels drops all metadata.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageError, ImageReader, RgbImage};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranscodeOptions {
    pub longest_edge: u32,
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f32,
    pub format: OutputFormat,
}

/// Encoded output written by a codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodedImage {
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
}

#[async_trait::async_trait]
pub trait ImageCodec: Send + Sync {
    async fn transcode(
        &self,
        uri: &str,
        options: TranscodeOptions,
    ) -> Result<TranscodedImage, CodecError>;

    /// Drops an intermediate output that will not be handed to the caller.
    async fn discard(&self, _uri: &str) {}
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unable to read {uri}: {source}")]
    Read {
        uri: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to decode {uri}: {reason}")]
    Decode { uri: String, reason: String },
    #[error("unable to encode jpeg: {0}")]
    Encode(String),
    #[error("unable to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("transcode task aborted: {0}")]
    Aborted(String),
}

/// Scales `(width, height)` so the longer side equals `longest_edge`, preserving aspect.
pub fn fit_longest_edge(width: u32, height: u32, longest_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let scale = |short: u32, long: u32| -> u32 {
        let scaled = (short as f64 * longest_edge as f64 / long as f64).round();
        (scaled as u32).max(1)
    };

    if width >= height {
        (longest_edge, scale(height, width))
    } else {
        (scale(width, height), longest_edge)
    }
}

static OUTPUT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Filesystem-backed codec built on the `image` crate.
#[derive(Debug, Clone)]
pub struct FileImageCodec {
    output_dir: PathBuf,
}

impl FileImageCodec {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn next_output_path(&self) -> PathBuf {
        let seq = OUTPUT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        self.output_dir.join(format!("transcode-{millis}-{seq:06}.jpg"))
    }

    fn transcode_blocking(
        source_uri: &str,
        output_path: &Path,
        options: TranscodeOptions,
    ) -> Result<TranscodedImage, CodecError> {
        let decoded = Self::decode_upright(source_uri)?;

        let (source_width, source_height) = decoded.dimensions();
        let (width, height) = fit_longest_edge(source_width, source_height, options.longest_edge);
        let resized = if (width, height) == (source_width, source_height) {
            decoded
        } else {
            decoded.resize_exact(width, height, FilterType::Lanczos3)
        };
        let pixels = resized.to_rgb8();

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CodecError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let quality = (options.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
        let byte_size = match Self::write_jpeg(&pixels, output_path, quality, options.format) {
            Ok(byte_size) => byte_size,
            Err(err) => {
                // Never leave a truncated file behind.
                if let Err(cleanup) = std::fs::remove_file(output_path) {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(
                            output = %output_path.display(),
                            error = %cleanup,
                            "could not remove partial output"
                        );
                    }
                }
                return Err(err);
            }
        };

        debug!(
            source = %source_uri,
            output = %output_path.display(),
            original = %format!("{source_width}x{source_height}"),
            encoded = %format!("{width}x{height}"),
            quality,
            byte_size,
            "transcoded image to jpeg"
        );

        Ok(TranscodedImage {
            uri: output_path.to_string_lossy().into_owned(),
            width,
            height,
            byte_size,
        })
    }

    /// Decodes `source_uri` and applies its EXIF orientation so pixels are stored upright.
    fn decode_upright(source_uri: &str) -> Result<DynamicImage, CodecError> {
        let decode_failed = |err: ImageError| CodecError::Decode {
            uri: source_uri.to_string(),
            reason: err.to_string(),
        };

        let reader = ImageReader::open(local_path(source_uri))
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| CodecError::Read {
                uri: source_uri.to_string(),
                source,
            })?;
        let mut decoder = reader.into_decoder().map_err(decode_failed)?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut decoded = DynamicImage::from_decoder(decoder).map_err(decode_failed)?;
        decoded.apply_orientation(orientation);
        Ok(decoded)
    }

    fn write_jpeg(
        pixels: &RgbImage,
        output_path: &Path,
        quality: u8,
        format: OutputFormat,
    ) -> Result<u64, CodecError> {
        let write_failed = |source: std::io::Error| CodecError::Write {
            path: output_path.to_path_buf(),
            source,
        };

        let file = File::create(output_path).map_err(write_failed)?;
        let mut writer = BufWriter::new(file);
        let mut encoder = match format {
            OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut writer, quality),
        };
        encoder
            .encode_image(pixels)
            .map_err(|err| CodecError::Encode(err.to_string()))?;
        drop(encoder);
        let file = writer
            .into_inner()
            .map_err(|err| write_failed(err.into_error()))?;
        Ok(file.metadata().map_err(write_failed)?.len())
    }

    /// Files this codec wrote, and only those, may be discarded.
    fn owns(&self, path: &Path) -> bool {
        path.starts_with(&self.output_dir)
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("transcode-"))
    }
}

#[async_trait::async_trait]
impl ImageCodec for FileImageCodec {
    async fn transcode(
        &self,
        uri: &str,
        options: TranscodeOptions,
    ) -> Result<TranscodedImage, CodecError> {
        let source_uri = uri.to_string();
        let output_path = self.next_output_path();

        tokio::task::spawn_blocking(move || {
            Self::transcode_blocking(&source_uri, &output_path, options)
        })
        .await
        .map_err(|err| CodecError::Aborted(err.to_string()))?
    }

    async fn discard(&self, uri: &str) {
        let path = local_path(uri);
        if !self.owns(&path) {
            debug!(uri, "not discarding file outside the media directory");
            return;
        }
        if let Err(err) = tokio::fs::remove_file(&path).await {
            warn!(uri, error = %err, "could not discard intermediate image");
        }
    }
}

fn local_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}
