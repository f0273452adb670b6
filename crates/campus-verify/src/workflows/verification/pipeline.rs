use std::sync::Arc;

use tracing::info;

use super::codec::{CodecError, ImageCodec, OutputFormat, TranscodeOptions, TranscodedImage};
use super::domain::{DocumentGroupName, DocumentSide, NormalizedImage};

/// Best-effort size ceiling for a normalized image.
pub const BYTE_BUDGET: u64 = 5 * 1024 * 1024;

/// Pass 1 always runs and strips metadata while transcoding.
pub const PRIMARY_PASS: TranscodeOptions = TranscodeOptions {
    longest_edge: 1200,
    quality: 0.7,
    format: OutputFormat::Jpeg,
};

/// Pass 2 runs once, on pass 1 output, when pass 1 exceeds [`BYTE_BUDGET`].
pub const FALLBACK_PASS: TranscodeOptions = TranscodeOptions {
    longest_edge: 800,
    quality: 0.5,
    format: OutputFormat::Jpeg,
};

/// Which slot an image is destined for. Drives the output file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeRequest {
    pub document: DocumentGroupName,
    pub side: DocumentSide,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("could not process {document} {side} image")]
    Transcode {
        document: DocumentGroupName,
        side: DocumentSide,
        #[source]
        source: CodecError,
    },
}

/// Source of the millisecond timestamp embedded in file names.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Fixed two-pass transcoder turning any picked photo into a bounded JPEG.
pub struct ImageNormalizationPipeline<C> {
    codec: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C> ImageNormalizationPipeline<C>
where
    C: ImageCodec + 'static,
{
    pub fn new(codec: Arc<C>) -> Self {
        Self::with_clock(codec, Arc::new(SystemClock))
    }

    pub fn with_clock(codec: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { codec, clock }
    }

    pub async fn normalize(
        &self,
        source_uri: &str,
        request: NormalizeRequest,
    ) -> Result<NormalizedImage, ProcessingError> {
        let NormalizeRequest { document, side } = request;
        let wrap = |source| ProcessingError::Transcode {
            document,
            side,
            source,
        };

        let primary = self
            .codec
            .transcode(source_uri, PRIMARY_PASS)
            .await
            .map_err(wrap)?;

        let encoded = if primary.byte_size > BYTE_BUDGET {
            info!(
                document = %document,
                side = %side,
                byte_size = primary.byte_size,
                budget = BYTE_BUDGET,
                "primary pass over budget, running fallback pass"
            );
            let fallback = self.codec.transcode(&primary.uri, FALLBACK_PASS).await;
            self.codec.discard(&primary.uri).await;
            let fallback = fallback.map_err(wrap)?;
            if fallback.byte_size > BYTE_BUDGET {
                info!(
                    document = %document,
                    side = %side,
                    byte_size = fallback.byte_size,
                    "fallback pass still over budget, accepting result"
                );
            }
            fallback
        } else {
            primary
        };

        Ok(self.finish(encoded, request))
    }

    fn finish(&self, encoded: TranscodedImage, request: NormalizeRequest) -> NormalizedImage {
        let file_name = format!(
            "{}_{}_{}.jpg",
            request.document.file_stem(),
            request.side,
            self.clock.now_millis()
        );

        NormalizedImage {
            uri: encoded.uri,
            mime_type: mime::IMAGE_JPEG.essence_str().to_string(),
            file_name,
            byte_size: encoded.byte_size,
            width: encoded.width,
            height: encoded.height,
        }
    }
}
