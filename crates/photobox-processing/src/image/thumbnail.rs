use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use photobox_core::ThumbnailSettings;
use photobox_storage::LogicalName;
use std::io::Cursor;

use super::orientation::{OrientationResolver, Transform};

/// Image processing errors
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("no thumbnail format for '{0}'")]
    UnsupportedFormat(String),

    #[error("failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("image task failed: {0}")]
    Task(String),
}

/// Decode image bytes, detecting the format from the content.
pub fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProcessingError::Decode(e.to_string()))?;
    reader
        .decode()
        .map_err(|e| ProcessingError::Decode(e.to_string()))
}

/// Encoded thumbnail plus what was done to produce it.
#[derive(Debug, Clone)]
pub struct RenderedThumbnail {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub transform: Transform,
}

/// Derives upright, box-fitted thumbnails.
///
/// Derivation is deterministic: rendering the same bytes twice yields the
/// same dimensions and orientation.
#[derive(Clone, Copy, Debug)]
pub struct ThumbnailDeriver {
    settings: ThumbnailSettings,
    resolver: OrientationResolver,
}

impl ThumbnailDeriver {
    pub fn new(settings: ThumbnailSettings) -> Self {
        Self {
            settings,
            resolver: OrientationResolver::new(),
        }
    }

    /// Orient the image, then fit it inside the bounding box.
    ///
    /// Without a configured maximum the box is the oriented image itself, so
    /// only the re-encode changes the output.
    pub fn derive(&self, image: DynamicImage, transform: Transform) -> DynamicImage {
        let oriented = transform.apply(image);
        let (width, height) = oriented.dimensions();
        let (box_w, box_h) = match self.settings.max_dimension {
            Some(edge) => (edge, edge),
            None => (width, height),
        };

        if width <= box_w && height <= box_h {
            return oriented;
        }
        oriented.thumbnail(box_w, box_h)
    }

    /// Encode in the format implied by the name's extension.
    pub fn encode(&self, image: &DynamicImage, name: &LogicalName) -> Result<Vec<u8>, ProcessingError> {
        let format = ImageFormat::from_path(name.as_str())
            .map_err(|_| ProcessingError::UnsupportedFormat(name.to_string()))?;

        let mut buf = Vec::new();
        let result = match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, self.settings.quality);
                image.to_rgb8().write_with_encoder(encoder)
            }
            ImageFormat::Png => image.write_to(&mut Cursor::new(&mut buf), format),
            _ => DynamicImage::ImageRgba8(image.to_rgba8())
                .write_to(&mut Cursor::new(&mut buf), format),
        };
        result.map_err(|e| ProcessingError::Encode(e.to_string()))?;

        Ok(buf)
    }

    /// Full CPU-bound chain: orientation, decode, derive, encode.
    pub fn render(&self, data: &[u8], name: &LogicalName) -> Result<RenderedThumbnail, ProcessingError> {
        let transform = self.resolver.resolve(data);
        let image = decode(data)?;
        let thumbnail = self.derive(image, transform);
        let (width, height) = thumbnail.dimensions();
        let bytes = self.encode(&thumbnail, name)?;

        Ok(RenderedThumbnail {
            bytes,
            width,
            height,
            transform,
        })
    }

    /// [`render`](Self::render) on the blocking thread pool.
    pub async fn render_blocking(
        &self,
        data: Vec<u8>,
        name: LogicalName,
    ) -> Result<RenderedThumbnail, ProcessingError> {
        let deriver = *self;
        tokio::task::spawn_blocking(move || deriver.render(&data, &name))
            .await
            .map_err(|e| ProcessingError::Task(e.to_string()))?
    }
}
