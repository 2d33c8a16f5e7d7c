use image::DynamicImage;
use std::io::Cursor;

/// Geometric correction that brings an image into its upright orientation.
///
/// Variants follow the EXIF orientation tag, 1 through 8. Rotation names are
/// counter-clockwise: `Rotate270` turns the image a quarter turn clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Transform {
    #[default]
    Identity,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    /// Mirror across the top-left to bottom-right diagonal.
    Transpose,
    Rotate270,
    /// Mirror across the top-right to bottom-left diagonal.
    Transverse,
    Rotate90,
}

impl Transform {
    /// Map an EXIF orientation value. Out of range values yield `None`.
    pub fn from_exif_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Transform::Identity),
            2 => Some(Transform::FlipHorizontal),
            3 => Some(Transform::Rotate180),
            4 => Some(Transform::FlipVertical),
            5 => Some(Transform::Transpose),
            6 => Some(Transform::Rotate270),
            7 => Some(Transform::Transverse),
            8 => Some(Transform::Rotate90),
            _ => None,
        }
    }

    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Transform::Identity => img,
            Transform::FlipHorizontal => img.fliph(),
            Transform::Rotate180 => img.rotate180(),
            Transform::FlipVertical => img.flipv(),
            Transform::Transpose => img.rotate90().fliph(),
            // `image` rotates clockwise
            Transform::Rotate270 => img.rotate90(),
            Transform::Transverse => img.rotate270().fliph(),
            Transform::Rotate90 => img.rotate270(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum MetadataUnavailable {
    #[error("no readable EXIF data: {0}")]
    Exif(#[from] exif::Error),

    #[error("no orientation tag")]
    MissingTag,

    #[error("orientation value {0} out of range")]
    OutOfRange(u32),
}

/// Reads the EXIF orientation of encoded image bytes.
///
/// Resolution never fails: missing or unreadable metadata means the image is
/// already upright.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrientationResolver;

impl OrientationResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, data: &[u8]) -> Transform {
        match Self::try_resolve(data) {
            Ok(transform) => {
                if transform != Transform::Identity {
                    tracing::debug!(transform = ?transform, "Applying EXIF orientation");
                }
                transform
            }
            Err(e) => {
                tracing::debug!(error = %e, "EXIF orientation unavailable, assuming upright");
                Transform::Identity
            }
        }
    }

    fn try_resolve(data: &[u8]) -> Result<Transform, MetadataUnavailable> {
        let mut cursor = Cursor::new(data);
        let exif = exif::Reader::new().read_from_container(&mut cursor)?;
        let tag = exif
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .ok_or(MetadataUnavailable::MissingTag)?;

        Transform::from_exif_tag(tag).ok_or(MetadataUnavailable::OutOfRange(tag))
    }
}
