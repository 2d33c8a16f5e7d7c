//! Photobox Processing Library
//!
//! Image handling (orientation, thumbnails), batch admission, the upload
//! pipeline and the gallery listing.

pub mod gallery;
pub mod image;
pub mod upload;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use gallery::GalleryLister;
pub use crate::image::{
    OrientationResolver, ProcessingError, RenderedThumbnail, ThumbnailDeriver, Transform,
};
pub use upload::{IncomingFile, IngestError, IngestReport, UploadPipeline};
pub use validator::{Admission, IngestValidator, Rejection, RejectionReason};
