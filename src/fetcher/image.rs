//! In-memory images: the encoded bytes plus what a UI needs to lay them out.

use bytes::Bytes;
use imagesize::ImageType;

use super::decode::{Decode, DecodeError};

/// An encoded image whose format and pixel size have been verified.
///
/// Pixel data is not decompressed; the encoded bytes are kept as received
/// so they can be handed to a platform image view.
#[derive(Debug, Clone)]
pub struct Image {
    format: ImageType,
    width: usize,
    height: usize,
    data: Bytes,
}

impl Image {
    /// Probes `data` for a known image format and its dimensions.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Image`] if the format is unknown or the header is corrupt.
    pub fn from_bytes(data: Bytes) -> Result<Self, DecodeError> {
        let format = imagesize::image_type(&data)?;
        let size = imagesize::blob_size(&data)?;
        Ok(Self {
            format,
            width: size.width,
            height: size.height,
            data,
        })
    }

    pub fn format(&self) -> &ImageType {
        &self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The encoded image bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl Decode for Image {
    fn decode(bytes: &Bytes) -> Result<Self, DecodeError> {
        Self::from_bytes(bytes.clone())
    }
}
