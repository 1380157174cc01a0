use rxing::Exceptions;
use thiserror::Error;

use crate::models::DecodedBarcode;

/// Errors that can occur when decoding an uploaded image
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported or corrupt image: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("Barcode decoder failed: {0}")]
    DecoderError(String),
}

/// Reads a barcode out of raw image bytes
///
/// `Ok(None)` means the image was readable but no barcode was found.
pub trait BarcodeDecoder: Send + Sync {
    fn decode(&self, image: &[u8]) -> Result<Option<DecodedBarcode>, DecodeError>;
}

/// Decoder backed by `rxing`, accepting any format the `image` crate reads
#[derive(Debug, Clone, Copy, Default)]
pub struct RxingDecoder;

impl BarcodeDecoder for RxingDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Option<DecodedBarcode>, DecodeError> {
        let luma = image::load_from_memory(bytes)?.to_luma8();
        let (width, height) = luma.dimensions();

        tracing::debug!(width, height, "Decoding barcode image");

        let results = match rxing::helpers::detect_multiple_in_luma(luma.into_raw(), width, height) {
            Ok(results) => results,
            Err(Exceptions::NotFoundException(_))
            | Err(Exceptions::ChecksumException(_))
            | Err(Exceptions::FormatException(_)) => return Ok(None),
            Err(e) => return Err(DecodeError::DecoderError(e.to_string())),
        };

        // When several barcodes are visible the first readable one wins
        let decoded = results
            .iter()
            .find(|r| !r.getText().trim().is_empty())
            .map(|r| DecodedBarcode {
                value: r.getText().trim().to_string(),
                format: r.getBarcodeFormat().to_string(),
            });

        if let Some(barcode) = &decoded {
            tracing::info!(barcode = %barcode.value, format = %barcode.format, "Barcode detected");
        }

        Ok(decoded)
    }
}
