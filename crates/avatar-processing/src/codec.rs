//! Image codec: classify by magic bytes, normalize to PNG.

use std::io::Cursor;

use avatar_core::AppError;
use bytes::Bytes;

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Encodings the codec distinguishes. Detection never trusts declared content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Unsupported,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Unsupported => "unsupported",
        }
    }
}

/// Payload bytes tagged with the format sniffed from them
#[derive(Debug, Clone)]
pub struct RawAsset {
    pub bytes: Bytes,
    pub detected_format: ImageFormat,
}

/// PNG-encoded image ready for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalAsset {
    bytes: Bytes,
}

impl CanonicalAsset {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("{format} stream could not be converted: {message}")]
    Codec {
        format: &'static str,
        message: String,
    },
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::UnsupportedFormat => AppError::UnsupportedFormat(err.to_string()),
            CodecError::Codec { .. } => AppError::CodecError(err.to_string()),
        }
    }
}

/// Stateless PNG normalizer. CPU bound: async callers run it on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    pub fn new() -> Self {
        ImageCodec
    }

    pub fn sniff(bytes: &[u8]) -> ImageFormat {
        if bytes.starts_with(PNG_SIGNATURE) {
            ImageFormat::Png
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            ImageFormat::Jpeg
        } else {
            ImageFormat::Unsupported
        }
    }

    pub fn detect(bytes: Bytes) -> RawAsset {
        let detected_format = Self::sniff(&bytes);
        RawAsset {
            bytes,
            detected_format,
        }
    }

    /// PNG passes through untouched; JPEG is decoded and re-encoded as PNG.
    pub fn normalize(&self, bytes: Bytes) -> Result<CanonicalAsset, CodecError> {
        let raw = Self::detect(bytes);
        match raw.detected_format {
            ImageFormat::Png => Ok(CanonicalAsset { bytes: raw.bytes }),
            ImageFormat::Jpeg => Self::jpeg_to_png(&raw.bytes),
            ImageFormat::Unsupported => Err(CodecError::UnsupportedFormat),
        }
    }

    fn jpeg_to_png(data: &[u8]) -> Result<CanonicalAsset, CodecError> {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg).map_err(
            |e| CodecError::Codec {
                format: ImageFormat::Jpeg.as_str(),
                message: e.to_string(),
            },
        )?;

        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| CodecError::Codec {
                format: ImageFormat::Png.as_str(),
                message: e.to_string(),
            })?;

        Ok(CanonicalAsset {
            bytes: Bytes::from(buf),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encoded(format: image::ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(16, 12, |x, y| Rgb([(x * 15) as u8, (y * 20) as u8, 128]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn sniff_by_magic_bytes() {
        assert_eq!(ImageCodec::sniff(&encoded(image::ImageFormat::Png)), ImageFormat::Png);
        assert_eq!(ImageCodec::sniff(&encoded(image::ImageFormat::Jpeg)), ImageFormat::Jpeg);
        assert_eq!(ImageCodec::sniff(b"GIF89a\x01\x00"), ImageFormat::Unsupported);
        assert_eq!(ImageCodec::sniff(b"\xFF\xD8"), ImageFormat::Unsupported);
        assert_eq!(ImageCodec::sniff(b""), ImageFormat::Unsupported);
    }

    #[test]
    fn png_passes_through_unchanged() {
        let png = encoded(image::ImageFormat::Png);
        let out = ImageCodec::new().normalize(Bytes::from(png.clone())).unwrap();
        assert_eq!(out.as_bytes(), &png[..]);
    }

    #[test]
    fn jpeg_becomes_png_and_is_then_stable() {
        let codec = ImageCodec::new();
        let out = codec
            .normalize(Bytes::from(encoded(image::ImageFormat::Jpeg)))
            .unwrap();
        assert_eq!(ImageCodec::sniff(out.as_bytes()), ImageFormat::Png);

        let decoded = image::load_from_memory(out.as_bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));

        let again = codec.normalize(out.clone().into_bytes()).unwrap();
        assert_eq!(again, out);
    }

    #[test]
    fn unknown_formats_are_unsupported_not_codec_errors() {
        let codec = ImageCodec::new();
        for input in [
            &b"GIF89a\x01\x00\x01\x00\x00\x00\x00;"[..],
            &b"RIFF\x00\x00\x00\x00WEBPVP8 "[..],
            &b"hello world"[..],
            &b"\x00"[..],
        ] {
            assert!(matches!(
                codec.normalize(Bytes::copy_from_slice(input)),
                Err(CodecError::UnsupportedFormat)
            ));
        }
    }

    #[test]
    fn corrupt_jpeg_is_codec_error() {
        let codec = ImageCodec::new();

        let jpeg = encoded(image::ImageFormat::Jpeg);
        let truncated = Bytes::copy_from_slice(&jpeg[..24]);
        assert!(matches!(
            codec.normalize(truncated),
            Err(CodecError::Codec { .. })
        ));

        let garbage = Bytes::from_static(b"\xFF\xD8\xFF\x00\x00\x00garbage-not-a-jpeg");
        let err = codec.normalize(garbage).unwrap_err();
        assert!(matches!(err, CodecError::Codec { .. }));
        assert!(matches!(AppError::from(err), AppError::CodecError(_)));
    }
}
