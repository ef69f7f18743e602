//! `data:` URL parsing and raster decoding for signatures and images.
//!
//! Grammar: `data:<mime>[;<param>]*[;base64],<payload>`. Only base64
//! payloads carry images in practice; anything else is reported as an error
//! and the caller falls back to placeholder text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use thiserror::Error;
use winnow::combinator::{preceded, repeat};
use winnow::prelude::*;
use winnow::token::{rest, take_till};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Media type, e.g. `image/png`. May be empty.
    pub mime: &'a str,
    pub base64: bool,
    pub payload: &'a str,
}

#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("not a data URL")]
    Malformed,

    #[error("payload is not base64-encoded")]
    NotBase64,

    #[error("`{0}` is not an image type")]
    NotAnImage(String),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Split a data URL into its parts. Does not decode the payload.
pub fn parse_data_url(input: &str) -> Result<DataUrl<'_>, DataUrlError> {
    data_url
        .parse(input.trim())
        .map_err(|_| DataUrlError::Malformed)
}

fn data_url<'a>(input: &mut &'a str) -> ModalResult<DataUrl<'a>> {
    let _ = "data:".parse_next(input)?;
    let mime = take_till(0.., (';', ',')).parse_next(input)?;
    let params: Vec<&str> =
        repeat(0.., preceded(';', take_till(0.., (';', ',')))).parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let payload = rest.parse_next(input)?;
    Ok(DataUrl {
        mime: mime.trim(),
        base64: params.iter().any(|p| p.trim().eq_ignore_ascii_case("base64")),
        payload,
    })
}

impl DataUrl<'_> {
    /// Decoded payload bytes.
    pub fn bytes(&self) -> Result<Vec<u8>, DataUrlError> {
        if !self.base64 {
            return Err(DataUrlError::NotBase64);
        }
        let compact: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        Ok(B64.decode(compact.as_bytes())?)
    }
}

/// An 8-bit RGB raster with an optional alpha plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    /// `None` when every pixel is opaque.
    pub alpha: Option<Vec<u8>>,
}

/// Parse, base64-decode and rasterize an image data URL.
pub fn decode_image(url: &str) -> Result<DecodedImage, DataUrlError> {
    let parsed = parse_data_url(url)?;
    if !parsed.mime.is_empty() && !parsed.mime.to_ascii_lowercase().starts_with("image/") {
        return Err(DataUrlError::NotAnImage(parsed.mime.to_string()));
    }
    let bytes = parsed.bytes()?;
    let img = image::load_from_memory(&bytes)?.to_rgba8();
    let (width, height) = img.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in img.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let alpha = alpha.iter().any(|a| *a != u8::MAX).then_some(alpha);

    Ok(DecodedImage {
        width,
        height,
        rgb,
        alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parts() {
        let url = parse_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(url.mime, "image/png");
        assert!(url.base64);
        assert_eq!(url.payload, "iVBORw0KGgo=");
    }

    #[test]
    fn parameters_before_base64() {
        let url = parse_data_url("data:image/svg+xml;charset=utf-8;base64,AAAA").unwrap();
        assert_eq!(url.mime, "image/svg+xml");
        assert!(url.base64);
    }

    #[test]
    fn plain_payload_is_not_base64() {
        let url = parse_data_url("data:,hello").unwrap();
        assert_eq!(url.mime, "");
        assert!(!url.base64);
        assert!(matches!(url.bytes(), Err(DataUrlError::NotBase64)));
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(matches!(
            parse_data_url("https://example.com/sig.png"),
            Err(DataUrlError::Malformed)
        ));
        assert!(matches!(
            parse_data_url("data:image/png;base64"),
            Err(DataUrlError::Malformed)
        ));
    }

    #[test]
    fn corrupt_payloads_fail_to_decode() {
        assert!(matches!(
            decode_image("data:image/png;base64,!!!not-base64!!!"),
            Err(DataUrlError::Base64(_))
        ));
        // Valid base64, not an image.
        assert!(matches!(
            decode_image("data:image/png;base64,aGVsbG8gd29ybGQ="),
            Err(DataUrlError::Image(_))
        ));
        assert!(matches!(
            decode_image("data:text/plain;base64,aGVsbG8="),
            Err(DataUrlError::NotAnImage(_))
        ));
    }
}
