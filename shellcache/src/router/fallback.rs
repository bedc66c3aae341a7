//! Placeholder image served for tiles that cannot be fetched.

use bytes::Bytes;

use crate::network::Response;

/// Content type of the fallback tile.
pub const FALLBACK_CONTENT_TYPE: &str = "image/png";

/// A 1×1 fully transparent RGBA PNG.
pub static FALLBACK_TILE_PNG: [u8; 68] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, // signature
    0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52, // IHDR
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15,
    0xc4, 0x89, //
    0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, // IDAT
    0x78, 0xda, 0x63, 0x60, 0x00, 0x02, 0x00, 0x00, 0x05, 0x00, 0x01, 0xe9, 0xfa, 0xdc, 0xd8, //
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82, // IEND
];

/// The fallback tile as a `200 OK` image response.
pub fn fallback_tile() -> Response {
    Response::ok(FALLBACK_CONTENT_TYPE, Bytes::from_static(&FALLBACK_TILE_PNG))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_png() {
        assert_eq!(&FALLBACK_TILE_PNG[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&FALLBACK_TILE_PNG[60..64], b"IEND");
    }

    #[test]
    fn test_fallback_decodes_to_transparent_pixel() {
        let img = image::load_from_memory_with_format(&FALLBACK_TILE_PNG, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8();

        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_fallback_response() {
        let response = fallback_tile();
        assert!(response.is_ok());
        assert_eq!(response.content_type.as_deref(), Some("image/png"));
        assert_eq!(response.body.as_ref(), &FALLBACK_TILE_PNG[..]);
    }
}
