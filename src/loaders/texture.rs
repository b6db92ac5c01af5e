use crate::error::{LoadError, LoadResult};
use crate::types::Texture;

/// Decode a PNG or JPEG into RGBA8
pub fn decode_texture(url: &str, bytes: &[u8]) -> LoadResult<Texture> {
    let image = image::load_from_memory(bytes).map_err(|source| LoadError::Texture {
        url: url.to_string(),
        source,
    })?;
    let rgba = image.to_rgba8();
    log::debug!("{}: decoded {}x{} texture", url, rgba.width(), rgba.height());

    Ok(Texture {
        width: rgba.width(),
        height: rgba.height(),
        data: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn test_decode_png() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();

        let texture = decode_texture("/screen.png", &bytes).unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
        assert_eq!(&texture.data[4..8], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_is_texture_error() {
        let result = decode_texture("/screen.png", &[0, 1, 2, 3]);
        assert!(matches!(result, Err(LoadError::Texture { .. })));
    }
}
