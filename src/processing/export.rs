//! PNG encoding of feature vector previews.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use fast_image_resize::Resizer;
use image::{GrayImage, ImageFormat};
use ink_scale::boxfilter::FeatureVector;
use ink_scale::preview::magnify;

use crate::error::{NormalizeError, NormalizeResult};

/// Magnify `features` by `scale` and encode the tile grid as a grayscale PNG.
pub fn encode_png(resizer: &mut Resizer, features: &FeatureVector, scale: u32) -> NormalizeResult<Vec<u8>> {
    let tiles = magnify(resizer, features, scale)?;
    let (w, h) = (tiles.width(), tiles.height());
    let image = GrayImage::from_raw(w, h, tiles.into_vec())
        .ok_or_else(|| NormalizeError::raster(format!("preview buffer does not match {}x{}", w, h)))?;

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// `data:image/png;base64,...` URI of the magnified preview, for HTML consumers.
pub fn png_data_uri(resizer: &mut Resizer, features: &FeatureVector, scale: u32) -> NormalizeResult<String> {
    let png = encode_png(resizer, features, scale)?;
    Ok(format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink_scale::boxfilter::box_downsample;
    use ink_scale::raster::RasterBuffer;

    fn checker() -> FeatureVector {
        let raster = RasterBuffer::from_vec(2, 2, vec![255, 0, 0, 255]).unwrap();
        box_downsample(&raster, 2, 2).unwrap()
    }

    #[test]
    fn png_decodes_to_magnified_tiles() {
        let png = encode_png(&mut Resizer::new(), &checker(), 4).unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(1, 1).0[0], 255);
        assert_eq!(decoded.get_pixel(6, 1).0[0], 0);
        assert_eq!(decoded.get_pixel(6, 6).0[0], 255);
    }

    #[test]
    fn data_uri_has_png_prefix() {
        let uri = png_data_uri(&mut Resizer::new(), &checker(), 2).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = general_purpose::STANDARD.decode(payload).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn zero_scale_is_rejected() {
        let err = encode_png(&mut Resizer::new(), &checker(), 0).unwrap_err();
        assert_eq!(err.category(), "invalid_target_resolution");
    }
}
