//! Image handling for PDF documents

use crate::{PdfError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::GrayImage;
use lopdf::{Dictionary, Object, Stream};
use std::io::Write;

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space ("DeviceGray", "DeviceRGB")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter applied to `data`
    pub filter: String,
    /// Encoded sample data
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Create an 8-bit `DeviceGray` XObject from a grayscale raster
    ///
    /// Rows are written top to bottom, matching PDF image space.
    pub fn from_luma(image: &GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PdfError::ImageError("Image has zero size".to_string()));
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(image.as_raw())?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            color_space: "DeviceGray".to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));
        dict.set("Length", self.data.len() as i64);

        Stream::new(dict, self.data.clone())
    }
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x` - Lower-left X coordinate in points
/// * `y` - Lower-left Y coordinate in points (from bottom)
/// * `width` - Drawn width in points
/// * `height` - Drawn height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
