use std::path::Path;

use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use ndarray::Array2;
use tracing::debug;

use crate::error::{ChromaError, Result};
use crate::frame::{Frame, Raster};

/// Load an 8- or 16-bit RGB(A) image. Grayscale inputs are expanded to
/// three equal channels; alpha is kept when the file has it.
pub fn load_raster(path: &Path) -> Result<Raster> {
    let img = image::open(path)?;
    let bit_depth = bit_depth_of(img.color());
    let has_alpha = img.color().has_alpha();
    let (w, h) = (img.width() as usize, img.height() as usize);
    debug!(path = %path.display(), w, h, bit_depth, has_alpha, "Loaded image");

    let rgba = img.to_rgba16();
    let mut planes = [
        Array2::<f32>::zeros((h, w)),
        Array2::<f32>::zeros((h, w)),
        Array2::<f32>::zeros((h, w)),
        Array2::<f32>::zeros((h, w)),
    ];
    for (x, y, pixel) in rgba.enumerate_pixels() {
        for (plane, value) in planes.iter_mut().zip(pixel.0) {
            plane[[y as usize, x as usize]] = value as f32 / 65535.0;
        }
    }

    let [red, green, blue, alpha] = planes;
    Raster::new(
        Frame::new(red, bit_depth),
        Frame::new(green, bit_depth),
        Frame::new(blue, bit_depth),
        has_alpha.then(|| Frame::new(alpha, bit_depth)),
    )
}

/// Save a raster, choosing the format from the file extension: PNG is
/// written with 8 bits per channel, TIFF (the default) with 16.
pub fn save_raster(raster: &Raster, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => save_png(raster, path),
        Some("tiff" | "tif") | None => save_tiff(raster, path),
        Some(other) => Err(ChromaError::UnsupportedFormat(format!(
            "cannot write .{other} files (use .png or .tiff)"
        ))),
    }
}

/// 8-bit RGB(A) PNG.
pub fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    let (w, h) = (raster.width() as u32, raster.height() as u32);
    let pixels = interleave(raster, |v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
    let img: DynamicImage = if raster.alpha.is_some() {
        ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, pixels)
            .ok_or_else(|| size_error(raster))?
            .into()
    } else {
        ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, pixels)
            .ok_or_else(|| size_error(raster))?
            .into()
    };
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// 16-bit RGB(A) TIFF.
pub fn save_tiff(raster: &Raster, path: &Path) -> Result<()> {
    let (w, h) = (raster.width() as u32, raster.height() as u32);
    let pixels = interleave(raster, |v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16);
    let img: DynamicImage = if raster.alpha.is_some() {
        ImageBuffer::<Rgba<u16>, _>::from_raw(w, h, pixels)
            .ok_or_else(|| size_error(raster))?
            .into()
    } else {
        ImageBuffer::<Rgb<u16>, _>::from_raw(w, h, pixels)
            .ok_or_else(|| size_error(raster))?
            .into()
    };
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Row-major RGB(A) samples.
fn interleave<T>(raster: &Raster, quantize: impl Fn(f32) -> T) -> Vec<T> {
    let (w, h) = (raster.width(), raster.height());
    let channels = if raster.alpha.is_some() { 4 } else { 3 };
    let mut pixels = Vec::with_capacity(w * h * channels);
    for row in 0..h {
        for col in 0..w {
            pixels.push(quantize(raster.red.data[[row, col]]));
            pixels.push(quantize(raster.green.data[[row, col]]));
            pixels.push(quantize(raster.blue.data[[row, col]]));
            if let Some(alpha) = &raster.alpha {
                pixels.push(quantize(alpha.data[[row, col]]));
            }
        }
    }
    pixels
}

fn size_error(raster: &Raster) -> ChromaError {
    ChromaError::InvalidDimensions {
        width: raster.width(),
        height: raster.height(),
    }
}

fn bit_depth_of(color: ColorType) -> u8 {
    match color {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => 8,
        _ => 16,
    }
}
