mod common;

use chromafix_core::error::ChromaError;
use chromafix_core::frame::{Raster, SourceRaster};
use chromafix_core::io::image_io::{load_raster, save_png, save_raster, save_tiff};

#[test]
fn test_tiff_roundtrip_keeps_16_bit_precision_and_alpha() {
    let raster = common::textured_raster(12, 9, true);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.tiff");

    save_tiff(&raster, &path).unwrap();
    let loaded = load_raster(&path).unwrap();

    assert_eq!((loaded.width(), loaded.height()), (12, 9));
    assert_eq!(loaded.bit_depth(), 16);
    assert!(loaded.has_alpha());
    for (a, b) in raster.blue.data.iter().zip(loaded.blue.data.iter()) {
        assert!((a - b).abs() < 1e-4, "{a} vs {b}");
    }
    let (alpha, loaded_alpha) = (raster.alpha.unwrap(), loaded.alpha.unwrap());
    for (a, b) in alpha.data.iter().zip(loaded_alpha.data.iter()) {
        assert!((a - b).abs() < 1e-4);
    }
}

#[test]
fn test_png_roundtrip_is_8_bit() {
    let raster = Raster::filled(8, 8, [0.5, 0.25, 1.0], None);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.png");

    save_png(&raster, &path).unwrap();
    let loaded = load_raster(&path).unwrap();

    assert_eq!(loaded.bit_depth(), 8);
    assert!(!loaded.has_alpha());
    assert!((loaded.red.data[[3, 3]] - 128.0 / 255.0).abs() < 1e-4);
    assert!((loaded.green.data[[0, 7]] - 64.0 / 255.0).abs() < 1e-4);
    assert!((loaded.blue.data[[7, 0]] - 1.0).abs() < 1e-6);
}

#[test]
fn test_save_raster_picks_format_from_extension() {
    let raster = Raster::filled(4, 3, [0.1, 0.2, 0.3], Some(0.5));
    let dir = tempfile::tempdir().unwrap();

    let png = dir.path().join("out.png");
    save_raster(&raster, &png).unwrap();
    assert_eq!(load_raster(&png).unwrap().bit_depth(), 8);

    let tif = dir.path().join("out.tif");
    save_raster(&raster, &tif).unwrap();
    assert_eq!(load_raster(&tif).unwrap().bit_depth(), 16);

    let bmp = dir.path().join("out.bmp");
    assert!(matches!(
        save_raster(&raster, &bmp),
        Err(ChromaError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_raster(&dir.path().join("missing.png")).is_err());
}
