use std::io::Cursor;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use crate::image_pipeline::color::check_sensor_pattern;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::conversions::read_pipeline::{read_image, ReadPipeline};
use crate::image_pipeline::conversions::types::{ReadOptions, WriteOptions};
use crate::image_pipeline::conversions::writer::{
    encode_png, write_image, write_sequential_image, ImageWriter, PngWriter,
};
use crate::image_pipeline::debayer::KernelDemosaic;
use crate::image_pipeline::format::SourceFormat;
use crate::image_pipeline::raw::{BayerPattern, CfaColor, RawFrame, RawMetadata, RawSensorReader};
use crate::image_pipeline::tensor::Image;

const BLACK: u16 = 512;

struct MockReader {
    should_fail: bool,
    mock_frame: Option<RawFrame>,
}

impl RawSensorReader for MockReader {
    fn read_raw(&self, _data: &[u8]) -> Result<RawFrame> {
        if self.should_fail {
            return Err(ConversionError::DecodeError("Mock decode error".to_string()));
        }
        Ok(self.mock_frame.clone().unwrap_or_else(|| rggb_frame(8, 8, BayerPattern::RGGB)))
    }
}

/// An RGGB frame with 100/200/300 counts above black on R/G/B sites.
fn rggb_frame(height: usize, width: usize, pattern: BayerPattern) -> RawFrame {
    let plane = Array2::from_shape_fn((height, width), |(r, c)| {
        BLACK + match (r % 2, c % 2) {
            (0, 0) => 100,
            (1, 1) => 300,
            _ => 200,
        }
    });
    RawFrame {
        plane,
        metadata: RawMetadata {
            pattern,
            color_desc: "RGBG".to_string(),
            black_levels: [BLACK as f32; 4],
            daylight_wb: [2.0, 1.0, 0.5],
            bits_per_sample: 10,
        },
    }
}

fn pipeline(reader: MockReader, options: ReadOptions) -> ReadPipeline<MockReader, KernelDemosaic> {
    ReadPipeline::with_custom(reader, KernelDemosaic::default(), options)
}

fn ok_reader() -> MockReader {
    MockReader { should_fail: false, mock_frame: None }
}

#[test]
fn test_config_builder() {
    let options = ReadOptions::builder()
        .to_float(false)
        .crop(Some((64, 32)))
        .crop_align(4)
        .demosaic(false)
        .build();

    assert!(!options.to_float);
    assert!(options.srgb_to_linear);
    assert_eq!(options.crop, Some((64, 32)));
    assert_eq!(options.crop_align, 4);
    assert!(options.color_balance);
    assert!(!options.demosaic);

    let write = WriteOptions::builder().normalize(true).build();
    assert!(write.normalize && write.saturate);
}

#[test]
fn test_raw_without_float_keeps_code_values() {
    let options = ReadOptions::builder().to_float(false).build();
    let image = pipeline(ok_reader(), options).decode_raw(b"fake cr2 data").unwrap();

    assert_eq!(image.data().dim(), (1, 8, 8, 1));
    assert_eq!(image.data()[[0, 0, 0, 0]], 612.0);
    assert_eq!(image.data()[[0, 1, 1, 0]], 812.0);
}

#[test]
fn test_raw_color_balance_only() {
    let options = ReadOptions::builder().demosaic(false).build();
    let image = pipeline(ok_reader(), options).decode_raw(b"fake cr2 data").unwrap();

    let max = 1023.0;
    assert_eq!(image.channels(), 1);
    assert_abs_diff_eq!(image.data()[[0, 0, 0, 0]], 100.0 * 2.0 / max, epsilon = 1e-6);
    assert_abs_diff_eq!(image.data()[[0, 0, 1, 0]], 200.0 / max, epsilon = 1e-6);
    assert_abs_diff_eq!(image.data()[[0, 1, 1, 0]], 300.0 * 0.5 / max, epsilon = 1e-6);
}

#[test]
fn test_raw_full_pipeline_produces_rgb() {
    let image = pipeline(ok_reader(), ReadOptions::default()).decode_raw(b"fake cr2 data").unwrap();

    assert_eq!(image.data().dim(), (1, 8, 8, 3));
    let expected = [200.0 / 1023.0, 200.0 / 1023.0, 150.0 / 1023.0];
    for row in 0..8 {
        for col in 0..8 {
            for (ch, want) in expected.iter().enumerate() {
                assert_abs_diff_eq!(image.data()[[0, row, col, ch]], *want, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn test_raw_crop_is_tile_aligned() {
    let reader = MockReader { should_fail: false, mock_frame: Some(rggb_frame(10, 12, BayerPattern::RGGB)) };
    let options = ReadOptions::builder().to_float(false).crop(Some((6, 4))).build();
    let image = pipeline(reader, options).decode_raw(b"fake").unwrap();

    assert_eq!((image.width(), image.height()), (6, 4));
    // Origin (2, 2) is a red site, so the crop still starts on R
    assert_eq!(image.data()[[0, 0, 0, 0]], 612.0);
}

#[test]
fn test_odd_crop_origin_rephases_pattern() {
    let reader = MockReader { should_fail: false, mock_frame: Some(rggb_frame(8, 8, BayerPattern::RGGB)) };
    let options = ReadOptions::builder().crop(Some((6, 6))).crop_align(1).demosaic(false).build();
    let image = pipeline(reader, options).decode_raw(b"fake").unwrap();
    // Origin (1, 1) lands on a blue site; its balance must be blue's
    assert_abs_diff_eq!(image.data()[[0, 0, 0, 0]], 300.0 * 0.5 / 1023.0, epsilon = 1e-6);
    assert_abs_diff_eq!(image.data()[[0, 1, 1, 0]], 100.0 * 2.0 / 1023.0, epsilon = 1e-6);
}

#[test]
fn test_unexpected_pattern_still_processes() {
    let pattern = BayerPattern::new([
        [CfaColor::Green, CfaColor::Red],
        [CfaColor::Blue, CfaColor::Green],
    ]);
    let frame = rggb_frame(4, 4, pattern);
    assert!(!check_sensor_pattern(&frame.metadata));
    assert!(check_sensor_pattern(&rggb_frame(4, 4, BayerPattern::RGGB).metadata));

    let reader = MockReader { should_fail: false, mock_frame: Some(frame) };
    let image = pipeline(reader, ReadOptions::default()).decode_raw(b"fake").unwrap();
    assert_eq!(image.channels(), 3);
}

#[test]
fn test_reader_failure() {
    let reader = MockReader { should_fail: true, mock_frame: None };
    let result = pipeline(reader, ReadOptions::default()).decode_raw(b"fake cr2 data");
    assert!(matches!(result, Err(ConversionError::DecodeError(_))));
}

#[test]
fn test_oversized_crop_fails() {
    let options = ReadOptions::builder().crop(Some((16, 16))).build();
    let result = pipeline(ok_reader(), options).decode_raw(b"fake");
    assert!(matches!(result, Err(ConversionError::InvalidDimensions(16, 16))));
}

#[test]
fn test_raw_extension_routes_to_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("light_0001.CR2");
    std::fs::write(&path, b"fake cr2 data").unwrap();

    let options = ReadOptions::builder().to_float(false).build();
    let image = pipeline(ok_reader(), options).read_file(&path).unwrap();
    assert_eq!(image.data().dim(), (1, 8, 8, 1));
}

#[test]
fn test_unsupported_extension() {
    let result = read_image("notes.txt", &ReadOptions::default());
    assert!(matches!(result, Err(ConversionError::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_image(dir.path().join("missing.cr2"), &ReadOptions::default());
    assert!(matches!(result, Err(ConversionError::InputReadError(_))));
}

#[test]
fn test_png_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grey.png");
    let image = Image::from_mosaic(Array2::from_shape_fn((4, 6), |(r, c)| (r * 6 + c) as f32 / 23.0));

    write_image(&image, &path, &WriteOptions::default()).unwrap();
    let read_back = read_image(&path, &ReadOptions::default()).unwrap();

    assert_eq!(read_back.data().dim(), (1, 4, 6, 3));
    for row in 0..4 {
        for col in 0..6 {
            let original = image.data()[[0, row, col, 0]];
            for ch in 0..3 {
                assert_abs_diff_eq!(read_back.data()[[0, row, col, ch]], original, epsilon = 0.01);
            }
        }
    }
}

#[test]
fn test_png_crop_and_integer_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("white.png");
    write_image(&Image::from_single(ndarray::Array3::ones((6, 6, 3))), &path, &WriteOptions::default()).unwrap();

    let options = ReadOptions::builder().to_float(false).crop(Some((2, 4))).build();
    let image = read_image(&path, &options).unwrap();
    assert_eq!((image.width(), image.height(), image.channels()), (2, 4, 3));
    assert!(image.data().iter().all(|&v| v == 255.0));
}

#[test]
fn test_tiff_16bit_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stack.tif");
    let samples: Vec<u16> = (0..16).map(|i| i * 4096).collect();
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = tiff::encoder::TiffEncoder::new(file).unwrap();
        encoder.write_image::<tiff::encoder::colortype::Gray16>(4, 4, &samples).unwrap();
    }

    let options = ReadOptions::builder().srgb_to_linear(false).build();
    let image = read_image(&path, &options).unwrap();
    assert_eq!(image.data().dim(), (1, 4, 4, 1));
    assert_abs_diff_eq!(image.data()[[0, 0, 1, 0]], 4096.0 / 65535.0, epsilon = 1e-6);
    assert_abs_diff_eq!(image.data()[[0, 3, 3, 0]], 61440.0 / 65535.0, epsilon = 1e-6);
}

#[test]
fn test_sequential_names_and_content() {
    let dir = tempfile::tempdir().unwrap();
    let basename = dir.path().join("out");
    let image = Image::from_mosaic(Array2::from_elem((2, 2), 0.5));

    let [latest, numbered] = write_sequential_image(&image, &basename, 5, &WriteOptions::default()).unwrap();

    assert_eq!(latest.file_name().unwrap(), "out_latest.png");
    assert_eq!(numbered.file_name().unwrap(), "out_00000005.png");
    assert_eq!(std::fs::read(&latest).unwrap(), std::fs::read(&numbered).unwrap());
}

#[test]
fn test_normalize_and_saturate() {
    let image = Image::from_mosaic(ndarray::array![[2.0, 4.0]]);

    let normalized = encode_png(&image, &WriteOptions::builder().normalize(true).build()).unwrap();
    let decoded = image::load_from_memory(&normalized).unwrap().to_rgb8();
    assert_eq!(decoded.get_pixel(1, 0).0, [255, 255, 255]);
    // linear 0.5 encodes to sRGB ~187.5
    assert!((187..=188).contains(&decoded.get_pixel(0, 0).0[0]));

    let saturated = encode_png(&image, &WriteOptions::default()).unwrap();
    let decoded = image::load_from_memory(&saturated).unwrap().to_rgb8();
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255]);
}

#[test]
fn test_writer_trait_streams_png() {
    let mut output = Cursor::new(Vec::new());
    let image = Image::from_mosaic(Array2::zeros((2, 2)));
    PngWriter.write_image(&image, &mut output, &WriteOptions::default()).unwrap();
    assert_eq!(&output.get_ref()[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_decode_dispatches_on_format() {
    let png = encode_png(&Image::from_mosaic(Array2::zeros((2, 2))), &WriteOptions::default()).unwrap();
    let pipeline = pipeline(MockReader { should_fail: true, mock_frame: None }, ReadOptions::default());

    let image = pipeline.decode(&png, SourceFormat::StandardImage(image::ImageFormat::Png)).unwrap();
    assert_eq!(image.channels(), 3);
    assert!(matches!(pipeline.decode(&png, SourceFormat::Raw), Err(ConversionError::DecodeError(_))));
}

#[test]
fn test_failed_encode_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two_channel.png");
    let image = Image::from_single(ndarray::Array3::ones((4, 4, 2)));

    let result = write_image(&image, &path, &WriteOptions::default());
    assert!(matches!(result, Err(ConversionError::InvalidShape(_))));
    assert!(!path.exists());
}
