//! Test fixtures: small PNG and JPEG images.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{Rgb, RgbImage};

fn encode(format: image::ImageFormat, shade: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(12, 9, |x, y| Rgb([shade, (x * 20) as u8, (y * 25) as u8]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode fixture");
    buf
}

pub fn create_test_png(shade: u8) -> Vec<u8> {
    encode(image::ImageFormat::Png, shade)
}

pub fn create_test_jpeg() -> Vec<u8> {
    encode(image::ImageFormat::Jpeg, 40)
}

pub fn create_test_gif_header() -> Vec<u8> {
    b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;".to_vec()
}

pub fn base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
}
