//! Similarity scorer tests

use std::io::Cursor;

use image::{DynamicImage, GrayImage, Luma};

use stillcam::similarity::{similarity_score, CompareArea};

fn encode_png(image: GrayImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn gray_png(edge: u32, shade: u8) -> Vec<u8> {
    encode_png(GrayImage::from_pixel(edge, edge, Luma([shade])))
}

#[test]
fn identical_images_score_one() {
    let image = gray_png(32, 128);
    assert_eq!(similarity_score(&image, &image, None), Some(1.0));
}

#[test]
fn opposite_images_score_zero() {
    let black = gray_png(32, 0);
    let white = gray_png(32, 255);
    assert_eq!(similarity_score(&black, &white, None), Some(0.0));
}

#[test]
fn undecodable_input_scores_none() {
    let image = gray_png(32, 128);
    assert_eq!(similarity_score(b"not an image", &image, None), None);
    assert_eq!(similarity_score(&image, b"not an image", None), None);
}

#[test]
fn compare_area_ignores_changes_outside_it() {
    // Two frames identical in the top band, very different below it.
    let quiet = GrayImage::from_pixel(100, 100, Luma([10]));
    let mut busy = GrayImage::from_pixel(100, 100, Luma([10]));
    for y in 50..100 {
        for x in 0..100 {
            busy.put_pixel(x, y, Luma([250]));
        }
    }

    let a = encode_png(quiet);
    let b = encode_png(busy);

    let sky = CompareArea {
        x: 0,
        y: 0,
        width: 100,
        height: 40,
    };
    assert_eq!(similarity_score(&a, &b, Some(sky)), Some(1.0));
    assert!(similarity_score(&a, &b, None).unwrap() < 1.0);
}
