//! Test fixtures: minimal PNG/JPEG/PDF blobs and multipart form builders.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};

/// Minimal valid 1x1 PNG bytes.
pub fn minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Minimal JPEG-looking bytes (valid SOI marker plus padding).
pub fn minimal_jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00];
    data.resize(256, 0);
    data
}

/// Minimal PDF bytes.
pub fn minimal_pdf() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n"
        .to_vec()
}

/// A file part for the standard "file" field.
pub fn file_part(data: Vec<u8>, filename: &str, mime_type: &str) -> Part {
    Part::bytes(data).file_name(filename).mime_type(mime_type)
}

/// A multipart form carrying one PNG under the "file" field.
pub fn png_form(filename: &str) -> MultipartForm {
    MultipartForm::new().add_part("file", file_part(minimal_png(), filename, "image/png"))
}
