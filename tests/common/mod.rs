#![allow(dead_code)]

use async_trait::async_trait;
use mosaic::auth::create_jwt;
use mosaic::storage::{MediaStore, MediaStoreError, UploadedMedia};
use uuid::Uuid;

/// Ensure JWT secret present and isolate the snapshot dir per test.
pub fn setup_env() {
    std::env::set_var("JWT_SECRET", "test-secret-must-be-32-bytes-long!!");
    let tmp = tempfile::tempdir().unwrap();
    std::env::set_var("MOSAIC_DATA_DIR", tmp.path().to_str().unwrap());
}

pub fn token_for(id: Uuid, email: &str) -> String {
    create_jwt(id, email).unwrap()
}

/// Stand-in for the media host: hands back a durable-looking URL and a
/// uniquified name, or fails wholesale when told to.
pub struct MockMediaStore {
    pub fail: bool,
}

impl MockMediaStore {
    pub fn ok() -> Self {
        Self { fail: false }
    }
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(
        &self,
        file_name: &str,
        _content_type: &str,
        _bytes: &[u8],
    ) -> Result<UploadedMedia, MediaStoreError> {
        if self.fail {
            return Err(MediaStoreError("simulated outage".into()));
        }
        let canonical = format!("{}-{}", Uuid::new_v4(), file_name);
        Ok(UploadedMedia {
            url: format!("https://cdn.test/media/{canonical}"),
            file_name: canonical,
        })
    }
}

/// Minimal PNG used by upload tests.
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A,
        0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00,
        0x1F, 0x15, 0xC4, 0x89,
        0x00, 0x00, 0x00, 0x0A, b'I', b'D', b'A', b'T', 0x78, 0x9C, 0x63, 0x00, 0x01,
        0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4,
        0x00, 0x00, 0x00, 0x00, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Build a multipart body with a file part plus caption/category fields.
pub fn multipart_upload(
    boundary: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
    caption: &str,
    category: &str,
) -> Vec<u8> {
    let mut body: Vec<u8> = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(
        format!(
            "\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\n{caption}"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\n{category}"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
