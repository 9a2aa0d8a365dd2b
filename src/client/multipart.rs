//! `multipart/form-data` body construction for uploads

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Form field name carrying the binary attachment
pub const FILE_FIELD_NAME: &str = "photo";

/// Length of the random part of a boundary token
const BOUNDARY_TOKEN_LEN: usize = 32;

/// Binary attachment for an upload
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// JPEG attachment with the default file name
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new("photo.jpg", "image/jpeg", bytes)
    }

    /// Guess the MIME type from a file name extension
    pub fn mime_for(file_name: &str) -> &'static str {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "heic" => "image/heic",
            "tif" | "tiff" => "image/tiff",
            "mp4" => "video/mp4",
            "mov" => "video/quicktime",
            _ => "application/octet-stream",
        }
    }
}

/// Encoded request body plus the matching `Content-Type` header value
#[derive(Debug, Clone)]
pub struct EncodedBody {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// A multipart body under construction. The boundary is fixed at creation.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    fields: Vec<(String, String)>,
    file: Option<FilePart>,
}

impl MultipartBody {
    /// Create an empty body with a fresh random boundary
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Create an empty body with a caller-chosen boundary
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            fields: Vec::new(),
            file: None,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Append a text field. Fields are emitted in insertion order.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Append several text fields
    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the binary attachment
    pub fn file(mut self, file: Option<FilePart>) -> Self {
        self.file = file;
        self
    }

    /// Content-Type header value for this body
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialize into one contiguous buffer
    pub fn encode(self) -> EncodedBody {
        let content_type = self.content_type();
        let delimiter = format!("--{}\r\n", self.boundary);

        let file_len = self.file.as_ref().map_or(0, |f| f.bytes.len());
        let mut body = Vec::with_capacity(file_len + 256 * (self.fields.len() + 2));

        for (name, value) in &self.fields {
            body.extend_from_slice(delimiter.as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    quote_param(name)
                )
                .as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        if let Some(file) = self.file {
            body.extend_from_slice(delimiter.as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    FILE_FIELD_NAME,
                    quote_param(&file.file_name)
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.mime_type).as_bytes());
            body.extend_from_slice(&file.bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        EncodedBody { body, content_type }
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a multipart body from ordered fields and an optional attachment
pub fn build(fields: &[(String, String)], file: Option<FilePart>) -> EncodedBody {
    MultipartBody::new()
        .fields(fields.iter().cloned())
        .file(file)
        .encode()
}

/// Percent-encode the bytes that would break a quoted header parameter
/// (RFC 7578 section 2)
fn quote_param(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("%22"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            _ => out.push(c),
        }
    }
    out
}

fn generate_boundary() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("photoop-{}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn boundary_of(content_type: &str) -> &str {
        content_type
            .strip_prefix("multipart/form-data; boundary=")
            .expect("content type carries a boundary")
    }

    #[test]
    fn test_header_parameters_are_escaped() {
        let file = FilePart::new("bad\"name\r\n.jpg", "image/jpeg", vec![1]);
        let encoded = MultipartBody::with_boundary("b")
            .field("odd\"key", "v")
            .file(Some(file))
            .encode();
        let text = String::from_utf8_lossy(&encoded.body);

        assert!(text.contains("name=\"odd%22key\"\r\n\r\nv\r\n"));
        assert!(text.contains("filename=\"bad%22name%0D%0A.jpg\"\r\nContent-Type: image/jpeg"));
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle)
            .count()
    }

    #[test]
    fn test_one_part_per_field_plus_file() {
        let encoded = build(
            &fields(&[("title", "Beach"), ("tags", "sea sand"), ("is_public", "1")]),
            Some(FilePart::jpeg(vec![0xff, 0xd8, 0x00, 0xd9])),
        );

        let boundary = boundary_of(&encoded.content_type);
        let delimiter = format!("--{}\r\n", boundary);
        let closing = format!("--{}--", boundary);

        assert_eq!(count(&encoded.body, delimiter.as_bytes()), 4);
        assert_eq!(count(&encoded.body, closing.as_bytes()), 1);
        assert_eq!(count(&encoded.body, b"filename="), 1);
        assert!(encoded.body.ends_with(format!("{}\r\n", closing).as_bytes()));
    }

    #[test]
    fn test_without_file() {
        let encoded = build(&fields(&[("title", "x")]), None);
        let boundary = boundary_of(&encoded.content_type);

        assert_eq!(
            count(&encoded.body, format!("--{}\r\n", boundary).as_bytes()),
            1
        );
        assert_eq!(count(&encoded.body, b"filename="), 0);
    }

    #[test]
    fn test_exact_layout() {
        let encoded = MultipartBody::with_boundary("XYZ")
            .field("title", "Hi")
            .file(Some(FilePart::new("a.png", "image/png", b"PNG".to_vec())))
            .encode();

        let expected = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            Hi\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"photo\"; filename=\"a.png\"\r\n\
            Content-Type: image/png\r\n\r\n\
            PNG\r\n\
            --XYZ--\r\n";

        assert_eq!(String::from_utf8(encoded.body).unwrap(), expected);
        assert_eq!(encoded.content_type, "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn test_fields_keep_supplied_order() {
        let encoded = build(&fields(&[("b", "2"), ("a", "1"), ("c", "3")]), None);
        let text = String::from_utf8(encoded.body).unwrap();

        let pos_b = text.find("name=\"b\"").unwrap();
        let pos_a = text.find("name=\"a\"").unwrap();
        let pos_c = text.find("name=\"c\"").unwrap();
        assert!(pos_b < pos_a && pos_a < pos_c);
    }

    #[test]
    fn test_boundaries_are_unique() {
        let first = MultipartBody::new();
        let second = MultipartBody::new();
        assert_ne!(first.boundary(), second.boundary());
        assert!(first.boundary().len() > BOUNDARY_TOKEN_LEN);
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(FilePart::mime_for("IMG_001.JPG"), "image/jpeg");
        assert_eq!(FilePart::mime_for("clip.mov"), "video/quicktime");
        assert_eq!(FilePart::mime_for("noext"), "application/octet-stream");
    }
}
