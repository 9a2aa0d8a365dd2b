//! Response decoders
//!
//! Every call made through [`NetworkClient`](super::NetworkClient) is bound to
//! one decoder chosen at the call site. The decoder turns the raw response
//! body into its `Output` type or a [`DecodeError`]; the client never looks
//! at the body itself.

use std::marker::PhantomData;

use log::debug;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Single-method decoding contract shared by all response formats
pub trait ResponseDecoder: Send + Sync {
    /// Value produced on success
    type Output: Send + 'static;

    /// Decode a complete response body
    fn decode(&self, bytes: &[u8]) -> Result<Self::Output, DecodeError>;
}

/// Decoder for fire-and-forget calls. Always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidDecoder;

impl ResponseDecoder for VoidDecoder {
    type Output = ();

    fn decode(&self, bytes: &[u8]) -> Result<(), DecodeError> {
        debug!("Discarding response body: {}", String::from_utf8_lossy(bytes));
        Ok(())
    }
}

/// Decoder for opaque text bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl ResponseDecoder for TextDecoder {
    type Output = String;

    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| DecodeError::new("String", e.to_string()))
    }
}

/// Decoder for JSON documents with a known schema
pub struct JsonDecoder<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    pub fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonDecoder<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Failure envelope the REST API returns with a 200 status
#[derive(Deserialize)]
struct ApiFailure {
    stat: String,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> ResponseDecoder for JsonDecoder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn decode(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let type_name = short_type_name::<T>();

        serde_json::from_slice::<T>(bytes).map_err(|err| {
            match serde_json::from_slice::<ApiFailure>(bytes) {
                Ok(failure) if failure.stat == "fail" => DecodeError::new(
                    type_name,
                    format!(
                        "API error {}: {}",
                        failure.code.unwrap_or_default(),
                        failure.message.unwrap_or_else(|| "unknown".to_string())
                    ),
                ),
                _ => DecodeError::new(type_name, err.to_string()),
            }
        })
    }
}

/// Decoder that extracts the text content of one named XML element.
///
/// A document without the element decodes to an empty string.
#[derive(Debug, Clone)]
pub struct ScalarXmlDecoder {
    element: String,
}

impl ScalarXmlDecoder {
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
        }
    }

    /// Decoder for the `photoid` element of an upload response
    pub fn photo_id() -> Self {
        Self::new("photoid")
    }
}

impl ResponseDecoder for ScalarXmlDecoder {
    type Output = String;

    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let target = self.element.as_bytes();
        let mut buf = Vec::new();
        let mut inside = false;
        let mut value = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Err(e) => return Err(DecodeError::new("String", format!("XML parse error: {}", e))),
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) if e.local_name().as_ref() == target => inside = true,
                Ok(Event::Empty(e)) if e.local_name().as_ref() == target => break,
                Ok(Event::Text(e)) if inside => {
                    let text = e
                        .unescape()
                        .map_err(|e| DecodeError::new("String", e.to_string()))?;
                    value.push_str(&text);
                }
                Ok(Event::CData(e)) if inside => {
                    value.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
                Ok(Event::End(e)) if inside && e.local_name().as_ref() == target => break,
                _ => {}
            }
            buf.clear();
        }

        if value.is_empty() {
            debug!("Element <{}> not found or empty in response", self.element);
        }
        Ok(value)
    }
}

/// `std::any::type_name` without the module path
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
