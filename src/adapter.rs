//! The capability a concrete format must provide to be tested.
//!
//! A format is plugged in by implementing [`FormatAdapter`]. Encoding is a single call;
//! decoding happens through a [`Decoder`] created per attempt so the format can hold
//! parser state (buffers, readers, cursors) between `deserialize` and `dispose`.
//!
//! The runner owns the decoder lifecycle: it calls [`Decoder::dispose`] exactly once per
//! decoder, whatever `deserialize` returned, and even if the adapter panics.
//!
//! ## Implementing an adapter
//!
//! ```rust
//! use serde_conformance::{
//!     Decoder, DeserializeError, DisposeError, FormatAdapter, SerializeError, Shape, Value,
//! };
//!
//! struct Echo;
//!
//! struct EchoDecoder<'a> {
//!     bytes: &'a [u8],
//! }
//!
//! impl FormatAdapter for Echo {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
//!         serde_json::to_vec(value).map_err(SerializeError::new)
//!     }
//!
//!     fn decoder<'a>(&'a self, bytes: &'a [u8]) -> Box<dyn Decoder + 'a> {
//!         Box::new(EchoDecoder { bytes })
//!     }
//! }
//!
//! impl Decoder for EchoDecoder<'_> {
//!     fn deserialize(&mut self, shape: &Shape) -> Result<Value, DeserializeError> {
//!         let mut de = serde_json::Deserializer::from_slice(self.bytes);
//!         shape.decode(&mut de).map_err(DeserializeError::classified)
//!     }
//!
//!     fn dispose(&mut self) -> Result<(), DisposeError> {
//!         Ok(())
//!     }
//! }
//! ```

use crate::{DeserializeError, DisposeError, SerializeError, Shape, Value};

/// A format under test.
pub trait FormatAdapter {
    /// Short name used in reports and log fields.
    fn name(&self) -> &str;

    /// Encodes `value`. Generated values are well formed, so failures here are faults.
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError>;

    /// Opens a decoding attempt over `bytes`.
    fn decoder<'a>(&'a self, bytes: &'a [u8]) -> Box<dyn Decoder + 'a>;
}

/// One decoding attempt.
pub trait Decoder {
    /// Decodes a single value of `shape`.
    fn deserialize(&mut self, shape: &Shape) -> Result<Value, DeserializeError>;

    /// Releases parser resources. Called exactly once, after `deserialize`.
    fn dispose(&mut self) -> Result<(), DisposeError>;
}
