//! Invocation payload stream
//!
//! Payloads are read as a sequence of JSON values, either concatenated or
//! separated by whitespace, as typed into stdin. Each value is re-encoded
//! compactly before it is sent.

use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer, Value};
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};

/// Iterator over compact JSON payloads read from `R`
///
/// Ends at EOF. After a malformed payload the error is yielded once and the
/// stream ends, since the reader position is no longer trustworthy.
pub struct PayloadStream<R: Read> {
    inner: StreamDeserializer<'static, IoRead<R>, Value>,
    failed: bool,
}

impl<R: Read> PayloadStream<R> {
    pub fn new(reader: R) -> Self {
        PayloadStream {
            inner: Deserializer::from_reader(reader).into_iter::<Value>(),
            failed: false,
        }
    }
}

impl<R: Read> std::fmt::Debug for PayloadStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadStream")
            .field("offset", &self.inner.byte_offset())
            .field("failed", &self.failed)
            .finish()
    }
}

impl<R: Read> Iterator for PayloadStream<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.inner.next()? {
            Ok(value) => {
                let payload = serde_json::to_vec(&value).map_err(Error::Payload);
                if let Ok(bytes) = &payload {
                    debug!("Read payload of {} bytes", bytes.len());
                }
                Some(payload)
            }
            Err(e) => {
                self.failed = true;
                Some(Err(Error::Payload(e)))
            }
        }
    }
}
