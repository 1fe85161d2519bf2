//! Live response bodies
//!
//! A [`ByteStream`] is the unread body of a successful GET. It is consumed
//! chunk by chunk and can be fed directly into tarball extraction.

use std::io;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::TryStreamExt;
use modstat_cache::extract_from_stream;
use modstat_core::error::ModstatError;
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::RegistryResult;

/// Unconsumed response body
#[derive(Debug)]
pub struct ByteStream {
    url: String,
    response: Response,
}

impl ByteStream {
    pub(crate) fn new(url: &str, response: Response) -> Self {
        Self {
            url: url.to_string(),
            response,
        }
    }

    /// URL the body is being read from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read the next chunk of the body; `None` at the end
    pub async fn next_chunk(&mut self) -> RegistryResult<Option<Bytes>> {
        self.response.chunk().await.map_err(|e| {
            ModstatError::network(format!("Failed to read body of {}: {}", self.url, e), e)
        })
    }

    /// Treat the body as a gzipped tarball and decode the JSON entry at `target`.
    ///
    /// A transport error while reading the body is reported in preference to
    /// whatever the extractor made of the truncated input. Malformed JSON is
    /// reported against the tarball URL.
    pub async fn extract_entry<T>(self, target: &str) -> RegistryResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let Self { url, response } = self;

        // First transport error, kept so it can outrank the extractor's view of it
        let transport_error: Arc<Mutex<Option<reqwest::Error>>> = Arc::default();
        let slot = Arc::clone(&transport_error);
        let body = response.bytes_stream().map_err(move |e| {
            let aborted = io::Error::new(io::ErrorKind::ConnectionAborted, e.to_string());
            if let Ok(mut slot) = slot.lock() {
                slot.get_or_insert(e);
            }
            aborted
        });

        let extracted = extract_from_stream(Box::pin(body), target).await;

        let transport_error = transport_error.lock().ok().and_then(|mut slot| slot.take());
        if let Some(e) = transport_error {
            return Err(ModstatError::network(
                format!("Failed to read body of {}: {}", url, e),
                e,
            ));
        }

        match extracted {
            Ok(value) => {
                trace!("extracted {} from {}", target, url);
                Ok(value)
            }
            Err(ModstatError::Decode { source, .. }) => Err(ModstatError::Decode { url, source }),
            Err(other) => Err(other),
        }
    }
}
