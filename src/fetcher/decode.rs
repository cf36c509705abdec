//! Turning fetched bytes into typed values.

use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Why a payload could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid image: {0}")]
    Image(#[from] imagesize::ImageError),
}

/// A type that can be built from a fetched payload.
pub trait Decode: Sized {
    fn decode(bytes: &Bytes) -> Result<Self, DecodeError>;
}

/// JSON payload deserialized into `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> Decode for Json<T> {
    fn decode(bytes: &Bytes) -> Result<Self, DecodeError> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }
}

/// Outcome of decoding a successfully fetched payload.
///
/// Keeps "the server sent nothing" apart from "the server sent something we
/// could not read".
#[derive(Debug)]
pub enum Decoded<T> {
    /// The payload decoded into a value.
    Value(T),
    /// The payload was empty.
    Empty,
    /// The payload was present but did not decode.
    Malformed(DecodeError),
}

impl<T: Decode> Decoded<T> {
    /// Decodes `bytes`, classifying a zero-length payload as [`Decoded::Empty`].
    pub fn from_bytes(bytes: &Bytes) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }
        match T::decode(bytes) {
            Ok(value) => Self::Value(value),
            Err(e) => Self::Malformed(e),
        }
    }
}

impl<T> Decoded<T> {
    /// Collapses to an `Option`, logging a decode failure.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Empty => None,
            Self::Malformed(e) => {
                warn!(error = %e, "failed to decode payload");
                None
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Self::Value(value) => Decoded::Value(f(value)),
            Self::Empty => Decoded::Empty,
            Self::Malformed(e) => Decoded::Malformed(e),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl<T: fmt::Debug> fmt::Display for Decoded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value:?}"),
            Self::Empty => f.write_str("<empty>"),
            Self::Malformed(e) => write!(f, "<malformed: {e}>"),
        }
    }
}
