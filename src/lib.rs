//! Protobuf wire codec for a recovery module's genesis state.
//!
//! Records are encoded tail-to-head into a single buffer sized up front, and
//! decoded with a forward cursor that skips any field the local schema does not
//! know about.
//!
//! ```
//! use genesis_codec::codec::{Duration, ProtoMessage};
//! use genesis_codec::genesis::{GenesisState, Params};
//!
//! let state = GenesisState {
//!     params: Params {
//!         enable_recovery: true,
//!         packet_timeout_duration: Some(Duration::from_secs(86_400)),
//!     },
//! };
//! let bytes = state.encode().unwrap();
//! assert_eq!(GenesisState::decode(&bytes).unwrap(), state);
//! ```

#![deny(clippy::as_conversions)]

pub mod buffer;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;
pub mod genesis;
pub mod leb128;
pub mod wire;

mod util;

pub use config::DecodeOptions;
pub use error::{DecodeError, DecodeErrorKind, EncodeError};
