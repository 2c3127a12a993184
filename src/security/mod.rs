pub mod nonce;

pub use nonce::{derive_legacy_nonce, merge_strings, NonceGenerator, RequestNonce};
