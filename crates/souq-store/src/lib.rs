//! # souq-store
//!
//! Persistence layer for the Souq classifieds backend.
//!
//! All offers live in a single JSON document on disk. The crate exposes an
//! async [`OfferStore`] handle that owns that document and provides the only
//! read/append/remove access to it; no other component touches the file.

pub mod models;
pub mod offers;

mod error;

pub use error::StoreError;
pub use models::{Offer, OfferDraft};
pub use offers::OfferStore;
