//! The offer repository: a single JSON document holding every offer.
//!
//! Every mutation is a whole-document read-modify-write: read the full
//! collection, change it in memory, serialize everything, overwrite the file.
//! Mutations take an internal mutex for the whole cycle so concurrent appends
//! and removes cannot overwrite each other's changes; reads go straight to
//! the file.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{self, Offer, OfferDraft};

/// Handle to the on-disk offer collection.
pub struct OfferStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl OfferStore {
    /// Open the store backed by the document at `path`, creating it with an
    /// empty collection if it does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        if fs::metadata(&path).await.is_err() {
            fs::write(&path, "[]").await?;
        }

        info!(path = %path.display(), "Offer store initialized");

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Return the filesystem path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every persisted offer, newest first.
    ///
    /// Never fails: a missing, unreadable, or corrupt document is treated as
    /// an empty collection.
    pub async fn list_all(&self) -> Vec<Offer> {
        self.read_collection().await
    }

    /// Offers whose `country` equals `country` exactly (case-sensitive).
    pub async fn list_by_country(&self, country: &str) -> Vec<Offer> {
        let mut offers = self.read_collection().await;
        offers.retain(|o| o.country == country);
        offers
    }

    /// Offers whose `city` equals `city` exactly (case-sensitive).
    pub async fn list_by_city(&self, city: &str) -> Vec<Offer> {
        let mut offers = self.read_collection().await;
        offers.retain(|o| o.city == city);
        offers
    }

    /// Assign an id and timestamp to `draft`, prepend it to the collection,
    /// and persist. Prepending keeps the document sorted newest-first with no
    /// explicit sort step.
    pub async fn append(&self, draft: OfferDraft) -> Result<Offer> {
        let _guard = self.write_lock.lock().await;

        let now = Utc::now();
        let offer = Offer {
            id: now.timestamp_millis(),
            product_name: draft.product_name,
            social_link: draft.social_link,
            bio: draft.bio,
            price: draft.price,
            currency: if draft.currency.is_empty() {
                models::default_currency()
            } else {
                draft.currency
            },
            country: draft.country,
            city: draft.city,
            images: draft.images,
            date: now,
        };

        let mut offers = self.read_collection().await;
        offers.insert(0, offer.clone());
        self.persist(&offers).await?;

        debug!(id = offer.id, product = %offer.product_name, "Offer appended");
        Ok(offer)
    }

    /// Remove the offer with the given id and persist the reduced collection.
    ///
    /// Returns the removed record so the caller can drive image-file cleanup,
    /// or `None` when no offer matched (the document is left untouched).
    pub async fn remove_by_id(&self, id: i64) -> Result<Option<Offer>> {
        let _guard = self.write_lock.lock().await;

        let mut offers = self.read_collection().await;
        let Some(pos) = offers.iter().position(|o| o.id == id) else {
            return Ok(None);
        };

        let removed = offers.remove(pos);
        self.persist(&offers).await?;

        debug!(id = removed.id, "Offer removed");
        Ok(Some(removed))
    }

    async fn read_collection(&self) -> Vec<Offer> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read offers document, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(offers) => offers,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Offers document is not valid JSON, treating as empty");
                Vec::new()
            }
        }
    }

    async fn persist(&self, offers: &[Offer]) -> Result<()> {
        // Pretty-printed to stay hand-inspectable, like the document the
        // frontend was built against.
        let raw = serde_json::to_string_pretty(offers)?;
        fs::write(&self.path, raw).await?;
        Ok(())
    }
}
