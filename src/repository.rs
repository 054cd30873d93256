//! Typed repositories: one method per queryable field over a `RecordStore`.

use std::sync::Arc;

use coinstore_core::{CryptoAsset, Quote, RecordId};

use crate::{
    config::StoreConfig,
    storage::{open_store, InMemoryStore, RecordSet, RecordStore, StoreError},
};

pub struct QuoteRepository {
    store: Arc<dyn RecordStore<Quote>>,
}

impl QuoteRepository {
    pub fn new(store: Arc<dyn RecordStore<Quote>>) -> Self {
        Self { store }
    }

    pub fn save(&self, quote: Quote) -> Result<Quote, StoreError> {
        self.store.save(quote)
    }

    pub fn find_all(&self) -> Result<RecordSet<Quote>, StoreError> {
        self.store.find_all()
    }

    pub fn find_by_code(&self, code: &str) -> Result<RecordSet<Quote>, StoreError> {
        self.store.find_by_field("code", &code.into())
    }

    /// `currency` is the stored description, e.g. `Currency::Brl.description()`.
    pub fn find_by_currency(&self, currency: &str) -> Result<RecordSet<Quote>, StoreError> {
        self.store.find_by_field("currency", &currency.into())
    }

    pub fn find_by_id(&self, id: &RecordId) -> Result<Option<Quote>, StoreError> {
        self.store.find_by_id(id)
    }

    pub fn delete(&self, quote: &Quote) -> Result<(), StoreError> {
        self.store.delete(quote)
    }

    pub fn delete_by_id(&self, id: &RecordId) -> Result<bool, StoreError> {
        self.store.delete_by_id(id)
    }

    /// Deletes every quote for `code`, returning how many were removed.
    pub fn delete_by_code(&self, code: &str) -> Result<usize, StoreError> {
        let mut deleted = 0;
        for quote in self.find_by_code(code)? {
            if let Some(id) = &quote.id {
                tracing::info!(id = %id, code, "Deleting quote");
                if self.store.delete_by_id(id)? {
                    deleted += 1;
                }
            }
        }
        Ok(deleted)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        self.store.count()
    }
}

pub struct CryptoAssetRepository {
    store: Arc<dyn RecordStore<CryptoAsset>>,
}

impl CryptoAssetRepository {
    pub fn new(store: Arc<dyn RecordStore<CryptoAsset>>) -> Self {
        Self { store }
    }

    /// Saving an asset whose code is already stored replaces it.
    pub fn save(&self, asset: CryptoAsset) -> Result<CryptoAsset, StoreError> {
        self.store.save(asset)
    }

    pub fn find_all(&self) -> Result<RecordSet<CryptoAsset>, StoreError> {
        self.store.find_all()
    }

    pub fn find_by_name(&self, name: &str) -> Result<RecordSet<CryptoAsset>, StoreError> {
        self.store.find_by_field("name", &name.into())
    }

    pub fn find_by_code(&self, code: &str) -> Result<Option<CryptoAsset>, StoreError> {
        self.store.find_by_id(&RecordId::from(code))
    }

    /// Deletes the asset stored under `asset.code`; the other fields are not compared.
    pub fn delete(&self, asset: &CryptoAsset) -> Result<(), StoreError> {
        self.store.delete(asset)
    }

    pub fn delete_by_code(&self, code: &str) -> Result<bool, StoreError> {
        self.store.delete_by_id(&RecordId::from(code))
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        self.store.count()
    }
}

/// Every repository of the application, wired to stores built from one config.
pub struct Repositories {
    pub quotes: QuoteRepository,
    pub assets: CryptoAssetRepository,
}

impl Repositories {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self {
            quotes: QuoteRepository::new(open_store(config)?),
            assets: CryptoAssetRepository::new(open_store(config)?),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            quotes: QuoteRepository::new(Arc::new(InMemoryStore::<Quote>::new())),
            assets: CryptoAssetRepository::new(Arc::new(InMemoryStore::<CryptoAsset>::new())),
        }
    }
}
