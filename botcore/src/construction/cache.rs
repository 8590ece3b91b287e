//! Per-object encoding cache.
//!
//! The cache is owned by the prover context and passed by reference. Each
//! object gets its own [`LazySlot`], so encoding an object while its inputs
//! are being encoded never contends on a shared lock.
use std::{collections::HashMap, sync::Arc};

use log::debug;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::{
    construction::{ObjectId, encoder::Encoding},
    utils::{error::BotResult, lazy::LazySlot},
};

type Slot = LazySlot<Option<Arc<Encoding>>>;

#[derive(Default)]
pub struct EncodingCache {
    slots: RwLock<HashMap<ObjectId, Arc<Slot>>>,
}

impl EncodingCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: ObjectId) -> Arc<Slot> {
        let slots = self.slots.upgradable_read();
        if let Some(slot) = slots.get(&id) {
            return Arc::clone(slot);
        }
        let mut slots = RwLockUpgradableReadGuard::upgrade(slots);
        Arc::clone(slots.entry(id).or_default())
    }

    /// Cached encoding of `id`, computed with `compute` on first use.
    pub fn get_or_encode(
        &self,
        id: ObjectId,
        compute: impl FnOnce() -> BotResult<Option<Encoding>>,
    ) -> BotResult<Option<Arc<Encoding>>> {
        let slot = self.slot(id);
        let guard = slot.get_or_try_init(|| compute().map(|e| e.map(Arc::new)))?;
        Ok(Option::clone(&guard))
    }

    /// True if an encoding (possibly "none") is cached for `id`.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.slots
            .read()
            .get(&id)
            .is_some_and(|slot| slot.is_ready())
    }

    /// Forget the encoding of `id`. The next request re-encodes the object
    /// with fresh variables.
    pub fn invalidate(&self, id: ObjectId) {
        let slot = self.slots.read().get(&id).cloned();
        if let Some(slot) = slot {
            debug!("Invalidating encoding of {}", id);
            slot.invalidate();
        }
    }

    pub fn invalidate_all(&self, ids: impl IntoIterator<Item = ObjectId>) {
        for id in ids {
            self.invalidate(id);
        }
    }

    pub fn clear(&self) {
        self.slots.write().clear();
    }
}
