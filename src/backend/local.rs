use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use super::{Backend, CouponFilter};
use crate::error::BackendError;
use crate::models::*;
use crate::storage::{StorageAdapter, keys};

/// Process-local fallback store.
///
/// Every collection lives under one storage key as a JSON array, newest
/// first. Mutations read the whole collection, change it, and write it
/// back; `write_lock` serializes those cycles within this process only.
/// Writes spanning several collections go through [`LocalStore::write_all`].
pub struct LocalStore {
    storage: Arc<dyn StorageAdapter>,
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, BackendError> {
        match self.storage.get(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), BackendError> {
        self.storage.set(key, &encode(items)?)
    }

    /// Write several encoded collections as one unit. When a write fails,
    /// the collections already written are put back as they were.
    fn write_all(&self, writes: &[(&str, String)]) -> Result<(), BackendError> {
        let previous = writes
            .iter()
            .map(|(key, _)| self.storage.get(key))
            .collect::<Result<Vec<_>, _>>()?;

        for (done, (key, raw)) in writes.iter().enumerate() {
            let Err(e) = self.storage.set(key, raw) else {
                continue;
            };
            for ((key, _), old) in writes[..done].iter().zip(&previous).rev() {
                let restored = match old {
                    Some(raw) => self.storage.set(key, raw),
                    None => self.storage.remove(key),
                };
                if let Err(restore) = restored {
                    warn!(key = %key, error = %restore, "failed to restore local collection");
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, BackendError> {
        self.write_lock
            .lock()
            .map_err(|_| BackendError::Storage("local store lock poisoned".into()))
    }

    /// Prepend `item` to the collection under `key`.
    fn prepend<T>(&self, key: &str, item: &T) -> Result<(), BackendError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let _guard = self.lock()?;
        let mut items: Vec<T> = self.read(key)?;
        items.insert(0, item.clone());
        self.write(key, &items)
    }

    /// Apply `update` to the first coupon with `id`. Returns whatever `update`
    /// returns; when it returns true the coupons are written back together
    /// with `record`.
    fn transition_coupon<F>(
        &self,
        id: &str,
        record: &TransactionRecord,
        update: F,
    ) -> Result<bool, BackendError>
    where
        F: FnOnce(&mut Coupon) -> bool,
    {
        let _guard = self.lock()?;
        let mut coupons: Vec<Coupon> = self.read(keys::COUPONS)?;
        let Some(coupon) = coupons.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        if !update(coupon) {
            return Ok(false);
        }
        let mut txs: Vec<TransactionRecord> = self.read(keys::TRANSACTIONS)?;
        txs.insert(0, record.clone());
        self.write_all(&[
            (keys::COUPONS, encode(&coupons)?),
            (keys::TRANSACTIONS, encode(&txs)?),
        ])?;
        Ok(true)
    }

    /// Replace the whole coupon collection. Used for demo seeding.
    pub fn replace_coupons(&self, coupons: &[Coupon]) -> Result<(), BackendError> {
        let _guard = self.lock()?;
        self.write(keys::COUPONS, coupons)
    }

    /// Replace the whole transaction collection. Used for demo seeding.
    pub fn replace_transactions(&self, txs: &[TransactionRecord]) -> Result<(), BackendError> {
        let _guard = self.lock()?;
        self.write(keys::TRANSACTIONS, txs)
    }

    /// Replace the whole merchant collection. Used for demo seeding.
    pub fn replace_merchants(&self, merchants: &[MerchantProfile]) -> Result<(), BackendError> {
        let _guard = self.lock()?;
        self.write(keys::MERCHANTS, merchants)
    }
}

impl Backend for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn get_coupon(&self, id: &str) -> Result<Option<Coupon>, BackendError> {
        let coupons: Vec<Coupon> = self.read(keys::COUPONS)?;
        Ok(coupons.into_iter().find(|c| c.id == id))
    }

    fn list_coupons(&self, filter: &CouponFilter) -> Result<Vec<Coupon>, BackendError> {
        let coupons: Vec<Coupon> = self.read(keys::COUPONS)?;
        let mut selected: Vec<Coupon> = match filter {
            CouponFilter::All => coupons,
            CouponFilter::Merchant(merchant) => coupons
                .into_iter()
                .filter(|c| &c.merchant == merchant)
                .collect(),
            CouponFilter::Available { now } => coupons
                .into_iter()
                .filter(|c| c.is_available(*now))
                .collect(),
            CouponFilter::ClaimedBy(user) => coupons
                .into_iter()
                .filter(|c| c.claimed && !c.redeemed && c.claimed_by.as_ref() == Some(user))
                .collect(),
        };
        if matches!(filter, CouponFilter::ClaimedBy(_)) {
            selected.sort_by(|a, b| b.claimed_at.cmp(&a.claimed_at));
        }
        Ok(selected)
    }

    fn insert_coupon(
        &self,
        coupon: &Coupon,
        record: &TransactionRecord,
    ) -> Result<(), BackendError> {
        let _guard = self.lock()?;
        let mut coupons: Vec<Coupon> = self.read(keys::COUPONS)?;
        let mut txs: Vec<TransactionRecord> = self.read(keys::TRANSACTIONS)?;
        coupons.insert(0, coupon.clone());
        txs.insert(0, record.clone());
        self.write_all(&[
            (keys::COUPONS, encode(&coupons)?),
            (keys::TRANSACTIONS, encode(&txs)?),
        ])
    }

    fn mark_claimed(
        &self,
        id: &str,
        user: &str,
        at: i64,
        record: &TransactionRecord,
    ) -> Result<bool, BackendError> {
        self.transition_coupon(id, record, |c| {
            if c.claimed {
                return false;
            }
            c.claimed = true;
            c.claimed_at = Some(at);
            c.claimed_by = Some(user.to_string());
            true
        })
    }

    fn mark_redeemed(
        &self,
        id: &str,
        at: i64,
        record: &TransactionRecord,
    ) -> Result<bool, BackendError> {
        self.transition_coupon(id, record, |c| {
            if !c.claimed || c.redeemed {
                return false;
            }
            c.redeemed = true;
            c.redeemed_at = Some(at);
            c.current_redemptions += 1;
            true
        })
    }

    fn list_transactions(
        &self,
        coupon_id: Option<&str>,
    ) -> Result<Vec<TransactionRecord>, BackendError> {
        let txs: Vec<TransactionRecord> = self.read(keys::TRANSACTIONS)?;
        Ok(match coupon_id {
            Some(id) => txs.into_iter().filter(|t| t.coupon_id == id).collect(),
            None => txs,
        })
    }

    fn get_user_by_id(&self, id: &str) -> Result<Option<User>, BackendError> {
        let users: Vec<User> = self.read(keys::USERS)?;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    fn get_user_by_address(&self, address: &str) -> Result<Option<User>, BackendError> {
        let users: Vec<User> = self.read(keys::USERS)?;
        Ok(users.into_iter().find(|u| u.address == address))
    }

    fn list_users(&self) -> Result<Vec<User>, BackendError> {
        self.read(keys::USERS)
    }

    fn upsert_user(&self, user: &User) -> Result<(), BackendError> {
        let _guard = self.lock()?;
        let mut users: Vec<User> = self.read(keys::USERS)?;
        upsert_user_into(&mut users, user);
        self.write(keys::USERS, &users)
    }

    fn get_merchant(&self, address: &str) -> Result<Option<MerchantProfile>, BackendError> {
        let merchants: Vec<MerchantProfile> = self.read(keys::MERCHANTS)?;
        Ok(merchants.into_iter().find(|m| m.address == address))
    }

    fn upsert_merchant(&self, profile: &MerchantProfile) -> Result<(), BackendError> {
        let _guard = self.lock()?;
        let mut merchants: Vec<MerchantProfile> = self.read(keys::MERCHANTS)?;
        upsert_merchant_into(&mut merchants, profile);
        self.write(keys::MERCHANTS, &merchants)
    }

    fn insert_application(&self, app: &MerchantApplication) -> Result<(), BackendError> {
        self.prepend(keys::MERCHANT_APPLICATIONS, app)
    }

    fn get_application(&self, id: &str) -> Result<Option<MerchantApplication>, BackendError> {
        let apps: Vec<MerchantApplication> = self.read(keys::MERCHANT_APPLICATIONS)?;
        Ok(apps.into_iter().find(|a| a.id == id))
    }

    fn list_applications(
        &self,
        user_address: Option<&str>,
    ) -> Result<Vec<MerchantApplication>, BackendError> {
        let apps: Vec<MerchantApplication> = self.read(keys::MERCHANT_APPLICATIONS)?;
        Ok(match user_address {
            Some(address) => apps
                .into_iter()
                .filter(|a| a.user_address == address)
                .collect(),
            None => apps,
        })
    }

    fn review_application(
        &self,
        review: &ApplicationReview,
        promotion: Option<&MerchantPromotion>,
    ) -> Result<bool, BackendError> {
        let _guard = self.lock()?;
        let mut apps: Vec<MerchantApplication> = self.read(keys::MERCHANT_APPLICATIONS)?;
        let Some(app) = apps
            .iter_mut()
            .find(|a| a.id == review.id && a.status == ApplicationStatus::Pending)
        else {
            return Ok(false);
        };
        app.status = review.status;
        app.reviewed_at = Some(review.reviewed_at);
        app.reviewed_by = Some(review.reviewed_by.clone());
        app.rejection_reason = review.rejection_reason.clone();

        let mut writes = vec![(keys::MERCHANT_APPLICATIONS, encode(&apps)?)];
        if let Some(promotion) = promotion {
            let mut users: Vec<User> = self.read(keys::USERS)?;
            let mut merchants: Vec<MerchantProfile> = self.read(keys::MERCHANTS)?;
            upsert_user_into(&mut users, &promotion.user);
            upsert_merchant_into(&mut merchants, &promotion.profile);
            writes.push((keys::USERS, encode(&users)?));
            writes.push((keys::MERCHANTS, encode(&merchants)?));
        }
        self.write_all(&writes)?;
        Ok(true)
    }
}

fn encode<T: Serialize>(items: &[T]) -> Result<String, BackendError> {
    Ok(serde_json::to_string(items)?)
}

fn upsert_user_into(users: &mut Vec<User>, user: &User) {
    match users.iter_mut().find(|u| u.id == user.id) {
        Some(existing) => *existing = user.clone(),
        None => users.insert(0, user.clone()),
    }
}

fn upsert_merchant_into(merchants: &mut Vec<MerchantProfile>, profile: &MerchantProfile) {
    match merchants.iter_mut().find(|m| m.address == profile.address) {
        Some(existing) => *existing = profile.clone(),
        None => merchants.insert(0, profile.clone()),
    }
}
