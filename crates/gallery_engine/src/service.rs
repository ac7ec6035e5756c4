use thiserror::Error;

use gallery_core::{EngagementSnapshot, Ledger, UserRecord, Users};

use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("heart toggle requires a signed-in user")]
    Unauthenticated,
    #[error("ledger worker unavailable")]
    Unavailable,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The live engagement surface: ledger plus user store, persisted in full
/// on every mutation.
///
/// In-memory state mutates before the save, so a failed save surfaces as
/// the mutation's own error while the memory image already moved on. That
/// is the store's best-effort durability model; callers see the failure
/// and durability is simply unconfirmed.
pub struct LedgerService {
    ledger: Ledger,
    users: Users,
    ledger_store: Box<dyn Store<Ledger>>,
    user_store: Box<dyn Store<Users>>,
}

impl LedgerService {
    /// Loads both stores; corrupt or missing files come back empty rather
    /// than failing startup.
    pub fn open(ledger_store: Box<dyn Store<Ledger>>, user_store: Box<dyn Store<Users>>) -> Self {
        let ledger = ledger_store.load();
        let users = user_store.load();
        Self {
            ledger,
            users,
            ledger_store,
            user_store,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn users(&self) -> &Users {
        &self.users
    }

    /// Adds or replaces a user record and persists the user store.
    pub fn insert_user(&mut self, name: &str, user: UserRecord) -> Result<(), ServiceError> {
        self.users.insert(name.to_string(), user);
        self.user_store.save(&self.users)?;
        Ok(())
    }

    /// Counts a view. A known username is deduped against the user's viewed
    /// set; anyone else counts as anonymous and always increments.
    pub fn view(
        &mut self,
        id: &str,
        username: Option<&str>,
    ) -> Result<EngagementSnapshot, ServiceError> {
        let user = match username {
            Some(name) => self.users.get_mut(name),
            None => None,
        };
        let (ledger_changed, user_changed) = match user {
            Some(user) => {
                let changed = self.ledger.record_user_view(id, user);
                (changed, changed)
            }
            None => {
                self.ledger.record_anonymous_view(id);
                (true, false)
            }
        };
        if ledger_changed {
            self.ledger_store.save(&self.ledger)?;
        }
        if user_changed {
            self.user_store.save(&self.users)?;
        }
        Ok(self.query(id, username))
    }

    /// Flips the user's heart on `id`. Membership always changes, so both
    /// stores always persist. Fails without a known user.
    pub fn toggle_heart(
        &mut self,
        id: &str,
        username: Option<&str>,
    ) -> Result<EngagementSnapshot, ServiceError> {
        let name = username.ok_or(ServiceError::Unauthenticated)?;
        let user = self
            .users
            .get_mut(name)
            .ok_or(ServiceError::Unauthenticated)?;
        self.ledger.toggle_heart(id, name, user);
        self.ledger_store.save(&self.ledger)?;
        self.user_store.save(&self.users)?;
        Ok(self.query(id, username))
    }

    /// Reads counters and membership flags without mutating anything.
    pub fn query(&self, id: &str, username: Option<&str>) -> EngagementSnapshot {
        self.ledger
            .query(id, username.and_then(|name| self.users.get(name)))
    }

    /// Replaces the entire entry set with zeroed entries for `ids`.
    pub fn reset_all(&mut self, ids: &[String]) -> Result<(), ServiceError> {
        self.ledger.reset_all(ids.iter().cloned());
        self.ledger_store.save(&self.ledger)?;
        Ok(())
    }
}
