use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

use gallery_core::{Ledger, LedgerEntry, UserRecord, Users};
use gallery_logging::gallery_warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Full-file persistence seam. Loading never fails: an unreadable or
/// unparseable store logs a warning and falls back to the empty value, so
/// startup survives a corrupt file. Saving is atomic and synchronous.
pub trait Store<T>: Send + Sync {
    fn load(&self) -> T;
    fn save(&self, value: &T) -> Result<(), StoreError>;
}

/// Atomically writes `content` to `path` via a temp file in the same
/// directory, fsync, then rename.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new_in(".")?,
    };
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    // Replace any existing file to keep determinism.
    if path.exists() {
        fs::remove_file(path)?;
    }
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

fn read_root_object(path: &Path, what: &str) -> Map<String, Value> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Map::new();
        }
        Err(err) => {
            gallery_warn!("failed to read {what} store from {path:?}: {err}");
            return Map::new();
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            gallery_warn!("{what} store at {path:?} is not a JSON object; starting empty");
            Map::new()
        }
        Err(err) => {
            gallery_warn!("failed to parse {what} store at {path:?}: {err}; starting empty");
            Map::new()
        }
    }
}

fn string_set(value: Option<&Value>) -> std::collections::BTreeSet<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Coerces one raw ledger record into a well-formed entry. Missing or
/// wrong-typed fields repair to zero/empty; the stored `hearts` count is
/// ignored in favor of the membership list it derives from.
pub fn entry_from_value(value: &Value) -> LedgerEntry {
    LedgerEntry {
        views: value.get("views").and_then(Value::as_u64).unwrap_or(0),
        hearted_by: string_set(value.get("usersHearted")),
    }
}

/// Coerces one raw user record, with the same repair rules as
/// [`entry_from_value`].
pub fn user_from_value(value: &Value) -> UserRecord {
    let text = |field: &str| {
        value
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    UserRecord {
        email: text("email"),
        credential: text("credential"),
        viewed: string_set(value.get("viewed")),
        hearted: string_set(value.get("hearted")),
    }
}

/// Ledger store file: JSON object mapping item id to
/// `{views, hearts, usersHearted}`.
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Store<Ledger> for JsonLedgerStore {
    fn load(&self) -> Ledger {
        let mut ledger = Ledger::new();
        for (id, value) in read_root_object(&self.path, "ledger") {
            *ledger.upsert(&id) = entry_from_value(&value);
        }
        ledger
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let mut root = Map::new();
        for (id, entry) in ledger.iter() {
            root.insert(
                id.clone(),
                json!({
                    "views": entry.views,
                    "hearts": entry.hearts(),
                    "usersHearted": entry.hearted_by,
                }),
            );
        }
        let content = serde_json::to_string_pretty(&Value::Object(root))?;
        write_atomic(&self.path, &content)
    }
}

/// User store file: JSON object mapping username to
/// `{email, credential, viewed, hearted}`.
#[derive(Debug, Clone)]
pub struct JsonUserStore {
    path: PathBuf,
}

impl JsonUserStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Store<Users> for JsonUserStore {
    fn load(&self) -> Users {
        read_root_object(&self.path, "user")
            .into_iter()
            .map(|(name, value)| (name, user_from_value(&value)))
            .collect()
    }

    fn save(&self, users: &Users) -> Result<(), StoreError> {
        let mut root = Map::new();
        for (name, user) in users {
            root.insert(
                name.clone(),
                json!({
                    "email": user.email,
                    "credential": user.credential,
                    "viewed": user.viewed,
                    "hearted": user.hearted,
                }),
            );
        }
        let content = serde_json::to_string_pretty(&Value::Object(root))?;
        write_atomic(&self.path, &content)
    }
}
