use derive_more::Display;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::*;

const SNAPSHOT_FILE_EXT: &str = "json";

/// Independent documents the planner persists.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Namespace {
    #[display(fmt = "student_agenda_data")]
    Agenda,
    #[display(fmt = "student_agenda_defaults")]
    Defaults,
    #[display(fmt = "student_agenda_theme")]
    Theme,
}

/// Key-value blob storage backing the planner.
///
/// `load` never fails: anything that cannot be read is reported as absent.
pub trait Storage {
    fn load(&self, namespace: Namespace) -> Option<String>;
    fn save(&self, namespace: Namespace, blob: &str) -> Result<()>;

    /// Where `namespace` lives, for log messages.
    fn location(&self, namespace: Namespace) -> String;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn load(&self, namespace: Namespace) -> Option<String> {
        (**self).load(namespace)
    }

    fn save(&self, namespace: Namespace, blob: &str) -> Result<()> {
        (**self).save(namespace, blob)
    }

    fn location(&self, namespace: Namespace) -> String {
        (**self).location(namespace)
    }
}

/// Stores each namespace as `<dir>/<namespace>.json`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: &Path) -> Self {
        FileStorage {
            dir: dir.to_owned(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, namespace: Namespace) -> PathBuf {
        self.dir
            .join(namespace.to_string())
            .with_extension(SNAPSHOT_FILE_EXT)
    }
}

impl Storage for FileStorage {
    fn load(&self, namespace: Namespace) -> Option<String> {
        let path = self.path_of(namespace);
        match fs::read_to_string(&path) {
            Ok(blob) => Some(blob),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("Could not read '{}': {}", path.display(), err);
                None
            }
        }
    }

    fn save(&self, namespace: Namespace, blob: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write next to the target first so a crash never truncates it
        let path = self.path_of(namespace);
        let tmp_path = path.with_extension(format!("{}.tmp", SNAPSHOT_FILE_EXT));
        fs::write(&tmp_path, blob)?;
        fs::rename(&tmp_path, &path)?;

        log::debug!("Saved {} ({} bytes)", path.display(), blob.len());
        Ok(())
    }

    fn location(&self, namespace: Namespace) -> String {
        self.path_of(namespace).display().to_string()
    }
}

/// In-process storage, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RefCell<HashMap<Namespace, String>>,
    fail_saves: Cell<bool>,
    save_count: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn with_blob(self, namespace: Namespace, blob: &str) -> Self {
        self.blobs.borrow_mut().insert(namespace, blob.to_owned());
        self
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    pub fn get(&self, namespace: Namespace) -> Option<String> {
        self.blobs.borrow().get(&namespace).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, namespace: Namespace) -> Option<String> {
        self.get(namespace)
    }

    fn save(&self, namespace: Namespace, blob: &str) -> Result<()> {
        if self.fail_saves.get() {
            return Err(Error::new(
                ErrorKind::IOError(io::Error::from(io::ErrorKind::PermissionDenied)),
                &format!("refusing to save {}", namespace),
            ));
        }

        self.blobs.borrow_mut().insert(namespace, blob.to_owned());
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }

    fn location(&self, namespace: Namespace) -> String {
        format!("memory:{}", namespace)
    }
}

/// Loads and decodes the JSON snapshot of `namespace`, treating missing or
/// unreadable data as no data.
pub fn load_snapshot<T, S>(storage: &S, namespace: Namespace) -> T
where
    T: DeserializeOwned + Default,
    S: Storage + ?Sized,
{
    let blob = match storage.load(namespace) {
        Some(blob) => blob,
        None => return T::default(),
    };

    serde_json::from_str(&blob).unwrap_or_else(|err| {
        log::warn!(
            "Discarding unreadable {} snapshot at '{}' ({}); the next edit overwrites it",
            namespace,
            storage.location(namespace),
            err
        );
        T::default()
    })
}

pub fn encode_snapshot<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
