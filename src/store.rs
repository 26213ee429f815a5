//! Storage for finished PDFs.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Handle to a stored PDF.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub id: String,
    pub name: String,
    pub size: u64,
}

pub trait BlobStore {
    fn store(&self, bytes: &[u8], name: &str, metadata: serde_json::Value) -> Result<StoredBlob, Error>;
    fn fetch(&self, id: &str) -> Result<Box<dyn Read + Send>, Error>;
    fn remove(&self, id: &str) -> Result<(), Error>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sidecar {
    #[serde(flatten)]
    blob: StoredBlob,
    created_at: DateTime<Utc>,
    metadata: serde_json::Value,
}

/// Keeps each blob as `<id>.pdf` with a `<id>.json` metadata sidecar.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.pdf"))
    }

    fn sidecar_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Ids are generated by `store`; anything else cannot name a blob here.
    fn checked_id<'a>(&self, id: &'a str) -> Result<&'a str, Error> {
        if uuid::Uuid::parse_str(id).is_err() {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(id)
    }

    /// Stored name, size and caller metadata of a blob.
    pub fn metadata(&self, id: &str) -> Result<(StoredBlob, serde_json::Value), Error> {
        let id = self.checked_id(id)?;
        let data = match fs::read(self.sidecar_path(id)) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::NotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        };
        let sidecar: Sidecar = serde_json::from_slice(&data)?;
        Ok((sidecar.blob, sidecar.metadata))
    }
}

impl BlobStore for FsBlobStore {
    fn store(&self, bytes: &[u8], name: &str, metadata: serde_json::Value) -> Result<StoredBlob, Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let blob = StoredBlob {
            id: id.clone(),
            name: name.to_string(),
            size: bytes.len() as u64,
        };

        let path = self.blob_path(&id);
        let mut file = File::create(&path)?;
        if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        let sidecar = Sidecar {
            blob: blob.clone(),
            created_at: Utc::now(),
            metadata,
        };
        let json = serde_json::to_vec_pretty(&sidecar)?;
        if let Err(e) = fs::write(self.sidecar_path(&id), json) {
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        log::info!("stored {} as {} ({} bytes)", blob.name, blob.id, blob.size);
        Ok(blob)
    }

    fn fetch(&self, id: &str) -> Result<Box<dyn Read + Send>, Error> {
        let id = self.checked_id(id)?;
        match File::open(self.blob_path(id)) {
            Ok(f) => Ok(Box::new(f)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, id: &str) -> Result<(), Error> {
        let id = self.checked_id(id)?;
        match fs::remove_file(self.blob_path(id)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::NotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        }
        match fs::remove_file(self.sidecar_path(id)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        log::debug!("removed blob {id}");
        Ok(())
    }
}
