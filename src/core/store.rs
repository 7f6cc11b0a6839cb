//! Encrypted file store.
//!
//! Owns the on-disk lifecycle of `envi.yaml`: locate, decrypt, decode on the
//! way in; sort, encode, encrypt, rewrite on the way out. Only ciphertext is
//! ever written to the file.
//!
//! ## Save strategy
//!
//! [`Store::save`] truncates and rewrites the handle returned by
//! [`Store::load`] instead of writing a temp file and renaming it. A crash
//! between truncate and write loses the file. There is also no cross-process
//! lock: two concurrent edits are last-writer-wins.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::cipher::{self, KeyManagement};
use crate::core::config::Settings;
use crate::core::constants::CONFIG_FILE;
use crate::core::document::Document;
use crate::core::locate;
use crate::error::{Error, Result, StoreError};

/// An open read/write handle on the encrypted file.
///
/// Returned by [`Store::load`] and consumed by [`Store::save`], so the save
/// lands in the exact file that was read even if the tree changed meanwhile.
/// Dropping it closes the file without writing.
#[derive(Debug)]
pub struct ConfigFile {
    file: File,
    path: PathBuf,
}

impl ConfigFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Load/save access to `envi.yaml` through a KMS client.
#[derive(Debug)]
pub struct Store {
    settings: Settings,
    client: Box<dyn KeyManagement>,
}

impl Store {
    /// Store backed by the KMS client this build was compiled with.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Unavailable` if no KMS backend is compiled in.
    pub fn open(settings: Settings) -> Result<Self> {
        Ok(Self::with_client(settings, cipher::client()?))
    }

    /// Store using an explicit KMS client.
    pub fn with_client(settings: Settings, client: Box<dyn KeyManagement>) -> Self {
        Self { settings, client }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Where `envi.yaml` resolves from the configured start directory.
    pub fn locate(&self) -> PathBuf {
        locate::find(self.settings.start_dir())
    }

    /// Open, decrypt and decode the file, keeping it open for [`Store::save`].
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingKeyIdentifier` if no key identifier is set
    /// - `StoreError::NotFound` if the file does not exist
    /// - `CipherError::*` if decryption or its integrity checks fail
    /// - `StoreError::MalformedDocument` if the plaintext does not decode
    pub fn load(&self) -> Result<(ConfigFile, Document)> {
        let key = self.settings.resource_id()?;
        let path = self.locate();
        debug!(path = %path.display(), "loading");

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| not_found(e, &path))?;

        let document = self.decode(key, &mut file)?;
        Ok((ConfigFile { file, path }, document))
    }

    /// Decrypt and decode without keeping a writable handle.
    ///
    /// Same errors as [`Store::load`]; works on read-only files.
    pub fn read(&self) -> Result<Document> {
        let key = self.settings.resource_id()?;
        let path = self.locate();
        debug!(path = %path.display(), "reading");

        let mut file = File::open(&path).map_err(|e| not_found(e, &path))?;
        self.decode(key, &mut file)
    }

    fn decode(&self, key: &str, file: &mut File) -> Result<Document> {
        let mut ciphertext = Vec::new();
        file.read_to_end(&mut ciphertext)?;
        debug!(ciphertext_len = ciphertext.len(), "read ciphertext");

        let plaintext = cipher::decrypt(self.client.as_ref(), key, &ciphertext)?;
        let document = Document::from_slice(&plaintext)?;

        debug!(
            production = document.env.production.len(),
            developer = document.env.developer.len(),
            "document loaded"
        );
        Ok(document)
    }

    /// Sort, encrypt and write `document` back through `file`, then close it.
    ///
    /// Encryption happens before the file is touched, so a KMS failure leaves
    /// the previous contents intact.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Store::marshal`] or an I/O error from the
    /// truncate/write.
    pub fn save(&self, file: ConfigFile, mut document: Document) -> Result<()> {
        document.env.sort();
        let ciphertext = self.marshal(&document)?;

        let ConfigFile { mut file, path } = file;
        debug!(path = %path.display(), ciphertext_len = ciphertext.len(), "rewriting");

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&ciphertext)?;
        file.flush()?;
        if let Err(e) = file.sync_all() {
            warn!(error = %e, "failed to sync envi file");
        }

        info!(path = %path.display(), "saved");
        Ok(())
    }

    /// Encode and encrypt `document` as-is.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingKeyIdentifier` if no key identifier is set
    /// - `CipherError::*` if encryption or its integrity checks fail
    pub fn marshal(&self, document: &Document) -> Result<Vec<u8>> {
        let key = self.settings.resource_id()?;
        let yaml = document.to_yaml()?;
        cipher::encrypt(self.client.as_ref(), key, yaml.as_bytes())
    }

    /// Create a new encrypted file with placeholder entries in the start
    /// directory.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingKeyIdentifier` if no key identifier is set
    /// - `StoreError::AlreadyInitialized` if a file is found in the start
    ///   directory or any ancestor
    pub fn init(&self) -> Result<PathBuf> {
        self.settings.resource_id()?;

        if let Some(existing) = locate::find_existing(self.settings.start_dir()) {
            return Err(StoreError::AlreadyInitialized(existing).into());
        }

        let ciphertext = self.marshal(&Document::new())?;
        let path = self.settings.start_dir().join(CONFIG_FILE);

        let mut file = create_new(&path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StoreError::AlreadyInitialized(path.clone()).into(),
            _ => Error::Io(e),
        })?;
        file.write_all(&ciphertext)?;
        if let Err(e) = file.sync_all() {
            warn!(error = %e, "failed to sync envi file");
        }

        info!(path = %path.display(), "initialized");
        Ok(path)
    }
}

fn not_found(e: std::io::Error, path: &Path) -> Error {
    match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()).into(),
        _ => Error::Io(e),
    }
}

/// Create a file that must not exist yet, owner-only on unix.
pub(crate) fn create_new(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}
