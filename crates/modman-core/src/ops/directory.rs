//! Directory-backed install and removal operations.
//!
//! Mod payloads are expected to be already fetched into
//! `<source_dir>/<mod id>/`; installing copies that tree into
//! `<install_dir>/<mod id>/`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{ModError, Result};
use crate::fs::{remove_path_if_exists, replace_dir_with_copy};
use crate::ops::{InstallOrUpdate, Uninstall};
use crate::types::ModId;

#[derive(Debug, Clone)]
pub struct DirectoryInstaller {
    source_dir: PathBuf,
    install_dir: PathBuf,
}

impl DirectoryInstaller {
    pub fn new(source_dir: PathBuf, install_dir: PathBuf) -> Self {
        Self {
            source_dir,
            install_dir,
        }
    }

    pub fn source_path(&self, id: ModId) -> PathBuf {
        self.source_dir.join(id.to_string())
    }

    pub fn install_path(&self, id: ModId) -> PathBuf {
        self.install_dir.join(id.to_string())
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }
}

#[async_trait]
impl InstallOrUpdate for DirectoryInstaller {
    async fn install_or_update(&self, id: ModId) -> Result<()> {
        let src = self.source_path(id);
        let dst = self.install_path(id);

        tokio::task::spawn_blocking(move || {
            // Payload not downloaded yet; nothing to do until it shows up.
            if !src.is_dir() {
                return Err(ModError::install_deferred(format!(
                    "payload not available at {}",
                    src.display()
                )));
            }
            replace_dir_with_copy(&src, &dst).map_err(|e| ModError::filesystem(format!("{:#}", e)))
        })
        .await
        .map_err(|e| ModError::filesystem(format!("install task failed: {}", e)))?
    }
}

#[async_trait]
impl Uninstall for DirectoryInstaller {
    async fn uninstall(&self, id: ModId) -> Result<()> {
        let dst = self.install_path(id);

        tokio::task::spawn_blocking(move || {
            remove_path_if_exists(&dst)
                .map(|_| ())
                .map_err(|e| ModError::filesystem(format!("{:#}", e)))
        })
        .await
        .map_err(|e| ModError::filesystem(format!("uninstall task failed: {}", e)))?
    }
}
