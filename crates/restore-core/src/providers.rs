//! Shared restore providers, cached per folder and source configuration.
//!
//! Several root projects in one session usually resolve to the same global
//! folder, fallback folders and sources. They share one [`RestoreProviders`]
//! instance through [`ProviderCache`].

use restore_fs::{NormalizedPath, PackageFolderLayout};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Identifies one provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderKey {
    pub global_folder: NormalizedPath,
    pub fallback_folders: Vec<NormalizedPath>,
    pub sources: Vec<String>,
}

impl ProviderKey {
    pub fn new(
        global_folder: NormalizedPath,
        fallback_folders: Vec<NormalizedPath>,
        sources: Vec<String>,
    ) -> Self {
        Self {
            global_folder,
            fallback_folders,
            sources,
        }
    }
}

/// Package folders and sources a restore reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreProviders {
    global_folder: PackageFolderLayout,
    fallback_folders: Vec<PackageFolderLayout>,
    sources: Vec<String>,
}

impl RestoreProviders {
    pub fn from_key(key: &ProviderKey) -> Self {
        Self {
            global_folder: PackageFolderLayout::new(key.global_folder.clone()),
            fallback_folders: key
                .fallback_folders
                .iter()
                .cloned()
                .map(PackageFolderLayout::new)
                .collect(),
            sources: key.sources.clone(),
        }
    }

    pub fn global_folder(&self) -> &PackageFolderLayout {
        &self.global_folder
    }

    pub fn fallback_folders(&self) -> &[PackageFolderLayout] {
        &self.fallback_folders
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Every package folder in lookup order, global folder first.
    pub fn package_folders(&self) -> Vec<PackageFolderLayout> {
        std::iter::once(&self.global_folder)
            .chain(&self.fallback_folders)
            .cloned()
            .collect()
    }

    /// Roots of [`Self::package_folders`].
    pub fn package_folder_paths(&self) -> Vec<NormalizedPath> {
        self.package_folders()
            .into_iter()
            .map(|folder| folder.root().clone())
            .collect()
    }
}

/// Session-wide cache of providers, safe to share across tasks.
#[derive(Debug, Default)]
pub struct ProviderCache {
    providers: Mutex<HashMap<ProviderKey, Arc<RestoreProviders>>>,
}

impl ProviderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Providers for `key`, built on first request.
    pub fn get_or_create(&self, key: &ProviderKey) -> Arc<RestoreProviders> {
        self.get_or_create_with(key, RestoreProviders::from_key)
    }

    /// Like [`Self::get_or_create`] with a custom constructor.
    ///
    /// The lock is held while `create` runs, so racing callers with the same
    /// key observe a single construction.
    pub fn get_or_create_with<F>(&self, key: &ProviderKey, create: F) -> Arc<RestoreProviders>
    where
        F: FnOnce(&ProviderKey) -> RestoreProviders,
    {
        let mut providers = self
            .providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = providers.get(key) {
            return Arc::clone(existing);
        }

        tracing::debug!(
            global_folder = %key.global_folder,
            fallback_folders = key.fallback_folders.len(),
            sources = key.sources.len(),
            "creating restore providers"
        );
        let created = Arc::new(create(key));
        providers.insert(key.clone(), Arc::clone(&created));
        created
    }

    pub fn len(&self) -> usize {
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
