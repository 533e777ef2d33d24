//! Restore request assembly.
//!
//! A request bundles everything the external restore command needs for one
//! root project: its manifest, the projects in its closure, the effective
//! package folders and sources, and where outputs go. Requests for roots
//! with identical folder and source settings share one provider instance.

use restore_fs::NormalizedPath;
use std::sync::Arc;

use crate::dg_spec::DependencyGraphSpec;
use crate::error::{Error, Result};
use crate::graph::compute_closure;
use crate::manifest::{JsonManifestReader, ManifestReader, OutputType, PackageSpec, lock_file_path};
use crate::providers::{ProviderCache, ProviderKey, RestoreProviders};
use crate::reference::ProjectReference;
use crate::settings::{Settings, SettingsResolver};

/// What the restore command receives for one root project.
#[derive(Debug, Clone)]
pub struct RestoreRequest {
    pub project: Arc<PackageSpec>,
    pub providers: Arc<RestoreProviders>,
    /// The root's closure, root included, sorted by unique name.
    pub external_projects: Vec<ProjectReference>,
    pub output_type: OutputType,
    pub output_path: NormalizedPath,
    pub lock_file_path: NormalizedPath,
    pub max_parallelism: usize,
}

/// A request together with the inputs it was derived from.
#[derive(Debug, Clone)]
pub struct RestoreSummaryRequest {
    pub unique_name: String,
    /// The manifest, or the build file when there is none.
    pub input_path: NormalizedPath,
    pub settings: Settings,
    pub request: RestoreRequest,
}

/// Builds restore requests against shared settings and providers.
pub struct RestoreRequestBuilder {
    settings_resolver: Arc<dyn SettingsResolver>,
    provider_cache: Arc<ProviderCache>,
    reader: Arc<dyn ManifestReader>,
    settings_override: Option<Settings>,
}

impl RestoreRequestBuilder {
    pub fn new(
        settings_resolver: Arc<dyn SettingsResolver>,
        provider_cache: Arc<ProviderCache>,
    ) -> Self {
        Self {
            settings_resolver,
            provider_cache,
            reader: Arc::new(JsonManifestReader),
            settings_override: None,
        }
    }

    /// Reader for roots whose manifest is not attached to their reference.
    pub fn with_reader(mut self, reader: Arc<dyn ManifestReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Settings used for every root instead of resolving them from disk.
    pub fn with_settings_override(mut self, settings: Settings) -> Self {
        self.settings_override = Some(settings);
        self
    }

    pub fn provider_cache(&self) -> &Arc<ProviderCache> {
        &self.provider_cache
    }

    /// Assemble the request for `root` and its closure.
    ///
    /// Settings are resolved from the manifest's directory unless
    /// `settings_override` (or the builder's override) is given.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` when `root` or `closure` is absent,
    /// `Error::NotFound` when the root has no readable manifest, and any
    /// settings error.
    pub fn build_request(
        &self,
        root: Option<&ProjectReference>,
        closure: Option<&[ProjectReference]>,
        settings_override: Option<&Settings>,
    ) -> Result<RestoreSummaryRequest> {
        let root = root.ok_or_else(|| Error::invalid_argument("root"))?;
        let closure = closure.ok_or_else(|| Error::invalid_argument("closure"))?;

        let project = self.root_manifest(root)?;
        let root_dir = project
            .root_directory()
            .or_else(|| root.project_path.parent())
            .unwrap_or_else(|| NormalizedPath::new("."));

        let settings = match settings_override.or(self.settings_override.as_ref()) {
            Some(settings) => settings.clone(),
            None => self.settings_resolver.load_settings(&root_dir)?,
        };

        let key = ProviderKey::new(
            self.settings_resolver
                .effective_global_folder(&root_dir, &settings),
            self.settings_resolver
                .effective_fallback_folders(&root_dir, &settings),
            self.settings_resolver.effective_sources(&settings),
        );
        let providers = self.provider_cache.get_or_create(&key);

        let (output_type, output_path) = match &project.restore_metadata {
            Some(metadata) => (
                metadata.output_type,
                metadata
                    .output_path
                    .clone()
                    .unwrap_or_else(|| root_dir.clone()),
            ),
            None => (OutputType::Unknown, root_dir.clone()),
        };

        let manifest_path = root
            .manifest_path
            .clone()
            .or_else(|| project.file_path.clone());
        let lock_file_path = match &manifest_path {
            Some(path) => lock_file_path(path),
            None => root_dir.join("project.lock.json"),
        };

        let mut external_projects = closure.to_vec();
        external_projects.sort();

        tracing::debug!(
            project = %root.unique_name,
            closure = external_projects.len(),
            global_folder = %key.global_folder,
            "built restore request"
        );

        Ok(RestoreSummaryRequest {
            unique_name: root.unique_name.clone(),
            input_path: manifest_path.unwrap_or_else(|| root.project_path.clone()),
            request: RestoreRequest {
                project,
                providers,
                external_projects,
                output_type,
                output_path,
                lock_file_path,
                max_parallelism: settings.max_parallelism(),
            },
            settings,
        })
    }

    /// One request per restore root of a validated spec, in root order.
    ///
    /// # Errors
    ///
    /// `Error::ValidationFailed` when the spec is structurally inconsistent.
    pub fn create_requests(
        &self,
        dg_spec: &DependencyGraphSpec,
    ) -> Result<Vec<RestoreSummaryRequest>> {
        dg_spec.validate()?;
        let graph = dg_spec.references()?;

        let mut requests = Vec::with_capacity(dg_spec.restore.len());
        for root_name in &dg_spec.restore {
            let closure: Vec<ProjectReference> =
                compute_closure(root_name, &graph).into_iter().collect();
            let root = closure
                .iter()
                .find(|p| p.unique_name == *root_name)
                .ok_or_else(|| Error::ValidationFailed {
                    message: format!("restore root '{root_name}' is not in the graph"),
                })?;

            requests.push(self.build_request(Some(root), Some(closure.as_slice()), None)?);
        }

        Ok(requests)
    }

    fn root_manifest(&self, root: &ProjectReference) -> Result<Arc<PackageSpec>> {
        if let Some(spec) = &root.manifest {
            return Ok(Arc::clone(spec));
        }

        match &root.manifest_path {
            Some(path) => Ok(Arc::new(self.reader.read_manifest(&root.unique_name, path)?)),
            None => Err(Error::NotFound {
                what: format!("Manifest for {}", root.unique_name),
                path: root.project_path.to_native(),
            }),
        }
    }
}
