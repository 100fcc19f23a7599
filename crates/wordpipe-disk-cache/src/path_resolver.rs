//! # Path Resolver
//!
//! Cache and data directory resolution for a static application config.

use std::{
    env,
    path::{Path, PathBuf},
};

use directories_next::ProjectDirs;

/// The kind of directory to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirKind {
    /// Re-downloadable files.
    Cache,

    /// Files the user expects to persist.
    Data,
}

/// Static configuration for application path resolution.
pub struct PathResolver {
    /// The qualifier for [`ProjectDirs`].
    pub qualifier: &'static str,

    /// The organization for [`ProjectDirs`].
    pub organization: &'static str,

    /// The application for [`ProjectDirs`].
    pub application: &'static str,

    /// Cache directory environment variables, highest priority first.
    pub cache_env_vars: &'static [&'static str],

    /// Data directory environment variables, highest priority first.
    pub data_env_vars: &'static [&'static str],
}

impl PathResolver {
    /// Get the [`ProjectDirs`] for this config.
    pub fn project_dirs(&self) -> Option<ProjectDirs> {
        ProjectDirs::from(self.qualifier, self.organization, self.application)
    }

    /// The environment variables consulted for `kind`.
    pub fn env_vars(
        &self,
        kind: DirKind,
    ) -> &'static [&'static str] {
        match kind {
            DirKind::Cache => self.cache_env_vars,
            DirKind::Data => self.data_env_vars,
        }
    }

    /// Resolve a directory.
    ///
    /// Resolution Order:
    /// 1. `path`, if present.
    /// 2. ``env[$VAR]`` for each of [`Self::env_vars`]; in order.
    /// 3. the platform project directory for `kind`, if present.
    /// 4. `None`
    pub fn resolve<P: AsRef<Path>>(
        &self,
        kind: DirKind,
        path: Option<P>,
    ) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(path.as_ref().to_path_buf());
        }

        if let Some(path) = self
            .env_vars(kind)
            .iter()
            .find_map(|var| env::var_os(var).filter(|v| !v.is_empty()))
        {
            return Some(PathBuf::from(path));
        }

        self.project_dirs().map(|pds| match kind {
            DirKind::Cache => pds.cache_dir().to_path_buf(),
            DirKind::Data => pds.data_dir().to_path_buf(),
        })
    }

    /// Resolve the cache directory; see [`Self::resolve`].
    pub fn resolve_cache_dir<P: AsRef<Path>>(
        &self,
        path: Option<P>,
    ) -> Option<PathBuf> {
        self.resolve(DirKind::Cache, path)
    }

    /// Resolve the data directory; see [`Self::resolve`].
    pub fn resolve_data_dir<P: AsRef<Path>>(
        &self,
        path: Option<P>,
    ) -> Option<PathBuf> {
        self.resolve(DirKind::Data, path)
    }
}
