//! Search path configuration gathered at startup.
//!
//! Directories are registered in the order they are collected: the JSON
//! file first, then the environment, then anything the caller adds. Since
//! lookups check the newest directory first, later sources override
//! earlier ones.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AssetError, Result};
use crate::search_path::SearchPath;

/// Environment variable holding a platform path list of asset directories.
pub const SEARCH_PATH_ENV: &str = "LEGACY_ASSET_PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

impl LoaderConfig {
    /// Loads `{ "search_paths": [...] }` from a JSON file. Relative entries
    /// are taken relative to the file's directory.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| AssetError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let mut config: LoaderConfig =
            serde_json::from_str(&text).map_err(|err| AssetError::Config {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        if let Some(base) = path.parent() {
            for entry in &mut config.search_paths {
                if entry.is_relative() {
                    *entry = base.join(&*entry);
                }
            }
        }

        Ok(config)
    }

    /// Appends the directories listed in [`SEARCH_PATH_ENV`], if set.
    pub fn extend_from_env(&mut self) {
        if let Some(value) = env::var_os(SEARCH_PATH_ENV) {
            self.extend_from_path_list(&value);
        }
    }

    pub fn extend_from_path_list(&mut self, list: &OsStr) {
        self.search_paths
            .extend(env::split_paths(list).filter(|p| !p.as_os_str().is_empty()));
    }

    pub fn push<P: Into<PathBuf>>(&mut self, directory: P) {
        self.search_paths.push(directory.into());
    }

    pub fn into_search_path(self) -> SearchPath {
        self.search_paths.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn relative_entries_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        fs::write(&path, r#"{ "search_paths": ["data", "/abs/dir"] }"#).unwrap();

        let config = LoaderConfig::from_json_file(&path).unwrap();
        assert_eq!(
            config.search_paths,
            vec![dir.path().join("data"), PathBuf::from("/abs/dir")]
        );
    }

    #[test]
    fn missing_list_means_no_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "{}").unwrap();

        assert!(LoaderConfig::from_json_file(&path)
            .unwrap()
            .search_paths
            .is_empty());
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ search_paths: ").unwrap();

        assert!(matches!(
            LoaderConfig::from_json_file(&path),
            Err(AssetError::Config { .. })
        ));
        assert!(matches!(
            LoaderConfig::from_json_file(dir.path().join("absent.json")),
            Err(AssetError::Config { .. })
        ));
    }

    #[test]
    fn path_list_appends_in_order() {
        let first = PathBuf::from("first");
        let second = PathBuf::from("second");
        let list: OsString = env::join_paths([&first, &second]).unwrap();

        let mut config = LoaderConfig::default();
        config.push("base");
        config.extend_from_path_list(&list);
        assert_eq!(
            config.search_paths,
            vec![PathBuf::from("base"), first, second]
        );

        let search_path = config.into_search_path();
        let order: Vec<_> = search_path.lookup_order().collect();
        assert_eq!(order[0], Path::new("second"));
        assert_eq!(order[2], Path::new("base"));
    }
}
