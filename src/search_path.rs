//! Ordered list of directories that assets are looked up in.
//!
//! Built once during startup and only read afterwards. The most recently
//! registered directory is checked first, so later `register` calls
//! override earlier ones when two directories hold the same name.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

use crate::asset_file::AssetFile;
use crate::error::{AssetError, Result};

#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    directories: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a directory. Duplicates and missing directories are accepted.
    pub fn register<P: Into<PathBuf>>(&mut self, directory: P) {
        let directory = directory.into();
        debug!(directory = %directory.display(), "registered search directory");
        self.directories.push(directory);
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Directories in lookup order, most recently registered first.
    pub fn lookup_order(&self) -> impl Iterator<Item = &Path> {
        self.directories.iter().rev().map(PathBuf::as_path)
    }

    /// Returns the first `directory/name` that exists as a file.
    ///
    /// Names that are absolute or climb with `..` never resolve, so the
    /// result always lies inside a registered directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !is_contained(name) {
            return Err(self.not_found(name));
        }

        for directory in self.lookup_order() {
            let candidate = directory.join(name);
            if candidate.is_file() {
                debug!(name, path = %candidate.display(), "resolved asset");
                return Ok(candidate);
            }
            trace!(name, directory = %directory.display(), "asset not in directory");
        }

        Err(self.not_found(name))
    }

    /// Resolves `name` and opens it for reading.
    pub fn open(&self, name: &str) -> Result<AssetFile> {
        AssetFile::open(self.resolve(name)?, false)
    }

    /// Creates or truncates `name` in the first directory that accepts it.
    pub fn create(&self, name: &str) -> Result<AssetFile> {
        if !is_contained(name) {
            return Err(self.not_found(name));
        }

        for directory in self.lookup_order() {
            match AssetFile::open(directory.join(name), true) {
                Ok(file) => return Ok(file),
                Err(err) => trace!(name, directory = %directory.display(), %err, "cannot create asset"),
            }
        }

        Err(self.not_found(name))
    }

    fn not_found(&self, name: &str) -> AssetError {
        AssetError::AssetNotFound {
            name: name.to_string(),
            searched: self.directories.len(),
        }
    }
}

// Only plain components, so joining cannot leave the base directory
fn is_contained(name: &str) -> bool {
    let path = Path::new(name);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl<P: Into<PathBuf>> FromIterator<P> for SearchPath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut search_path = SearchPath::new();
        for directory in iter {
            search_path.register(directory);
        }
        search_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dirs(count: usize) -> Vec<TempDir> {
        (0..count).map(|_| tempfile::tempdir().unwrap()).collect()
    }

    #[test]
    fn empty_path_finds_nothing() {
        let search_path = SearchPath::new();
        assert!(search_path.is_empty());
        assert!(matches!(
            search_path.resolve("PANEL.000"),
            Err(AssetError::AssetNotFound { searched: 0, .. })
        ));
    }

    #[test]
    fn last_registered_directory_wins() {
        let roots = dirs(2);
        for (i, root) in roots.iter().enumerate() {
            fs::write(root.path().join("FONTS.000"), [i as u8]).unwrap();
        }

        let search_path: SearchPath = roots.iter().map(|d| d.path()).collect();
        assert_eq!(
            search_path.resolve("FONTS.000").unwrap(),
            roots[1].path().join("FONTS.000")
        );

        let reversed: SearchPath = roots.iter().rev().map(|d| d.path()).collect();
        assert_eq!(
            reversed.resolve("FONTS.000").unwrap(),
            roots[0].path().join("FONTS.000")
        );
    }

    #[test]
    fn falls_back_to_older_directories() {
        let roots = dirs(3);
        fs::write(roots[0].path().join("MENU.000"), b"m").unwrap();

        let search_path: SearchPath = roots.iter().map(|d| d.path()).collect();
        assert_eq!(
            search_path.resolve("MENU.000").unwrap(),
            roots[0].path().join("MENU.000")
        );
        assert!(matches!(
            search_path.resolve("MISSING.000"),
            Err(AssetError::AssetNotFound { searched: 3, .. })
        ));
    }

    #[test]
    fn directories_are_not_files() {
        let roots = dirs(1);
        fs::create_dir(roots[0].path().join("LEVEL0.000")).unwrap();

        let search_path: SearchPath = roots.iter().map(|d| d.path()).collect();
        assert!(search_path.resolve("LEVEL0.000").is_err());
    }

    #[test]
    fn resolves_only_registered_directories() {
        let roots = dirs(4);
        fs::write(roots[3].path().join("SOUNDS.000"), b"s").unwrap();

        let search_path: SearchPath = roots[..3].iter().map(|d| d.path()).collect();
        assert!(search_path.resolve("SOUNDS.000").is_err());

        let mut extended = search_path.clone();
        extended.register(roots[3].path());
        let resolved = extended.resolve("SOUNDS.000").unwrap();
        assert!(resolved.starts_with(roots[3].path()));
    }

    #[test]
    fn create_uses_most_recent_writable_directory() {
        let roots = dirs(2);
        let mut search_path = SearchPath::new();
        search_path.register(roots[0].path());
        search_path.register(roots[1].path().join("missing"));

        let mut file = search_path.create("SAVE.1").unwrap();
        file.write_u8(3).unwrap();
        drop(file);

        assert!(roots[0].path().join("SAVE.1").is_file());
        let mut reopened = search_path.open("SAVE.1").unwrap();
        assert_eq!(reopened.read_u8().unwrap(), 3);
    }

    #[test]
    fn names_outside_the_search_path_never_resolve() {
        let roots = dirs(2);
        let outside = roots[1].path().join("SECRET.000");
        fs::write(&outside, b"x").unwrap();
        fs::write(roots[0].path().join("SECRET.000"), b"y").unwrap();

        let search_path: SearchPath = [roots[0].path()].into_iter().collect();
        let absolute = outside.to_str().unwrap();
        assert!(matches!(
            search_path.resolve(absolute),
            Err(AssetError::AssetNotFound { .. })
        ));

        let climbing = format!(
            "../{}/SECRET.000",
            roots[1].path().file_name().unwrap().to_str().unwrap()
        );
        assert!(search_path.resolve(&climbing).is_err());
        assert!(search_path.resolve("").is_err());
        assert!(search_path.resolve("./SECRET.000").is_ok());
    }

    #[test]
    fn create_stays_inside_the_search_path() {
        let roots = dirs(2);
        let target = roots[1].path().join("ESCAPE.1");
        let search_path: SearchPath = [roots[0].path()].into_iter().collect();

        assert!(matches!(
            search_path.create(target.to_str().unwrap()),
            Err(AssetError::AssetNotFound { .. })
        ));
        assert!(!target.exists());
        assert!(search_path.create("../ESCAPE.1").is_err());
    }

    #[test]
    fn create_without_writable_directory_fails() {
        let roots = dirs(1);
        let search_path: SearchPath = [roots[0].path().join("nope")].into_iter().collect();
        assert!(matches!(
            search_path.create("SAVE.1"),
            Err(AssetError::AssetNotFound { .. })
        ));
    }
}
