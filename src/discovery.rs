//! @ai:module:intent Find the source files a scan should read
//! @ai:module:layer infrastructure
//! @ai:module:public_api SourceFile, discover
//! @ai:module:depends_on config, error

use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent A file to scan plus its logical name in records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the scan root with `/` separators.
    pub name: String,
}

/// @ai:intent List source files under a root, sorted by path
/// @ai:pre root exists
/// @ai:post a file root is returned as-is; directory entries honour include and exclude globs
/// @ai:effects fs:read
pub fn discover(root: &Path, config: &DiscoveryConfig) -> Result<Vec<SourceFile>> {
    if !root.exists() {
        return Err(Error::MissingPath(root.to_path_buf()));
    }

    if root.is_file() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        return Ok(vec![SourceFile {
            path: root.to_path_buf(),
            name,
        }]);
    }

    let include = build_globset(&config.include)?;
    let exclude = build_globset(&config.exclude)?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !exclude.is_match(e.file_name()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !include.is_match(entry.file_name()) {
            continue;
        }

        files.push(SourceFile {
            name: logical_name(root, entry.path()),
            path: entry.into_path(),
        });
    }

    tracing::debug!(root = %root.display(), files = files.len(), "discovered sources");
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| Error::Glob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| Error::Glob {
        pattern: patterns.join(","),
        source,
    })
}

fn logical_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_default_discovery() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pkg/__pycache__")).unwrap();
        fs::write(dir.path().join("main.py"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("pkg/state.py"), "").unwrap();
        fs::write(dir.path().join("pkg/__pycache__/state.py"), "").unwrap();

        let files = discover(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(names(&files), vec!["main.py", "pkg/state.py"]);
    }

    #[test]
    fn test_custom_globs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("a.py"), "").unwrap();
        fs::write(dir.path().join("b.pyi"), "").unwrap();
        fs::write(dir.path().join("vendor/c.pyi"), "").unwrap();

        let config = DiscoveryConfig {
            include: vec!["*.pyi".to_string()],
            exclude: vec!["vendor".to_string()],
        };
        let files = discover(dir.path(), &config).unwrap();
        assert_eq!(names(&files), vec!["b.pyi"]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.py");
        fs::write(&path, "").unwrap();

        let files = discover(&path, &DiscoveryConfig::default()).unwrap();
        assert_eq!(names(&files), vec!["state.py"]);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("nope"), &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingPath(_)));
    }

    #[test]
    fn test_bad_glob() {
        let dir = TempDir::new().unwrap();
        let config = DiscoveryConfig {
            include: vec!["[".to_string()],
            exclude: vec![],
        };
        assert!(matches!(
            discover(dir.path(), &config),
            Err(Error::Glob { .. })
        ));
    }
}
