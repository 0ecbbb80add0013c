//! @ai:module:intent Decide which artifacts a run emits and where each one goes
//! @ai:module:layer application
//! @ai:module:public_api Destination, ScanRoutes, route_one, route_scan
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Destination keyword that sends an artifact to standard output.
pub const STDOUT: &str = "stdout";

pub const DEFAULT_INVENTORY: &str = "inventory.json";
pub const DEFAULT_INDEXES: &str = "indexes.json";

/// @ai:intent Where one artifact is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str(STDOUT),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// @ai:intent Destinations of a scan run; `None` means the artifact is not emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRoutes {
    pub inventory: Option<Destination>,
    pub indexes: Option<Destination>,
}

/// @ai:intent Resolve an output option value to a destination
/// @ai:example (None, "inventory.json") -> File("inventory.json")
/// @ai:example (Some("stdout"), _) -> Stdout
/// @ai:example (Some("out/inv.json"), _) -> File("out/inv.json")
/// @ai:effects pure
pub fn route_one(value: Option<&str>, default_path: &Path) -> Destination {
    match value {
        None => Destination::File(default_path.to_path_buf()),
        Some(STDOUT) => Destination::Stdout,
        Some(path) => Destination::File(PathBuf::from(path)),
    }
}

/// @ai:intent Route the inventory and index artifacts of a scan
/// @ai:pre each option is None when absent, Some(None) when given without a value
/// @ai:post with neither option both artifacts go to their defaults under base_dir
/// @ai:post at most one artifact goes to stdout, otherwise Error::Usage
/// @ai:effects pure
pub fn route_scan(
    inventory: Option<Option<&str>>,
    indexes: Option<Option<&str>>,
    base_dir: &Path,
) -> Result<ScanRoutes> {
    let (inventory, indexes) = if inventory.is_none() && indexes.is_none() {
        (Some(None), Some(None))
    } else {
        (inventory, indexes)
    };

    let routes = ScanRoutes {
        inventory: inventory.map(|v| route_one(v, &base_dir.join(DEFAULT_INVENTORY))),
        indexes: indexes.map(|v| route_one(v, &base_dir.join(DEFAULT_INDEXES))),
    };

    if routes.inventory == Some(Destination::Stdout) && routes.indexes == Some(Destination::Stdout)
    {
        return Err(Error::Usage(
            "at most one output may be routed to stdout per invocation".to_string(),
        ));
    }

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> Option<Destination> {
        Some(Destination::File(PathBuf::from(path)))
    }

    #[test]
    fn test_nothing_requested_emits_both() {
        let routes = route_scan(None, None, Path::new("")).unwrap();
        assert_eq!(routes.inventory, file("inventory.json"));
        assert_eq!(routes.indexes, file("indexes.json"));
    }

    #[test]
    fn test_only_requested_artifacts_are_emitted() {
        let routes = route_scan(Some(Some("stdout")), None, Path::new("out")).unwrap();
        assert_eq!(routes.inventory, Some(Destination::Stdout));
        assert_eq!(routes.indexes, None);

        let routes = route_scan(None, Some(None), Path::new("out")).unwrap();
        assert_eq!(routes.inventory, None);
        assert_eq!(routes.indexes, file("out/indexes.json"));
    }

    #[test]
    fn test_explicit_paths() {
        let routes = route_scan(Some(Some("inv.json")), Some(Some("stdout")), Path::new("")).unwrap();
        assert_eq!(routes.inventory, file("inv.json"));
        assert_eq!(routes.indexes, Some(Destination::Stdout));
    }

    #[test]
    fn test_two_stdout_routes_rejected() {
        let result = route_scan(Some(Some("stdout")), Some(Some("stdout")), Path::new(""));
        assert!(matches!(result, Err(Error::Usage(_))));
    }
}
