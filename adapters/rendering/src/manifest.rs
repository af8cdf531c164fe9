use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use spotmap_core::{MapCatalog, MapId};
use tracing::info;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    maps: Vec<String>,
}

/// Returns the default map manifest path relative to the repository root.
#[must_use]
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("assets/maps.toml")
}

/// Loads the catalog of presentable maps from the manifest at `path`.
pub fn load_map_catalog(path: impl AsRef<Path>) -> Result<MapCatalog> {
    let manifest_path = path.as_ref();
    let contents = fs::read_to_string(manifest_path).with_context(|| {
        format!(
            "failed to read map manifest at {}",
            manifest_path.display()
        )
    })?;
    let catalog = parse_map_manifest(&contents)
        .with_context(|| format!("invalid map manifest at {}", manifest_path.display()))?;
    info!(
        path = %manifest_path.display(),
        maps = catalog.len(),
        "loaded map manifest"
    );
    Ok(catalog)
}

/// Parses manifest contents into a catalog of map identifiers.
///
/// Each listed image contributes its file stem, so `maps/BathHouse_Entry.png`
/// becomes `BathHouse_Entry`.
pub fn parse_map_manifest(contents: &str) -> Result<MapCatalog> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse map manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported map manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }
    if manifest.maps.is_empty() {
        bail!("map manifest lists no maps");
    }

    let mut catalog = MapCatalog::new();
    for image in &manifest.maps {
        let Some(map) = map_id_from_image_path(image) else {
            bail!("cannot derive a map name from `{image}`");
        };
        if !catalog.insert(map.clone()) {
            bail!("map manifest lists `{map}` more than once");
        }
    }
    Ok(catalog)
}

/// Derives the map identifier shown for an image path.
#[must_use]
pub fn map_id_from_image_path(path: &str) -> Option<MapId> {
    Path::new(path)
        .file_stem()
        .and_then(OsStr::to_str)
        .filter(|stem| !stem.is_empty())
        .map(MapId::new)
}
