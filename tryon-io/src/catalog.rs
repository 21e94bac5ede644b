//! Asset catalog files
//!
//! A catalog lists the selectable accessories. The file is either a bare JSON
//! array of entries or an object with an `assets` array:
//!
//! ```json
//! { "assets": [
//!   { "id": "g1", "model-path": "3dmodel/glasses-01", "model": "scene.gltf",
//!     "type": "gltf", "y": 0.5, "scale": 0.01, "up": 10 }
//! ] }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use tryon_core::{Error, OverlayAsset, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<OverlayAsset>),
    Object { assets: Vec<OverlayAsset> },
}

/// Ordered list of selectable assets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetCatalog {
    pub assets: Vec<OverlayAsset>,
}

impl AssetCatalog {
    pub fn new(assets: Vec<OverlayAsset>) -> Self {
        Self { assets }
    }

    /// Parse catalog JSON.
    ///
    /// Relative model paths are resolved against `base` when given.
    pub fn from_json(json: &str, base: Option<&Path>) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| Error::InvalidData(format!("asset catalog: {e}")))?;
        let mut assets = match file {
            CatalogFile::List(assets) | CatalogFile::Object { assets } => assets,
        };
        if let Some(base) = base {
            for asset in &mut assets {
                if asset.model_path.is_relative() {
                    asset.model_path = base.join(&asset.model_path);
                }
            }
        }
        Ok(Self { assets })
    }

    /// Read a catalog file; model paths resolve against its directory
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json, path.parent())?;
        info!(path = %path.display(), assets = catalog.len(), "asset catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OverlayAsset> {
        self.assets.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.assets.iter().position(|a| a.id == id)
    }

    /// Index `step` entries away from `index`, wrapping at both ends
    pub fn wrap(&self, index: usize, step: isize) -> Option<usize> {
        let len = self.assets.len() as isize;
        if len == 0 {
            return None;
        }
        Some((index as isize + step).rem_euclid(len) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tryon_core::AssetKind;

    const CATALOG: &str = r#"{ "assets": [
        { "id": "g1", "model-path": "3dmodel/glasses-01", "model": "scene.gltf",
          "type": "gltf", "y": 0.5, "scale": 0.01, "up": 10 },
        { "id": "g2", "model_path": "3dmodel/glasses-02", "model_file": "scene.glb", "kind": "glb" },
        { "id": "studio", "model-path": "env", "model": "studio.exr", "type": "exr" }
    ] }"#;

    #[test]
    fn test_catalog_defaults_and_aliases() {
        let catalog = AssetCatalog::from_json(CATALOG, None).unwrap();
        assert_eq!(catalog.len(), 3);

        let g1 = catalog.get(0).unwrap();
        assert_eq!(g1.kind, AssetKind::Gltf);
        assert_eq!(g1.y, 0.5);
        assert_eq!(g1.up, 10.0);

        let g2 = catalog.get(1).unwrap();
        assert_eq!(g2.scale, 1.0);
        assert_eq!((g2.x, g2.y, g2.z, g2.up), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(catalog.get(2).unwrap().kind, AssetKind::Exr);
    }

    #[test]
    fn test_bare_list_and_base_dir() {
        let json = r#"[{ "id": "a", "model-path": "m", "model": "a.glb", "type": "glb" }]"#;
        let catalog = AssetCatalog::from_json(json, Some(Path::new("/srv/assets"))).unwrap();
        assert_eq!(catalog.get(0).unwrap().path(), PathBuf::from("/srv/assets/m/a.glb"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"[{ "id": "a", "model": "a.obj", "type": "obj" }]"#;
        assert!(matches!(AssetCatalog::from_json(json, None), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_wrap_around() {
        let catalog = AssetCatalog::from_json(CATALOG, None).unwrap();
        assert_eq!(catalog.wrap(2, 1), Some(0));
        assert_eq!(catalog.wrap(0, -1), Some(2));
        assert_eq!(AssetCatalog::default().wrap(0, 1), None);
        assert_eq!(catalog.position("g2"), Some(1));
    }
}
