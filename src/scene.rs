use std::collections::HashMap;

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::orbitals::{find_orbital, OrbitalInfo};
use crate::sampling::{generate_clouds_parallel, PointCloud};

/// What changed on the last scene update, by orbital id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneUpdate {
    pub generated: Vec<&'static str>,
    pub removed: Vec<&'static str>,
    pub retained: Vec<&'static str>,
}

impl SceneUpdate {
    pub fn is_noop(&self) -> bool {
        self.generated.is_empty() && self.removed.is_empty()
    }
}

/// Cached clouds for the selected orbitals.
///
/// A cloud is sampled when its orbital joins the selection and again when the
/// point count changes. Opacity and the other cosmetic settings never touch
/// the cached points.
pub struct OrbitalScene {
    config: SimulationConfig,
    selection: Vec<&'static OrbitalInfo>,
    clouds: HashMap<&'static str, PointCloud>,
    seed: Option<u64>,
}

impl OrbitalScene {
    pub fn new(config: SimulationConfig, seed: Option<u64>) -> Self {
        OrbitalScene {
            config,
            selection: Vec::new(),
            clouds: HashMap::new(),
            seed,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn selection(&self) -> impl Iterator<Item = &'static OrbitalInfo> + '_ {
        self.selection.iter().copied()
    }

    pub fn cloud(&self, id: &str) -> Option<&PointCloud> {
        self.clouds.get(id)
    }

    /// Selected orbitals with their clouds, in selection order.
    pub fn clouds(&self) -> impl Iterator<Item = (&'static OrbitalInfo, &PointCloud)> + '_ {
        self.selection
            .iter()
            .filter_map(|orbital| self.clouds.get(orbital.id).map(|cloud| (*orbital, cloud)))
    }

    /// Replaces the selection and config, resampling only what the change requires.
    pub fn apply<S: AsRef<str>>(&mut self, ids: &[S], config: SimulationConfig) -> Result<SceneUpdate> {
        config.validate()?;

        let mut selection: Vec<&'static OrbitalInfo> = Vec::with_capacity(ids.len());
        for id in ids {
            let orbital = find_orbital(id.as_ref())?;
            if !selection.iter().any(|o| o.id == orbital.id) {
                selection.push(orbital);
            }
        }

        let resample_all = self.config.needs_resample(&config);

        let mut removed: Vec<&'static str> = self
            .clouds
            .keys()
            .copied()
            .filter(|id| !selection.iter().any(|o| o.id == *id))
            .collect();
        removed.sort_unstable();
        for id in &removed {
            self.clouds.remove(id);
        }

        let (to_generate, retained): (Vec<&'static OrbitalInfo>, Vec<&'static OrbitalInfo>) = selection
            .iter()
            .copied()
            .partition(|o| resample_all || !self.clouds.contains_key(o.id));

        let fresh = generate_clouds_parallel(&to_generate, config.point_count, self.seed);
        for (orbital, cloud) in to_generate.iter().zip(fresh) {
            self.clouds.insert(orbital.id, cloud);
        }

        self.config = config;
        self.selection = selection;

        let update = SceneUpdate {
            generated: to_generate.iter().map(|o| o.id).collect(),
            removed,
            retained: retained.iter().map(|o| o.id).collect(),
        };
        tracing::info!(
            generated = ?update.generated,
            removed = ?update.removed,
            retained = update.retained.len(),
            point_count = self.config.point_count,
            "scene updated"
        );
        Ok(update)
    }

    /// Keeps the selection, swaps the config.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<SceneUpdate> {
        let ids = self.selected_ids();
        self.apply(&ids, config)
    }

    /// Adds the orbital if absent, removes it if present.
    pub fn toggle(&mut self, id: &str) -> Result<SceneUpdate> {
        let orbital = find_orbital(id)?;
        let mut ids = self.selected_ids();
        match ids.iter().position(|&selected| selected == orbital.id) {
            Some(index) => {
                ids.remove(index);
            }
            None => ids.push(orbital.id),
        }
        self.apply(&ids, self.config.clone())
    }

    pub fn clear(&mut self) -> SceneUpdate {
        let mut removed: Vec<&'static str> = self.clouds.drain().map(|(id, _)| id).collect();
        removed.sort_unstable();
        self.selection.clear();
        SceneUpdate {
            removed,
            ..Default::default()
        }
    }

    fn selected_ids(&self) -> Vec<&'static str> {
        self.selection.iter().map(|o| o.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn config(point_count: usize, opacity: f32) -> SimulationConfig {
        SimulationConfig {
            point_count,
            opacity,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_selection_generates() {
        let mut scene = OrbitalScene::new(config(5_000, 1.0), Some(1));
        let update = scene.apply(&["2pz", "3s"], config(5_000, 1.0)).unwrap();
        assert_eq!(update.generated, vec!["2pz", "3s"]);
        assert!(update.removed.is_empty());
        assert_eq!(scene.cloud("2pz").unwrap().len(), 5_000);
        assert_eq!(scene.clouds().count(), 2);
    }

    #[test]
    fn test_opacity_change_keeps_clouds() {
        let mut scene = OrbitalScene::new(config(5_000, 1.0), Some(1));
        scene.apply(&["2pz"], config(5_000, 1.0)).unwrap();
        let before = scene.cloud("2pz").unwrap().clone();

        let update = scene.set_config(config(5_000, 0.4)).unwrap();
        assert!(update.is_noop());
        assert_eq!(update.retained, vec!["2pz"]);
        assert_eq!(scene.config().opacity, 0.4);
        assert_eq!(scene.cloud("2pz").unwrap(), &before);
    }

    #[test]
    fn test_point_count_change_regenerates_everything() {
        let mut scene = OrbitalScene::new(config(5_000, 1.0), Some(1));
        scene.apply(&["2pz", "3s"], config(5_000, 1.0)).unwrap();

        let update = scene.set_config(config(10_000, 1.0)).unwrap();
        assert_eq!(update.generated, vec!["2pz", "3s"]);
        assert!(update.retained.is_empty());
        assert_eq!(scene.cloud("3s").unwrap().target, 10_000);
    }

    #[test]
    fn test_selection_change_touches_only_the_difference() {
        let mut scene = OrbitalScene::new(config(5_000, 1.0), Some(1));
        scene.apply(&["2pz", "3s"], config(5_000, 1.0)).unwrap();
        let kept = scene.cloud("3s").unwrap().clone();

        let update = scene.apply(&["3s", "4s"], config(5_000, 1.0)).unwrap();
        assert_eq!(update.generated, vec!["4s"]);
        assert_eq!(update.removed, vec!["2pz"]);
        assert_eq!(update.retained, vec!["3s"]);
        assert!(scene.cloud("2pz").is_none());
        assert_eq!(scene.cloud("3s").unwrap(), &kept);
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut scene = OrbitalScene::new(config(5_000, 1.0), Some(1));
        let update = scene.toggle("3dxy").unwrap();
        assert_eq!(update.generated, vec!["3dxy"]);

        let update = scene.toggle("3dxy").unwrap();
        assert_eq!(update.removed, vec!["3dxy"]);
        assert_eq!(scene.selection().count(), 0);

        scene.apply(&["2s", "2px"], config(5_000, 1.0)).unwrap();
        let update = scene.clear();
        assert_eq!(update.removed, vec!["2px", "2s"]);
        assert!(scene.cloud("2s").is_none());
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let mut scene = OrbitalScene::new(config(5_000, 1.0), Some(1));
        let update = scene.apply(&["3pz", "3pz"], config(5_000, 1.0)).unwrap();
        assert_eq!(update.generated, vec!["3pz"]);
        assert_eq!(scene.selection().count(), 1);
    }

    #[test]
    fn test_bad_input_leaves_scene_untouched() {
        let mut scene = OrbitalScene::new(config(5_000, 1.0), Some(1));
        scene.apply(&["2pz"], config(5_000, 1.0)).unwrap();

        let err = scene.apply(&["2pz", "9z"], config(5_000, 1.0)).unwrap_err();
        assert_eq!(err, Error::UnknownOrbital("9z".to_string()));
        assert!(scene.apply(&["2pz"], config(10, 1.0)).is_err());

        assert_eq!(scene.selection().count(), 1);
        assert_eq!(scene.config().point_count, 5_000);
        assert!(scene.cloud("2pz").is_some());
    }
}
