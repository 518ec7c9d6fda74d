use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::challenge::{Rgb, TargetPoint};
use crate::error::ConfigError;
use crate::scene::DEFAULT_VIDEO_SECS;
use crate::variant::{PointId, Variant, VARIANT_COUNT};

/// Designer-set constants for one kiosk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub hold_secs: f64,
    pub time_limit_secs: f64,
    pub instruction_delay_secs: f64,
    pub result_show_delay_secs: f64,
    pub auto_transition_delay_secs: f64,
    pub auto_reset_delay_secs: f64,
    pub enable_auto_reset: bool,
    /// Multiplier on every frame delta, 1..=10
    pub time_scale: f64,
    pub video_secs: f64,
    pub complete_color: Rgb,
    pub variants: Vec<VariantLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantLayout {
    pub name: String,
    pub points: Vec<PointSpec>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PointSpec {
    pub id: PointId,
    #[serde(default)]
    pub color: Rgb,
}

impl VariantLayout {
    fn new(name: &str, ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            name: name.to_string(),
            points: ids
                .into_iter()
                .map(|id| PointSpec {
                    id: PointId(id),
                    color: Rgb::WHITE,
                })
                .collect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hold_secs: 3.0,
            time_limit_secs: 60.0,
            instruction_delay_secs: 5.0,
            result_show_delay_secs: 10.0,
            auto_transition_delay_secs: 10.0,
            auto_reset_delay_secs: 10.0,
            enable_auto_reset: true,
            time_scale: 1.0,
            video_secs: DEFAULT_VIDEO_SECS,
            complete_color: Rgb::GREEN,
            variants: vec![
                VariantLayout::new("star", 0..5),
                VariantLayout::new("circle", 10..14),
                VariantLayout::new("triangle", 20..23),
                VariantLayout::new("square", 30..36),
            ],
        }
    }
}

impl Config {
    /// Repairs values the state machine cannot use, logging each fix.
    pub fn sanitized(mut self) -> Self {
        for (name, value) in [
            ("hold_secs", &mut self.hold_secs),
            ("time_limit_secs", &mut self.time_limit_secs),
            ("instruction_delay_secs", &mut self.instruction_delay_secs),
            ("result_show_delay_secs", &mut self.result_show_delay_secs),
            ("auto_transition_delay_secs", &mut self.auto_transition_delay_secs),
            ("auto_reset_delay_secs", &mut self.auto_reset_delay_secs),
            ("video_secs", &mut self.video_secs),
        ] {
            if !value.is_finite() || *value < 0.0 {
                log::warn!("{name} = {value} is not a valid duration, using 0");
                *value = 0.0;
            }
        }

        if !(1.0..=10.0).contains(&self.time_scale) {
            let clamped = if self.time_scale.is_nan() {
                1.0
            } else {
                self.time_scale.clamp(1.0, 10.0)
            };
            log::warn!("time_scale {} out of range, using {clamped}", self.time_scale);
            self.time_scale = clamped;
        }

        if self.variants.len() != VARIANT_COUNT {
            log::warn!(
                "{} variants configured, expected {VARIANT_COUNT}",
                self.variants.len()
            );
            self.variants.truncate(VARIANT_COUNT);
            while self.variants.len() < VARIANT_COUNT {
                let name = format!("variant {}", self.variants.len());
                self.variants.push(VariantLayout::new(&name, []));
            }
        }

        self
    }

    pub fn variant_name(&self, variant: Variant) -> &str {
        self.variants
            .get(variant.index())
            .map(|layout| layout.name.as_str())
            .unwrap_or("?")
    }

    pub fn point_sets(&self) -> [Vec<PointId>; VARIANT_COUNT] {
        std::array::from_fn(|i| {
            self.variants
                .get(i)
                .map(|layout| layout.points.iter().map(|p| p.id).collect())
                .unwrap_or_default()
        })
    }

    /// Every configured point across all variants, each with its rest colour
    pub fn target_points(&self) -> Vec<TargetPoint> {
        self.variants
            .iter()
            .flat_map(|layout| layout.points.iter())
            .map(|spec| TargetPoint::new(spec.id, spec.color))
            .collect()
    }
}

pub trait ConfigStore {
    /// Loads the stored config, falling back to defaults.
    fn load(&self) -> Config;
    fn try_load(&self) -> Result<Config, ConfigError>;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "dalgona") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("dalgona_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if !self.path.exists() {
            return Config::default();
        }
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("{}: {err}, using defaults", self.path.display());
                Config::default()
            }
        }
    }

    fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice::<Config>(&bytes)?)
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "hold_secs": 1.5, "enable_auto_reset": false }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.hold_secs, 1.5);
        assert!(!cfg.enable_auto_reset);
        assert_eq!(cfg.time_limit_secs, 60.0);
        assert_eq!(cfg.variants.len(), VARIANT_COUNT);
    }

    #[test]
    fn malformed_file_falls_back_but_try_load_reports() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);

        assert_eq!(store.load(), Config::default());
        assert_matches!(store.try_load(), Err(ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_matches!(store.try_load(), Err(ConfigError::Io(_)));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn sanitized_repairs_bad_values() {
        let cfg = Config {
            hold_secs: -1.0,
            time_scale: 25.0,
            auto_reset_delay_secs: f64::NAN,
            variants: vec![VariantLayout::new("only", [1, 2])],
            ..Config::default()
        }
        .sanitized();

        assert_eq!(cfg.hold_secs, 0.0);
        assert_eq!(cfg.time_scale, 10.0);
        assert_eq!(cfg.auto_reset_delay_secs, 0.0);
        assert_eq!(cfg.variants.len(), VARIANT_COUNT);
        assert!(cfg.point_sets()[3].is_empty());
        assert_eq!(cfg.variant_name(Variant::default()), "only");
    }

    #[test]
    fn point_sets_follow_variant_order() {
        let cfg = Config::default();
        let sets = cfg.point_sets();
        assert_eq!(sets[1], (10..14).map(PointId).collect::<Vec<_>>());
        assert_eq!(cfg.target_points().len(), 5 + 4 + 3 + 6);
    }
}
