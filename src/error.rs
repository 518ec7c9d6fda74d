use thiserror::Error;

use crate::host::{EffectTarget, SceneObject};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("scene object {0:?} is not wired")]
    UnwiredObject(SceneObject),

    #[error("effect {0:?} is not wired")]
    UnwiredEffect(EffectTarget),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
