use std::io::Read;

use crate::effects::cube_assembly::{CubeAssembly, CubeAssemblyParams};
use crate::effects::folding_blocks::{FoldingBlocks, FoldingBlocksParams};
use crate::effects::impossible_rotation::{ImpossibleRotation, ImpossibleRotationParams};
use crate::effects::shifting_grid::{ShiftingGrid, ShiftingGridParams};
use crate::effects::sliding_puzzle::{SlidingPuzzle, SlidingPuzzleParams};
use crate::effects::voxel_fish::{VoxelFish, VoxelFishParams};
use crate::effects::voxel_galaxy::{VoxelGalaxy, VoxelGalaxyParams};
use crate::foundation::core::{Rgba8, Viewport};
use crate::foundation::error::{LoopError, LoopResult};
use crate::scene::composer::Scene;

fn paint<S>(scene: S, background: Option<Rgba8>, with: fn(S, Rgba8) -> S) -> S {
    match background {
        Some(color) => with(scene, color),
        None => scene,
    }
}

/// Which effect to run, with its parameters. Omitted parameters take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum EffectConfig {
    FoldingBlocks(FoldingBlocksParams),
    VoxelGalaxy(VoxelGalaxyParams),
    ShiftingGrid(ShiftingGridParams),
    CubeAssembly(CubeAssemblyParams),
    SlidingPuzzle(SlidingPuzzleParams),
    VoxelFish(VoxelFishParams),
    ImpossibleRotation(ImpossibleRotationParams),
}

impl EffectConfig {
    /// Every effect name, in display order.
    pub const NAMES: [&'static str; 7] = [
        FoldingBlocks::NAME,
        VoxelGalaxy::NAME,
        ShiftingGrid::NAME,
        CubeAssembly::NAME,
        SlidingPuzzle::NAME,
        VoxelFish::NAME,
        ImpossibleRotation::NAME,
    ];

    /// Default parameters for the effect called `name`.
    pub fn from_name(name: &str) -> LoopResult<Self> {
        Ok(match name {
            FoldingBlocks::NAME => Self::FoldingBlocks(Default::default()),
            VoxelGalaxy::NAME => Self::VoxelGalaxy(Default::default()),
            ShiftingGrid::NAME => Self::ShiftingGrid(Default::default()),
            CubeAssembly::NAME => Self::CubeAssembly(Default::default()),
            SlidingPuzzle::NAME => Self::SlidingPuzzle(Default::default()),
            VoxelFish::NAME => Self::VoxelFish(Default::default()),
            ImpossibleRotation::NAME => Self::ImpossibleRotation(Default::default()),
            other => {
                return Err(LoopError::config(format!(
                    "unknown effect \"{other}\" (expected one of: {})",
                    Self::NAMES.join(", ")
                )));
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FoldingBlocks(_) => FoldingBlocks::NAME,
            Self::VoxelGalaxy(_) => VoxelGalaxy::NAME,
            Self::ShiftingGrid(_) => ShiftingGrid::NAME,
            Self::CubeAssembly(_) => CubeAssembly::NAME,
            Self::SlidingPuzzle(_) => SlidingPuzzle::NAME,
            Self::VoxelFish(_) => VoxelFish::NAME,
            Self::ImpossibleRotation(_) => ImpossibleRotation::NAME,
        }
    }

    pub fn validate(&self) -> LoopResult<()> {
        match self {
            Self::FoldingBlocks(p) => p.schedule().map(|_| ()),
            Self::VoxelGalaxy(p) => p.schedule().map(|_| ()),
            Self::ShiftingGrid(p) => p.validate(),
            Self::CubeAssembly(p) => p.timings.validate(),
            Self::SlidingPuzzle(p) => p.validate(),
            Self::VoxelFish(p) => p.validate(),
            Self::ImpossibleRotation(p) => p.validate(),
        }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self::FoldingBlocks(FoldingBlocksParams::default())
    }
}

/// Everything needed to stand up one looping effect.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub viewport: Viewport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_pixel_ratio: Option<f64>,
    /// Refresh rate of the headless host.
    pub fps: f64,
    pub seed: u64,
    /// Overrides the effect's own backdrop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgba8>,
    pub effect: EffectConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport {
                width: 1280.0,
                height: 720.0,
            },
            device_pixel_ratio: None,
            fps: 60.0,
            seed: 0x5eed,
            background: None,
            effect: EffectConfig::default(),
        }
    }
}

impl LoopConfig {
    pub fn from_reader(reader: impl Read) -> LoopResult<Self> {
        let cfg: Self = serde_json::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json(s: &str) -> LoopResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> LoopResult<()> {
        Viewport::new(self.viewport.width, self.viewport.height)
            .map_err(|e| LoopError::config(e.to_string()))?;
        if let Some(dpr) = self.device_pixel_ratio
            && !(dpr.is_finite() && dpr > 0.0)
        {
            return Err(LoopError::config(format!(
                "device_pixel_ratio must be positive and finite, got {dpr}"
            )));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            let fps = self.fps;
            return Err(LoopError::config(format!("fps must be positive, got {fps}")));
        }
        self.effect.validate()
    }

    /// Construct the configured effect at the configured viewport.
    pub fn build_scene(&self) -> LoopResult<Box<dyn Scene>> {
        self.validate()?;
        let vp = self.viewport;
        let seed = self.seed;
        let bg = self.background;
        let scene: Box<dyn Scene> = match &self.effect {
            EffectConfig::FoldingBlocks(p) => Box::new(paint(
                FoldingBlocks::new(p, vp, seed)?,
                bg,
                FoldingBlocks::with_background,
            )),
            EffectConfig::VoxelGalaxy(p) => Box::new(paint(
                VoxelGalaxy::new(p, vp, seed)?,
                bg,
                VoxelGalaxy::with_background,
            )),
            EffectConfig::ShiftingGrid(p) => Box::new(paint(
                ShiftingGrid::new(p, vp, seed)?,
                bg,
                ShiftingGrid::with_background,
            )),
            EffectConfig::CubeAssembly(p) => Box::new(paint(
                CubeAssembly::new(p, vp, seed)?,
                bg,
                CubeAssembly::with_background,
            )),
            EffectConfig::SlidingPuzzle(p) => Box::new(paint(
                SlidingPuzzle::new(p, vp, seed)?,
                bg,
                SlidingPuzzle::with_background,
            )),
            EffectConfig::VoxelFish(p) => Box::new(paint(
                VoxelFish::new(p, vp, seed)?,
                bg,
                VoxelFish::with_background,
            )),
            EffectConfig::ImpossibleRotation(p) => Box::new(paint(
                ImpossibleRotation::new(p, vp)?,
                bg,
                ImpossibleRotation::with_background,
            )),
        };
        tracing::debug!(effect = scene.name(), "scene built");
        Ok(scene)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
