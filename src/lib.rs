//! loopfx renders procedural, endlessly looping background animations.
//!
//! An effect is a set of entities (blocks, voxels, cells, solids) whose visual state is a pure
//! function of elapsed time, plus a draw routine. A single refresh-driven frame loop drives any
//! effect on any [`Surface`].
//!
//! # Frame pipeline
//!
//! 1. **Schedule**: [`PhaseSchedule`] maps elapsed milliseconds and a per-entity stagger to
//!    `(phase, progress)`.
//! 2. **Update**: each [`Entity`] derives its state from that sample, through an [`Ease`].
//! 3. **Draw**: a [`Scene`] clears the surface and paints entities, back to front when they
//!    overlap ([`Composer::tick_depth_sorted`]).
//! 4. **Loop**: [`FrameLoop`] requests the next refresh from a [`RefreshScheduler`], keeps the
//!    surface at `viewport × device pixel ratio`, and stops cleanly on teardown.
//!
//! Nothing on the per-frame path returns an error. Invalid parameters are rejected when an
//! effect or a [`LoopConfig`] is built.
#![forbid(unsafe_code)]

mod animation;
mod config;
mod effects;
mod foundation;
mod host;
mod render;
mod scene;

pub use animation::ease::{BACK_OVERSHOOT, Ease};
pub use animation::phase::{Phase, PhaseSample, PhaseSchedule};
pub use config::{EffectConfig, LoopConfig};
pub use foundation::core::{Affine, BezPath, Euler, Point, Rect, Rgba8, Vec2, Vec3, Viewport};
pub use foundation::error::{LoopError, LoopResult};
pub use foundation::math::{Rng64, permutation, shuffle};
pub use host::adapter::{ResizeSignal, ResizeSnapshot, SurfaceAdapter, sanitize_density};
pub use host::driver::{FrameLoop, FrameOutcome, NotReady, StartOutcome};
pub use host::headless::HeadlessHost;
pub use host::scheduler::{FrameHandle, ManualScheduler, RefreshScheduler};
pub use render::cpu::{CpuSurface, FrameRGBA};
pub use render::record::{DrawOp, RecordingSurface};
pub use render::surface::{Surface, polygon_path, rounded_rect_path};
pub use scene::camera::{Camera, Projected, Projector, isometric, isometric_depth};
pub use scene::composer::{Composer, Scene};
pub use scene::entity::{Depth, Entity, Progress, Variant};
pub use scene::reshuffle::{
    AssemblyMachine, AssemblyState, AssemblyTimings, Burst, Launch, PieceState, next_assignment,
};
pub use scene::solid::{
    EntityVariant, Fog, Light, Lighting, Pose, Solid, SolidView, Transform3, y_axis_to,
};

pub use effects::cube_assembly::{AssemblyPiece, CubeAssembly, CubeAssemblyParams};
pub use effects::folding_blocks::{
    FoldPhase, FoldingBlock, FoldingBlocks, FoldingBlocksParams, fold_progress,
};
pub use effects::impossible_rotation::{
    Frame, FramePart, FrameViews, ImpossibleRotation, ImpossibleRotationParams, frame_rotations,
};
pub use effects::shifting_grid::{
    GridCell, GridLayout, GridMode, MorphTarget, ShiftingGrid, ShiftingGridParams, gate_mask,
    morph_assignment,
};
pub use effects::sliding_puzzle::{
    Board, Cell, Slide, SlidingPuzzle, SlidingPuzzleParams, WallCube, plan_slides,
};
pub use effects::voxel_fish::{FishPart, VoxelFish, VoxelFishParams};
pub use effects::voxel_galaxy::{
    GalaxyPhase, IsoView, PLANETS, Planet, Voxel, VoxelGalaxy, VoxelGalaxyParams,
    galaxy_progress,
};
