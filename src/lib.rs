//! Curve Road Builder Library.
//! Trassierungs-Geometrie und Voxel-Rasterung als Library exportiert für Tests und Wiederverwendung.

pub mod core;
pub mod geometry;
pub mod raster;
pub mod shared;

pub use core::{
    BlockState, ChunkKey, CurveFamily, HorizontalExt, SourceDirection, SourceRegion,
    SourceTemplate, TangentedPoint, TemplatePivot, TurnDirection, VoxelGrid, VoxelWorld,
    WorldAccessError, CHUNK_SIZE,
};
pub use geometry::{
    compose, BoundaryVector, CurveError, CurveRequest, CurveResult, CurveStats, CurveWarning,
    PathSampler, ProfileMode,
};
pub use raster::{
    Advisory, CellAccess, PlacementPolicy, RasterPath, RasterSettings, RasterSummary,
    RasterTask, TaskProgress, TemplateSource, UndoLog,
};
pub use shared::{curve_summary, BuilderOptions, JobFile};
