//! Core-Domänentypen: Vektor-Hilfen, Kurvenfamilien, Vorlagen und Voxel-Schnittstelle.

pub mod family;
pub mod template;
/// Vektor-Hilfen für die Trassierung
///
/// - `HorizontalExt`: Grundriss-Operationen auf `DVec3`
/// - `TangentedPoint`: Stützpunkt mit Tangente
/// - `chord_tangents`: Sehnen-Tangenten mit analytischen Endpunkten
pub mod vector;
pub mod voxel;

pub use family::{CurveFamily, TurnDirection};
pub use template::{
    BlockState, SourceDirection, SourceRegion, SourceTemplate, TemplateError, TemplatePivot,
    TemplateSpec, AIR_ID,
};
pub use vector::{
    chord_tangents, from_heading, polyline_length, wrap_angle, HorizontalExt, TangentedPoint,
};
pub use voxel::{ChunkKey, VoxelGrid, VoxelWorld, WorldAccessError, CHUNK_SIZE};
