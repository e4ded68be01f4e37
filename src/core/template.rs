//! Querschnitts-Vorlage (`SourceTemplate`) und Quell-Region in der Welt.
//!
//! Die Vorlage ist ein 3D-Feld `[layer][width][length]` aus Block-Zuständen.
//! Sie wird einmal zu Beginn eines Platzierungs-Jobs gelesen und danach nur
//! noch lesend verwendet.

use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Block-ID des Leer-Sentinels.
pub const AIR_ID: &str = "minecraft:air";

/// Opaker Voxel-Inhalt: Block-ID plus Zustands-Eigenschaften.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    /// Namespaced Block-ID (z.B. `minecraft:stone`)
    pub id: String,
    /// Zustands-Eigenschaften (sortiert, damit Vergleiche stabil sind)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    /// Block ohne Eigenschaften.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Fügt eine Eigenschaft hinzu (Builder-Stil).
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Der Leer-Sentinel.
    pub fn air() -> Self {
        Self::new(AIR_ID)
    }

    /// Ist der Block leer?
    pub fn is_air(&self) -> bool {
        self.id == AIR_ID || self.id == "air"
    }
}

impl Default for BlockState {
    fn default() -> Self {
        Self::air()
    }
}

/// Fehler beim Aufbau einer Vorlage.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TemplateError {
    /// Mindestens eine Dimension ist 0
    #[error("Vorlage ist leer ({height}x{width}x{length})")]
    Empty {
        height: usize,
        width: usize,
        length: usize,
    },
    /// Zeilen mit abweichender Breite oder Länge
    #[error("Vorlage ist nicht rechteckig (Layer {layer}, Spalte {column})")]
    Ragged { layer: usize, column: usize },
}

/// Drehpunkt der Vorlage: Mittelspalte und Achsen-Layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplatePivot {
    /// Breiten-Index, der auf der Trassenachse liegt (darf halbzahlig sein)
    pub center_w: f64,
    /// Layer, der auf Höhe der Trasse liegt
    pub axis_y: f64,
}

impl TemplatePivot {
    /// Standard-Pivot: mittig in der Breite, unterster Layer auf der Achse.
    pub fn centered(width: usize) -> Self {
        Self {
            center_w: (width as f64 - 1.0) / 2.0,
            axis_y: 0.0,
        }
    }
}

/// Serialisierbare Rohform einer Vorlage (für Job-Dateien).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    /// Blöcke als `[layer][width][length]`
    pub layers: Vec<Vec<Vec<BlockState>>>,
    /// Optionaler Pivot, sonst `TemplatePivot::centered`
    #[serde(default)]
    pub pivot: Option<TemplatePivot>,
}

/// Read-only Querschnitts-Vorlage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TemplateSpec", into = "TemplateSpec")]
pub struct SourceTemplate {
    cells: Vec<Vec<Vec<BlockState>>>,
    width: usize,
    height: usize,
    length: usize,
    pivot: TemplatePivot,
}

impl SourceTemplate {
    /// Baut eine Vorlage aus `[layer][width][length]` und prüft die Rechteckigkeit.
    pub fn from_layers(
        layers: Vec<Vec<Vec<BlockState>>>,
        pivot: Option<TemplatePivot>,
    ) -> Result<Self, TemplateError> {
        let height = layers.len();
        let width = layers.first().map_or(0, |l| l.len());
        let length = layers
            .first()
            .and_then(|l| l.first())
            .map_or(0, |c| c.len());
        if height == 0 || width == 0 || length == 0 {
            return Err(TemplateError::Empty {
                height,
                width,
                length,
            });
        }
        for (y, layer) in layers.iter().enumerate() {
            if layer.len() != width {
                return Err(TemplateError::Ragged {
                    layer: y,
                    column: layer.len(),
                });
            }
            if let Some(w) = layer.iter().position(|column| column.len() != length) {
                return Err(TemplateError::Ragged {
                    layer: y,
                    column: w,
                });
            }
        }
        Ok(Self {
            cells: layers,
            width,
            height,
            length,
            pivot: pivot.unwrap_or_else(|| TemplatePivot::centered(width)),
        })
    }

    /// Vorlage, deren Zellen aus `f(y, w, l)` berechnet werden.
    pub fn from_fn(
        height: usize,
        width: usize,
        length: usize,
        pivot: Option<TemplatePivot>,
        mut f: impl FnMut(usize, usize, usize) -> BlockState,
    ) -> Result<Self, TemplateError> {
        let layers = (0..height)
            .map(|y| {
                (0..width)
                    .map(|w| (0..length).map(|l| f(y, w, l)).collect())
                    .collect()
            })
            .collect();
        Self::from_layers(layers, pivot)
    }

    /// Block an `(layer, width, length)`.
    pub fn cell(&self, y: usize, w: usize, l: usize) -> &BlockState {
        &self.cells[y][w][l]
    }

    /// Breite (Querrichtung).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Höhe (Layer-Anzahl).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Länge (Wiederholungsperiode entlang der Trasse).
    pub fn length(&self) -> usize {
        self.length
    }

    /// Drehpunkt.
    pub fn pivot(&self) -> TemplatePivot {
        self.pivot
    }

    /// Anzahl Zellen pro Querschnitt (Layer × Breite).
    pub fn cross_section_cells(&self) -> usize {
        self.width * self.height
    }
}

impl TryFrom<TemplateSpec> for SourceTemplate {
    type Error = TemplateError;

    fn try_from(spec: TemplateSpec) -> Result<Self, Self::Error> {
        Self::from_layers(spec.layers, spec.pivot)
    }
}

impl From<SourceTemplate> for TemplateSpec {
    fn from(template: SourceTemplate) -> Self {
        Self {
            layers: template.cells,
            pivot: Some(template.pivot),
        }
    }
}

/// Blickrichtung der Quell-Region (Achse, entlang der die Länge läuft).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceDirection {
    /// Länge entlang +X
    #[serde(rename = "+x")]
    PlusX,
    /// Länge entlang −X
    #[serde(rename = "-x")]
    MinusX,
    /// Länge entlang +Z
    #[serde(rename = "+z")]
    PlusZ,
    /// Länge entlang −Z
    #[serde(rename = "-z")]
    MinusZ,
}

/// Quader in der Welt, aus dem die Vorlage kopiert wird.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRegion {
    /// Minimale Ecke (inklusiv)
    pub min: IVec3,
    /// Maximale Ecke (inklusiv)
    pub max: IVec3,
    /// Richtung, in der die Vorlage "gelesen" wird
    pub direction: SourceDirection,
    /// Optionaler Achspunkt (Weltkoordinate) für den Pivot
    #[serde(default)]
    pub axis: Option<IVec3>,
}

impl SourceRegion {
    /// Region aus zwei beliebigen Eckpunkten.
    pub fn from_corners(a: IVec3, b: IVec3, direction: SourceDirection) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            direction,
            axis: None,
        }
    }

    /// Setzt einen eigenen Achspunkt.
    pub fn with_axis(mut self, axis: IVec3) -> Self {
        self.axis = Some(axis);
        self
    }

    /// `(height, width, length)` der resultierenden Vorlage.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        let extent = self.max - self.min + IVec3::ONE;
        let height = extent.y as usize;
        match self.direction {
            SourceDirection::PlusX | SourceDirection::MinusX => {
                (height, extent.z as usize, extent.x as usize)
            }
            SourceDirection::PlusZ | SourceDirection::MinusZ => {
                (height, extent.x as usize, extent.z as usize)
            }
        }
    }

    /// Weltposition der Vorlagen-Zelle `(y, w, l)`.
    pub fn world_position(&self, y: usize, w: usize, l: usize) -> IVec3 {
        let (y, w, l) = (y as i32, w as i32, l as i32);
        let (min, max) = (self.min, self.max);
        let (x, z) = match self.direction {
            SourceDirection::PlusZ => (max.x - w, min.z + l),
            SourceDirection::MinusZ => (min.x + w, max.z - l),
            SourceDirection::PlusX => (min.x + l, min.z + w),
            SourceDirection::MinusX => (max.x - l, max.z - w),
        };
        IVec3::new(x, min.y + y, z)
    }

    /// Pivot aus dem Achspunkt oder mittig.
    pub fn pivot(&self) -> TemplatePivot {
        let (_, width, _) = self.dimensions();
        let Some(axis) = self.axis else {
            return TemplatePivot::centered(width);
        };
        let center_w = match self.direction {
            SourceDirection::PlusZ => self.max.x - axis.x,
            SourceDirection::MinusZ => axis.x - self.min.x,
            SourceDirection::PlusX => axis.z - self.min.z,
            SourceDirection::MinusX => self.max.z - axis.z,
        };
        TemplatePivot {
            center_w: center_w as f64,
            axis_y: (axis.y - self.min.y) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_layers_are_rejected() {
        let layers = vec![
            vec![vec![BlockState::air(); 2], vec![BlockState::air(); 2]],
            vec![vec![BlockState::air(); 2]],
        ];
        assert_eq!(
            SourceTemplate::from_layers(layers, None),
            Err(TemplateError::Ragged {
                layer: 1,
                column: 1
            })
        );
    }

    #[test]
    fn default_pivot_is_centered() {
        let t = SourceTemplate::from_fn(2, 5, 1, None, |_, _, _| BlockState::new("stone"))
            .expect("gültige Vorlage");
        assert_eq!(t.pivot().center_w, 2.0);
        assert_eq!(t.pivot().axis_y, 0.0);
        assert_eq!(t.cross_section_cells(), 10);
    }

    #[test]
    fn region_plus_z_maps_width_to_descending_x() {
        let region = SourceRegion::from_corners(
            IVec3::new(10, 0, 0),
            IVec3::new(12, 1, 3),
            SourceDirection::PlusZ,
        );
        assert_eq!(region.dimensions(), (2, 3, 4));
        assert_eq!(region.world_position(0, 0, 0), IVec3::new(12, 0, 0));
        assert_eq!(region.world_position(1, 2, 3), IVec3::new(10, 1, 3));
    }

    #[test]
    fn region_minus_x_reads_backwards() {
        let region = SourceRegion::from_corners(
            IVec3::new(0, 5, 0),
            IVec3::new(4, 5, 2),
            SourceDirection::MinusX,
        );
        assert_eq!(region.dimensions(), (1, 3, 5));
        assert_eq!(region.world_position(0, 0, 0), IVec3::new(4, 5, 2));
        assert_eq!(region.world_position(0, 2, 4), IVec3::new(0, 5, 0));
    }

    #[test]
    fn custom_axis_sets_pivot() {
        let region = SourceRegion::from_corners(
            IVec3::new(0, 60, 0),
            IVec3::new(6, 64, 9),
            SourceDirection::PlusX,
        )
        .with_axis(IVec3::new(3, 62, 2));
        let pivot = region.pivot();
        assert_eq!(pivot.center_w, 2.0);
        assert_eq!(pivot.axis_y, 2.0);
    }

    #[test]
    fn template_roundtrips_through_json() {
        let t = SourceTemplate::from_fn(1, 3, 2, None, |_, w, _| {
            if w == 1 {
                BlockState::new("minecraft:stone")
            } else {
                BlockState::air()
            }
        })
        .unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: SourceTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
