//! Room template and replacement catalogues.
//!
//! Templates are authored per design label as a grid of cell kinds, a local
//! reference point, and a set of door cells. Catalogues are loadable from
//! JSON files or built from the default content pack. All templates are
//! validated at load time; the solver never has to defend against malformed
//! grids mid-search.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{CellKind, DesignLabel, Pos};

/// A door cell on a template wall, independently markable as used once the
/// level assembler finds a partner door at the same absolute coordinate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub pos: Pos,
    #[serde(default)]
    pub used: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub layout: Vec<Vec<CellKind>>,
    pub local_ref: Pos,
    pub doors: Vec<Door>,
}

impl RoomTemplate {
    pub fn height(&self) -> usize {
        self.layout.len()
    }

    pub fn width(&self) -> usize {
        self.layout.first().map_or(0, Vec::len)
    }

    /// Cell kind at a local coordinate; anything outside the grid reads as
    /// void so callers can probe freely.
    pub fn cell(&self, local: Pos) -> CellKind {
        if local.y < 0 || local.x < 0 {
            return CellKind::Skip;
        }
        let y = local.y as usize;
        let x = local.x as usize;
        if y >= self.height() || x >= self.width() {
            return CellKind::Skip;
        }
        self.layout[y][x]
    }

    pub fn in_bounds(&self, local: Pos) -> bool {
        local.y >= 0
            && local.x >= 0
            && (local.y as usize) < self.height()
            && (local.x as usize) < self.width()
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.layout.is_empty() || self.width() == 0 {
            return Err(TemplateError::EmptyLayout);
        }
        let width = self.width();
        for (row, cells) in self.layout.iter().enumerate() {
            if cells.len() != width {
                return Err(TemplateError::RaggedLayout { row });
            }
        }
        if !self.in_bounds(self.local_ref) {
            return Err(TemplateError::ReferenceOutOfBounds { local_ref: self.local_ref });
        }
        for door in &self.doors {
            if !self.in_bounds(door.pos) {
                return Err(TemplateError::DoorOutOfBounds { door: door.pos });
            }
            if self.cell(door.pos) != CellKind::Wall {
                return Err(TemplateError::DoorNotOnWall { door: door.pos });
            }
        }
        if !self.layout.iter().flatten().any(|&kind| kind == CellKind::Floor) {
            return Err(TemplateError::NoFloorCell);
        }
        Ok(())
    }

    /// The template itself plus its three clockwise rotations, as distinct
    /// instances. Symmetric shapes produce duplicate layouts; the solver
    /// tolerates that the same way it tolerates equivalent candidates.
    pub fn rotations(&self) -> Vec<RoomTemplate> {
        let quarter = self.rotated_cw();
        let half = quarter.rotated_cw();
        let three_quarter = half.rotated_cw();
        vec![self.clone(), quarter, half, three_quarter]
    }

    fn rotated_cw(&self) -> RoomTemplate {
        let height = self.height();
        let width = self.width();
        let mut layout = vec![vec![CellKind::Skip; height]; width];
        for (y, row) in self.layout.iter().enumerate() {
            for (x, &kind) in row.iter().enumerate() {
                layout[x][height - 1 - y] = kind;
            }
        }
        let rotate = |pos: Pos| Pos { y: pos.x, x: height as i32 - 1 - pos.y };
        RoomTemplate {
            layout,
            local_ref: rotate(self.local_ref),
            doors: self
                .doors
                .iter()
                .map(|door| Door { pos: rotate(door.pos), used: door.used })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateError {
    EmptyLayout,
    RaggedLayout { row: usize },
    ReferenceOutOfBounds { local_ref: Pos },
    DoorOutOfBounds { door: Pos },
    DoorNotOnWall { door: Pos },
    NoFloorCell,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLayout => write!(f, "template layout grid is empty"),
            Self::RaggedLayout { row } => {
                write!(f, "template layout row {row} has a different width than row 0")
            }
            Self::ReferenceOutOfBounds { local_ref } => {
                write!(f, "local reference point {local_ref:?} lies outside the layout grid")
            }
            Self::DoorOutOfBounds { door } => {
                write!(f, "door {door:?} lies outside the layout grid")
            }
            Self::DoorNotOnWall { door } => {
                write!(f, "door {door:?} is not placed on a wall cell")
            }
            Self::NoFloorCell => write!(f, "template has no floor cell"),
        }
    }
}

/// Cosmetic tile-variant substitution applied while materializing rooms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub target: CellKind,
    pub variant: String,
}

#[derive(Debug)]
pub enum CatalogLoadError {
    Io(io::Error),
    Parse(String),
    InvalidTemplate { design: DesignLabel, index: usize, source: TemplateError },
}

impl fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "catalog I/O error: {e}"),
            Self::Parse(message) => write!(f, "catalog parse error: {message}"),
            Self::InvalidTemplate { design, index, source } => {
                write!(f, "invalid template {index} for design {design:?}: {source}")
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TemplateCatalogFile {
    designs: Vec<TemplateDesignEntry>,
}

#[derive(Serialize, Deserialize)]
struct TemplateDesignEntry {
    design: DesignLabel,
    templates: Vec<RoomTemplate>,
}

/// Per-design room template lists, validated on construction.
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    by_design: BTreeMap<DesignLabel, Vec<RoomTemplate>>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        design: DesignLabel,
        template: RoomTemplate,
    ) -> Result<(), TemplateError> {
        template.validate()?;
        self.by_design.entry(design).or_default().push(template);
        Ok(())
    }

    pub fn templates_for(&self, design: DesignLabel) -> &[RoomTemplate] {
        self.by_design.get(&design).map_or(&[], Vec::as_slice)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogLoadError> {
        let file: TemplateCatalogFile =
            serde_json::from_str(text).map_err(|e| CatalogLoadError::Parse(e.to_string()))?;
        let mut catalog = Self::new();
        for entry in file.designs {
            for (index, template) in entry.templates.into_iter().enumerate() {
                catalog.insert(entry.design, template).map_err(|source| {
                    CatalogLoadError::InvalidTemplate { design: entry.design, index, source }
                })?;
            }
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let text = fs::read_to_string(path).map_err(CatalogLoadError::Io)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let file = TemplateCatalogFile {
            designs: self
                .by_design
                .iter()
                .map(|(&design, templates)| TemplateDesignEntry {
                    design,
                    templates: templates.clone(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&file)
    }

    /// Built-in template set: every design label shares the same four base
    /// shapes so generation works out of the box.
    pub fn build_default() -> Self {
        let mut catalog = Self::new();
        for design in DesignLabel::ALL {
            for template in default_templates() {
                catalog.insert(design, template).expect("default templates are valid");
            }
        }
        catalog
    }
}

#[derive(Serialize, Deserialize)]
struct ReplacementCatalogFile {
    designs: Vec<ReplacementDesignEntry>,
}

#[derive(Serialize, Deserialize)]
struct ReplacementDesignEntry {
    design: DesignLabel,
    replacements: Vec<Replacement>,
}

/// Per-design cosmetic replacements. An empty catalog is a valid
/// configuration meaning no substitution.
#[derive(Clone, Debug, Default)]
pub struct ReplacementCatalog {
    by_design: BTreeMap<DesignLabel, Vec<Replacement>>,
}

impl ReplacementCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, design: DesignLabel, replacement: Replacement) {
        self.by_design.entry(design).or_default().push(replacement);
    }

    pub fn replacements_for(&self, design: DesignLabel) -> &[Replacement] {
        self.by_design.get(&design).map_or(&[], Vec::as_slice)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogLoadError> {
        let file: ReplacementCatalogFile =
            serde_json::from_str(text).map_err(|e| CatalogLoadError::Parse(e.to_string()))?;
        let mut catalog = Self::empty();
        for entry in file.designs {
            for replacement in entry.replacements {
                catalog.insert(entry.design, replacement);
            }
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let text = fs::read_to_string(path).map_err(CatalogLoadError::Io)?;
        Self::from_json(&text)
    }

    pub fn build_default() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(DesignLabel::Fire, Replacement {
            target: CellKind::Floor,
            variant: "floor_cracked_ember".to_string(),
        });
        catalog.insert(DesignLabel::Ice, Replacement {
            target: CellKind::Floor,
            variant: "floor_frost".to_string(),
        });
        catalog.insert(DesignLabel::Ice, Replacement {
            target: CellKind::Wall,
            variant: "wall_glacier".to_string(),
        });
        catalog.insert(DesignLabel::Forest, Replacement {
            target: CellKind::Floor,
            variant: "floor_moss".to_string(),
        });
        catalog
    }
}

fn default_templates() -> Vec<RoomTemplate> {
    vec![square_small(), square_large(), wide_hall(), l_room(), double_hall()]
}

fn grid(rows: &[&str]) -> Vec<Vec<CellKind>> {
    rows.iter()
        .map(|row| {
            row.chars()
                .map(|symbol| match symbol {
                    '#' => CellKind::Wall,
                    '.' => CellKind::Floor,
                    _ => CellKind::Skip,
                })
                .collect()
        })
        .collect()
}

fn doors(positions: &[(i32, i32)]) -> Vec<Door> {
    positions.iter().map(|&(y, x)| Door { pos: Pos { y, x }, used: false }).collect()
}

/// 3x3 cell room: one floor cell, a door on each side.
fn square_small() -> RoomTemplate {
    RoomTemplate {
        layout: grid(&["###", "#.#", "###"]),
        local_ref: Pos { y: 1, x: 1 },
        doors: doors(&[(0, 1), (1, 0), (1, 2), (2, 1)]),
    }
}

/// 5x5 cell room with a 3x3 floor interior.
fn square_large() -> RoomTemplate {
    RoomTemplate {
        layout: grid(&["#####", "#...#", "#...#", "#...#", "#####"]),
        local_ref: Pos { y: 2, x: 2 },
        doors: doors(&[(0, 2), (2, 0), (2, 4), (4, 2)]),
    }
}

/// 3x5 corridor-like hall.
fn wide_hall() -> RoomTemplate {
    RoomTemplate {
        layout: grid(&["#####", "#...#", "#####"]),
        local_ref: Pos { y: 1, x: 2 },
        doors: doors(&[(0, 2), (1, 0), (1, 4), (2, 2)]),
    }
}

/// 3x7 hall with two doors per long side, two cells apart. The paired doors
/// let one room attach to two side-by-side neighbours at once, which is what
/// closes a triangle of mutually adjacent rooms.
fn double_hall() -> RoomTemplate {
    RoomTemplate {
        layout: grid(&["#######", "#.....#", "#######"]),
        local_ref: Pos { y: 1, x: 3 },
        doors: doors(&[(0, 2), (0, 4), (2, 2), (2, 4)]),
    }
}

/// L-shaped room; the top-right quarter is void, so part of the perimeter is
/// an inner corner whose walls face open space.
fn l_room() -> RoomTemplate {
    RoomTemplate {
        layout: grid(&["###  ", "#.#  ", "#.###", "#...#", "#####"]),
        local_ref: Pos { y: 2, x: 2 },
        doors: doors(&[(0, 1), (2, 0), (3, 4), (4, 2)]),
    }
}
