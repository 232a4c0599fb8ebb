//! Shape geometry
//!
//! Shapes are immutable polyomino values: a bounding box plus the occupied
//! fields inside it. Variants are produced by rotating and mirroring base
//! shapes; every produced variant gets a fresh id from a `ShapeIdGen`.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Stable identity of a generated shape variant
pub type ShapeId = u32;

/// One occupied cell of a shape, relative to the top-left of its bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Field {
    pub x: i32,
    pub y: i32,
}

impl Field {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Board position of this field when the shape's origin sits at `pos`
    #[inline]
    pub fn offset(self, pos: IVec2) -> IVec2 {
        IVec2::new(self.x + pos.x, self.y + pos.y)
    }
}

/// Mirror axis (the center line the shape is reflected across)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Flips `y`
    Horizontal,
    /// Flips `x`
    Vertical,
}

/// Which mirrored copies `transform` adds next to the base shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    /// Both single-axis mirrors, as two separate variants
    Both,
}

impl MirrorMode {
    fn axes(self) -> &'static [Axis] {
        match self {
            MirrorMode::None => &[],
            MirrorMode::Horizontal => &[Axis::Horizontal],
            MirrorMode::Vertical => &[Axis::Vertical],
            MirrorMode::Both => &[Axis::Horizontal, Axis::Vertical],
        }
    }
}

/// Clockwise rotation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotation by `quarters` quarter turns (1..=3)
    fn from_quarters(quarters: u32) -> Option<Self> {
        Self::from_degrees(quarters * 90)
    }
}

/// Hands out shape ids. Each catalogue owns one, so ids are deterministic
/// per catalogue and never leak between instances.
#[derive(Debug, Clone, Default)]
pub struct ShapeIdGen {
    next: ShapeId,
}

impl ShapeIdGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate a new shape ID
    pub fn next_id(&mut self) -> ShapeId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

/// A placeable polyomino
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    id: ShapeId,
    width: i32,
    height: i32,
    fields: Vec<Field>,
}

impl Shape {
    /// Build a shape from its bounding box and fields
    pub fn new(id: ShapeId, width: i32, height: i32, fields: Vec<Field>) -> Self {
        Self {
            id,
            width,
            height,
            fields,
        }
    }

    /// Build a shape from rows of text, `#` marks a field. Rows run along `y`,
    /// characters along `x`. The bounding box is the text's extent.
    pub fn from_rows(id: ShapeId, rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let fields = rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.chars()
                    .enumerate()
                    .filter(|(_, c)| *c == '#')
                    .map(move |(x, _)| Field::new(x as i32, y as i32))
            })
            .collect();
        Self::new(id, width, height, fields)
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of cells this shape occupies
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Difficulty heuristic: `width + height + |width - height| / 2`.
    /// Long thin shapes rate higher than compact ones of similar area.
    pub fn dimension(&self) -> f32 {
        let (w, h) = (self.width as f32, self.height as f32);
        w + h + (w - h).abs() / 2.0
    }

    /// Board positions covered when the shape's origin sits at `pos`
    pub fn cells_at(&self, pos: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        self.fields.iter().map(move |f| f.offset(pos))
    }

    /// Non-empty, fields inside the bounding box, no duplicates
    pub fn is_well_formed(&self) -> bool {
        if self.width <= 0 || self.height <= 0 || self.fields.is_empty() {
            return false;
        }
        let in_bounds = self
            .fields
            .iter()
            .all(|f| (0..self.width).contains(&f.x) && (0..self.height).contains(&f.y));
        in_bounds && self.sorted_fields().windows(2).all(|w| w[0] != w[1])
    }

    /// Same bounding box and field set, ignoring id and field order
    pub fn same_geometry(&self, other: &Shape) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.sorted_fields() == other.sorted_fields()
    }

    fn sorted_fields(&self) -> Vec<Field> {
        let mut fields = self.fields.clone();
        fields.sort();
        fields
    }

    /// Reflect across the horizontal or vertical center line
    pub fn mirror(&self, axis: Axis, ids: &mut ShapeIdGen) -> Shape {
        let fields = self
            .fields
            .iter()
            .map(|f| match axis {
                Axis::Horizontal => Field::new(f.x, self.height - f.y - 1),
                Axis::Vertical => Field::new(self.width - f.x - 1, f.y),
            })
            .collect();
        Shape::new(ids.next_id(), self.width, self.height, fields)
    }

    /// Rotate clockwise. Half and three-quarter turns are built from
    /// repeated quarter turns.
    pub fn rotate(&self, rotation: Rotation, ids: &mut ShapeIdGen) -> Shape {
        let source = match rotation {
            Rotation::Deg90 => return self.quarter_turn(ids.next_id()),
            Rotation::Deg180 => self.rotate(Rotation::Deg90, ids),
            Rotation::Deg270 => self.rotate(Rotation::Deg180, ids),
        };
        source.quarter_turn(ids.next_id())
    }

    fn quarter_turn(&self, id: ShapeId) -> Shape {
        let fields = self
            .fields
            .iter()
            .map(|f| Field::new(self.height - 1 - f.y, f.x))
            .collect();
        Shape::new(id, self.height, self.width, fields)
    }
}

/// Expand a base shape into its playable variants: the base and its
/// requested mirrors, each followed by `rotations` quarter-turn steps
/// (at most three). Identical geometries are kept.
pub fn transform(
    base: Shape,
    rotations: u32,
    mirror: MirrorMode,
    ids: &mut ShapeIdGen,
) -> Vec<Shape> {
    let mut sources = vec![base];
    for &axis in mirror.axes() {
        let mirrored = sources[0].mirror(axis, ids);
        sources.push(mirrored);
    }

    let mut result = sources.clone();
    for source in &sources {
        for quarters in 1..=rotations.min(3) {
            if let Some(rotation) = Rotation::from_quarters(quarters) {
                result.push(source.rotate(rotation, ids));
            }
        }
    }
    result
}
