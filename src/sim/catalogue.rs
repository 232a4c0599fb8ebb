//! Shape catalogue and per-game shape pool
//!
//! The catalogue expands hand-authored base shapes into named families.
//! A game draws from a `ShapePool`, which a mode assembles from catalogue
//! families and which keeps a dimension index for bounded random draws.

use rand::Rng;

use super::shape::{MirrorMode, Shape, ShapeIdGen, transform};

/// Named group of shapes sharing one base shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeFamily {
    SmallT,
    BigT,
    SmallL,
    MediumL,
    SShape,
    Square,
    /// Second copy of the 2x2 square, weights it up in pools that include it
    Square2,
    BigL,
    CShape,
    BigCShape,
    Stick1,
    Stick2,
    Stick3,
    Stick4,
    Stick5,
    SmallDiagonal,
    BigDiagonal,
    Stair,
    LEdge,
    Rectangle,
    BigSquare,
    ExtremeSquare,
}

impl ShapeFamily {
    pub const ALL: [ShapeFamily; 22] = [
        ShapeFamily::SmallT,
        ShapeFamily::BigT,
        ShapeFamily::SmallL,
        ShapeFamily::MediumL,
        ShapeFamily::SShape,
        ShapeFamily::Square,
        ShapeFamily::Square2,
        ShapeFamily::BigL,
        ShapeFamily::CShape,
        ShapeFamily::BigCShape,
        ShapeFamily::Stick1,
        ShapeFamily::Stick2,
        ShapeFamily::Stick3,
        ShapeFamily::Stick4,
        ShapeFamily::Stick5,
        ShapeFamily::SmallDiagonal,
        ShapeFamily::BigDiagonal,
        ShapeFamily::Stair,
        ShapeFamily::LEdge,
        ShapeFamily::Rectangle,
        ShapeFamily::BigSquare,
        ShapeFamily::ExtremeSquare,
    ];

    /// Families in the standard playable set
    pub const DEFAULT_SET: [ShapeFamily; 15] = [
        ShapeFamily::SmallT,
        ShapeFamily::BigT,
        ShapeFamily::SmallL,
        ShapeFamily::MediumL,
        ShapeFamily::SShape,
        ShapeFamily::Square,
        ShapeFamily::BigL,
        ShapeFamily::CShape,
        ShapeFamily::Stick1,
        ShapeFamily::Stick2,
        ShapeFamily::Stick3,
        ShapeFamily::Stick4,
        ShapeFamily::Stick5,
        ShapeFamily::SmallDiagonal,
        ShapeFamily::BigDiagonal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeFamily::SmallT => "smallT",
            ShapeFamily::BigT => "bigT",
            ShapeFamily::SmallL => "smallL",
            ShapeFamily::MediumL => "mediumL",
            ShapeFamily::SShape => "sShape",
            ShapeFamily::Square => "square",
            ShapeFamily::Square2 => "square2",
            ShapeFamily::BigL => "bigL",
            ShapeFamily::CShape => "cShape",
            ShapeFamily::BigCShape => "bigCShape",
            ShapeFamily::Stick1 => "stick1",
            ShapeFamily::Stick2 => "stick2",
            ShapeFamily::Stick3 => "stick3",
            ShapeFamily::Stick4 => "stick4",
            ShapeFamily::Stick5 => "stick5",
            ShapeFamily::SmallDiagonal => "smallDiagonal",
            ShapeFamily::BigDiagonal => "bigDiagonal",
            ShapeFamily::Stair => "stair",
            ShapeFamily::LEdge => "lEdge",
            ShapeFamily::Rectangle => "rectangle",
            ShapeFamily::BigSquare => "bigSquare",
            ShapeFamily::ExtremeSquare => "extremeSquare",
        }
    }

    /// Base shape, one string per row (`#` = field)
    fn base_rows(&self) -> &'static [&'static str] {
        match self {
            ShapeFamily::SmallT => &["#.", "##", "#."],
            ShapeFamily::BigT => &["#..", "###", "#.."],
            ShapeFamily::SmallL => &["#.", "##"],
            ShapeFamily::MediumL => &["##", "#.", "#."],
            ShapeFamily::SShape => &["#.", "##", ".#"],
            ShapeFamily::Square | ShapeFamily::Square2 => &["##", "##"],
            ShapeFamily::BigL => &["#..", "#..", "###"],
            ShapeFamily::CShape => &["##", "#.", "##"],
            ShapeFamily::BigCShape => &["###", "#..", "###"],
            ShapeFamily::Stick1 => &["#"],
            ShapeFamily::Stick2 => &["#", "#"],
            ShapeFamily::Stick3 => &["#", "#", "#"],
            ShapeFamily::Stick4 => &["#", "#", "#", "#"],
            ShapeFamily::Stick5 => &["#", "#", "#", "#", "#"],
            ShapeFamily::SmallDiagonal => &["#.", ".#"],
            ShapeFamily::BigDiagonal => &["#..", ".#.", "..#"],
            ShapeFamily::Stair => &["#..", "##.", ".##"],
            ShapeFamily::LEdge => &["#..", "...", "#.#"],
            ShapeFamily::Rectangle => &["##", "##", "##"],
            ShapeFamily::BigSquare => &["###", "###", "###"],
            ShapeFamily::ExtremeSquare => &["#####", "#####", "#####", "#####", "#####"],
        }
    }

    /// Quarter-turn steps and mirrors applied to the base shape
    fn expansion(&self) -> (u32, MirrorMode) {
        match self {
            ShapeFamily::SmallT | ShapeFamily::BigT => (1, MirrorMode::Vertical),
            ShapeFamily::MediumL => (3, MirrorMode::Horizontal),
            ShapeFamily::SShape => (1, MirrorMode::Horizontal),
            ShapeFamily::Square | ShapeFamily::Stick1 => (0, MirrorMode::None),
            ShapeFamily::SmallL
            | ShapeFamily::BigL
            | ShapeFamily::CShape
            | ShapeFamily::BigCShape
            | ShapeFamily::Stair
            | ShapeFamily::LEdge => (3, MirrorMode::None),
            ShapeFamily::Square2
            | ShapeFamily::Stick2
            | ShapeFamily::Stick3
            | ShapeFamily::Stick4
            | ShapeFamily::Stick5
            | ShapeFamily::SmallDiagonal
            | ShapeFamily::BigDiagonal
            | ShapeFamily::Rectangle
            | ShapeFamily::BigSquare
            | ShapeFamily::ExtremeSquare => (1, MirrorMode::None),
        }
    }
}

/// Every shape family, fully expanded. Built once and shared by the games
/// of a session.
#[derive(Debug, Clone)]
pub struct Catalogue {
    families: Vec<(ShapeFamily, Vec<Shape>)>,
    ids: ShapeIdGen,
}

impl Catalogue {
    /// Expand all families with a fresh id generator
    pub fn standard() -> Self {
        let mut ids = ShapeIdGen::new();
        let families = ShapeFamily::ALL
            .iter()
            .map(|&family| {
                let base = Shape::from_rows(ids.next_id(), family.base_rows());
                let (rotations, mirror) = family.expansion();
                (family, transform(base, rotations, mirror, &mut ids))
            })
            .collect();
        Self { families, ids }
    }

    /// Variants of one family
    pub fn family(&self, family: ShapeFamily) -> &[Shape] {
        self.families
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, shapes)| shapes.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated variants of several families, in the given order
    pub fn shapes_of(&self, families: &[ShapeFamily]) -> Vec<Shape> {
        families
            .iter()
            .flat_map(|&f| self.family(f).iter().cloned())
            .collect()
    }

    /// The standard playable set
    pub fn default_set(&self) -> Vec<Shape> {
        self.shapes_of(&ShapeFamily::DEFAULT_SET)
    }

    /// Number of shape ids this catalogue allocated
    pub fn ids_allocated(&self) -> u32 {
        self.ids.allocated()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeFamily, &[Shape])> {
        self.families.iter().map(|(f, s)| (*f, s.as_slice()))
    }
}

/// Inclusive dimension bounds for one slot's draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotLimit {
    pub max: f32,
    /// No lower bound when `None`
    pub min: Option<f32>,
}

impl SlotLimit {
    pub const fn at_most(max: f32) -> Self {
        Self { max, min: None }
    }

    pub const fn between(min: f32, max: f32) -> Self {
        Self {
            max,
            min: Some(min),
        }
    }

    pub fn admits(&self, dimension: f32) -> bool {
        dimension <= self.max && self.min.is_none_or(|min| dimension >= min)
    }
}

/// The shapes a game can draw from, indexed by dimension.
///
/// Bucket `k` holds every shape whose dimension is at most `k`; keys are the
/// distinct dimensions present in the pool, ascending.
#[derive(Debug, Clone, Default)]
pub struct ShapePool {
    shapes: Vec<Shape>,
    buckets: Vec<(f32, Vec<usize>)>,
}

impl ShapePool {
    pub fn new(shapes: Vec<Shape>) -> Self {
        let mut pool = Self {
            shapes,
            buckets: Vec::new(),
        };
        pool.reindex();
        pool
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Append shapes and rebuild the index
    pub fn extend(&mut self, shapes: impl IntoIterator<Item = Shape>) {
        self.shapes.extend(shapes);
        self.reindex();
    }

    /// Swap in a different set of shapes and rebuild the index
    pub fn replace(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
        self.reindex();
    }

    /// Rebuild the dimension buckets from the current shapes
    pub fn reindex(&mut self) {
        let mut dimensions: Vec<f32> = self.shapes.iter().map(Shape::dimension).collect();
        dimensions.sort_by(f32::total_cmp);
        dimensions.dedup();

        self.buckets = dimensions
            .into_iter()
            .map(|ceiling| {
                let members = self
                    .shapes
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.dimension() <= ceiling)
                    .map(|(i, _)| i)
                    .collect();
                (ceiling, members)
            })
            .collect();
    }

    /// Distinct dimensions present, ascending
    pub fn dimensions(&self) -> Vec<f32> {
        self.buckets.iter().map(|(d, _)| *d).collect()
    }

    /// Shapes admitted by `limit`: the largest bucket not above `limit.max`,
    /// filtered by the optional floor
    pub fn eligible(&self, limit: SlotLimit) -> Vec<&Shape> {
        let Some((_, members)) = self.buckets.iter().rev().find(|(d, _)| *d <= limit.max) else {
            return Vec::new();
        };
        members
            .iter()
            .map(|&i| &self.shapes[i])
            .filter(|s| limit.admits(s.dimension()))
            .collect()
    }

    /// Uniform draw among the eligible shapes. Falls back to the whole pool
    /// when the limit admits nothing.
    pub fn choose<R: Rng + ?Sized>(&self, limit: SlotLimit, rng: &mut R) -> Option<&Shape> {
        let eligible = self.eligible(limit);
        if eligible.is_empty() {
            if self.shapes.is_empty() {
                return None;
            }
            log::warn!(
                "No shape within dimension {:?}..={}, drawing from the full pool",
                limit.min,
                limit.max
            );
            return Some(&self.shapes[rng.random_range(0..self.shapes.len())]);
        }
        Some(eligible[rng.random_range(0..eligible.len())])
    }

    /// Shape at a fixed position in the pool (wraps around)
    pub fn nth_wrapping(&self, n: usize) -> Option<&Shape> {
        if self.shapes.is_empty() {
            None
        } else {
            self.shapes.get(n % self.shapes.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SHIPPED_DIMENSIONS: [f32; 9] = [2.0, 3.5, 4.0, 5.0, 5.5, 6.0, 6.5, 8.0, 10.0];

    #[test]
    fn test_family_sizes() {
        let catalogue = Catalogue::standard();
        assert_eq!(catalogue.family(ShapeFamily::SmallT).len(), 4);
        assert_eq!(catalogue.family(ShapeFamily::MediumL).len(), 8);
        assert_eq!(catalogue.family(ShapeFamily::SShape).len(), 4);
        assert_eq!(catalogue.family(ShapeFamily::Square).len(), 1);
        assert_eq!(catalogue.family(ShapeFamily::Square2).len(), 2);
        assert_eq!(catalogue.family(ShapeFamily::BigL).len(), 4);
        assert_eq!(catalogue.family(ShapeFamily::Stick1).len(), 1);
        assert_eq!(catalogue.family(ShapeFamily::Stick5).len(), 2);
        assert_eq!(catalogue.family(ShapeFamily::ExtremeSquare).len(), 2);
    }

    #[test]
    fn test_all_shapes_well_formed_with_unique_ids() {
        let catalogue = Catalogue::standard();
        let mut ids = Vec::new();
        for (family, shapes) in catalogue.iter() {
            for shape in shapes {
                assert!(shape.is_well_formed(), "{} {:?}", family.as_str(), shape);
                ids.push(shape.id());
            }
        }
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_dimension_closure() {
        let catalogue = Catalogue::standard();
        for (_, shapes) in catalogue.iter() {
            for shape in shapes {
                assert!(
                    SHIPPED_DIMENSIONS.contains(&shape.dimension()),
                    "unexpected dimension {}",
                    shape.dimension()
                );
            }
        }
    }

    #[test]
    fn test_catalogues_are_deterministic() {
        let a = Catalogue::standard();
        let b = Catalogue::standard();
        assert_eq!(a.default_set(), b.default_set());
        assert_eq!(a.ids_allocated(), b.ids_allocated());
    }

    #[test]
    fn test_buckets_are_cumulative() {
        let pool = ShapePool::new(Catalogue::standard().default_set());
        assert_eq!(pool.dimensions(), vec![2.0, 3.5, 4.0, 5.0, 5.5, 6.0, 6.5, 8.0]);
        let small = pool.eligible(SlotLimit::at_most(3.5));
        assert!(small.iter().all(|s| s.dimension() <= 3.5));
        // stick1 plus both stick2 orientations
        assert_eq!(small.len(), 3);
        assert_eq!(pool.eligible(SlotLimit::at_most(8.0)).len(), pool.len());
    }

    #[test]
    fn test_limit_between_dimensions_uses_lower_bucket() {
        let pool = ShapePool::new(Catalogue::standard().default_set());
        let at_3 = pool.eligible(SlotLimit::at_most(3.0));
        assert_eq!(at_3.len(), 1);
        assert!(pool.eligible(SlotLimit::at_most(1.0)).is_empty());
    }

    #[test]
    fn test_floor_filters_bucket() {
        let pool = ShapePool::new(Catalogue::standard().default_set());
        let band = pool.eligible(SlotLimit::between(5.0, 5.5));
        assert!(!band.is_empty());
        assert!(band.iter().all(|s| (5.0..=5.5).contains(&s.dimension())));
    }

    #[test]
    fn test_extend_reindexes() {
        let catalogue = Catalogue::standard();
        let mut pool = ShapePool::new(catalogue.default_set());
        assert!(!pool.dimensions().contains(&10.0));
        pool.extend(catalogue.family(ShapeFamily::ExtremeSquare).to_vec());
        assert!(pool.dimensions().contains(&10.0));
        assert_eq!(pool.eligible(SlotLimit::between(10.0, 10.0)).len(), 2);
    }

    #[test]
    fn test_choose_falls_back_to_full_pool() {
        let pool = ShapePool::new(Catalogue::standard().default_set());
        let mut rng = Pcg32::seed_from_u64(7);
        let drawn = pool.choose(SlotLimit::at_most(0.5), &mut rng);
        assert!(drawn.is_some());
        assert!(ShapePool::default().choose(SlotLimit::at_most(8.0), &mut rng).is_none());
    }

    #[test]
    fn test_choose_respects_limit() {
        let pool = ShapePool::new(Catalogue::standard().default_set());
        let mut rng = Pcg32::seed_from_u64(42);
        let limit = SlotLimit::between(4.0, 5.5);
        for _ in 0..200 {
            let shape = pool.choose(limit, &mut rng).unwrap();
            assert!(limit.admits(shape.dimension()));
        }
    }
}
