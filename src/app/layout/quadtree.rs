use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;

#[derive(Clone, Copy)]
struct QuadBounds {
    center: Vec2,
    half_extent: f32,
}

impl QuadBounds {
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let span = (max - min).max(vec2(1.0, 1.0));
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span.x.max(span.y) * 0.5 + 1.0,
        })
    }

    fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };
        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) + 2 * usize::from(point.y >= self.center.y)
    }
}

/// Repulsion between the force layout's nodes, exact inside a leaf and
/// approximated by a cell's center of mass once the cell looks small from
/// the point being pushed.
pub(super) struct RepulsionTree {
    bounds: QuadBounds,
    center_of_mass: Vec2,
    mass: f32,
    indices: Vec<usize>,
    children: [Option<Box<RepulsionTree>>; 4],
}

#[derive(Clone, Copy)]
pub(super) struct Repulsion<'a> {
    pub k_sq: f32,
    pub theta: f32,
    pub radii: &'a [f32],
}

impl Repulsion<'_> {
    fn pair(self, positions: &[Vec2], index: usize, other: usize) -> Vec2 {
        let delta = positions[index] - positions[other];
        let distance = delta.length().max(0.5);
        let direction = if delta.length() > 0.0 {
            delta / distance
        } else if index < other {
            vec2(-1.0, 0.0)
        } else {
            vec2(1.0, 0.0)
        };

        let min_distance = (self.radii[index] + self.radii[other]) * 2.6;
        let mut force = self.k_sq / distance;
        if distance < min_distance {
            force += (min_distance - distance) * 2.0;
        }
        direction * force
    }
}

impl RepulsionTree {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        Some(Self::build_node(bounds, (0..positions.len()).collect(), positions, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        depth: usize,
    ) -> Self {
        let mass = indices.len() as f32;
        let center_of_mass = if indices.is_empty() {
            bounds.center
        } else {
            indices.iter().fold(Vec2::ZERO, |sum, index| sum + positions[*index]) / mass
        };

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };
        if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_for(positions[index])].push(index);
        }
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                node.children[quadrant] = Some(Box::new(Self::build_node(
                    bounds.child(quadrant),
                    bucket,
                    positions,
                    depth + 1,
                )));
            }
        }
        node.indices.clear();
        node
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn force_on(
        &self,
        index: usize,
        positions: &[Vec2],
        params: Repulsion<'_>,
    ) -> Vec2 {
        if self.mass <= 0.0 {
            return Vec2::ZERO;
        }

        if self.is_leaf() {
            return self
                .indices
                .iter()
                .filter(|other| **other != index)
                .fold(Vec2::ZERO, |sum, other| {
                    sum + params.pair(positions, index, *other)
                });
        }

        let point = positions[index];
        let delta = point - self.center_of_mass;
        let distance = delta.length().max(0.01);
        let far = !self.bounds.contains(point)
            && (self.bounds.half_extent * 2.0 / distance) < params.theta
            && self.mass > 1.0;
        if far {
            return delta / distance * (params.k_sq * self.mass / distance);
        }

        self.children
            .iter()
            .flatten()
            .fold(Vec2::ZERO, |sum, child| {
                sum + child.force_on(index, positions, params)
            })
    }
}
