use super::{Point2, Vector2};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Axis-aligned rectangle in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point2,
    pub max: Point2,
}

impl Rect {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
        )
    }

    #[must_use]
    pub fn contains_x(&self, x: f64) -> bool {
        self.min.x <= x && x <= self.max.x
    }
}

/// Bounding rectangle of a set of loops, or `None` if there are no points.
#[must_use]
pub fn bounding_rect<P: AsRef<[Point2]>>(loops: &[P]) -> Option<Rect> {
    let mut points = loops.iter().flat_map(|l| l.as_ref().iter());
    let first = points.next()?;
    let mut rect = Rect {
        min: *first,
        max: *first,
    };
    for p in points {
        rect.min.x = rect.min.x.min(p.x);
        rect.min.y = rect.min.y.min(p.y);
        rect.max.x = rect.max.x.max(p.x);
        rect.max.y = rect.max.y.max(p.y);
    }
    Some(rect)
}

/// Even-odd containment of `p` in a set of closed loops.
///
/// Casts a horizontal ray to the right and counts edge crossings over all
/// loops; overlapping loops cancel out.
#[must_use]
pub fn point_in_loops<P: AsRef<[Point2]>>(loops: &[P], p: &Point2) -> bool {
    let Some(rect) = bounding_rect(loops) else {
        return false;
    };
    if !rect.contains_x(p.x) {
        return false;
    }
    let mut inside = false;
    for l in loops {
        let l = l.as_ref();
        let n = l.len();
        for i in 0..n {
            let a = l[i];
            let b = l[(i + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if x > p.x {
                    inside = !inside;
                }
            }
        }
    }
    inside
}

/// Average of the vertices (not the area centroid).
#[must_use]
pub fn vertex_centroid(points: &[Point2]) -> Point2 {
    if points.is_empty() {
        return Point2::origin();
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    Point2::from(sum / n)
}

/// Parameter in `[0, 1]` of the projection of `p` onto segment `a-b`.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < super::TOLERANCE {
        return 0.0;
    }
    ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
}

/// Index of the leftmost item (smallest x; first one wins on ties).
#[must_use]
pub fn leftmost_index<T>(items: &[T], position: impl Fn(&T) -> Point2) -> usize {
    let mut best = 0;
    for (i, item) in items.iter().enumerate().skip(1) {
        if position(item).x < position(&items[best]).x {
            best = i;
        }
    }
    best
}

/// Index of the item closest to `target`.
#[must_use]
pub fn closest_index<T>(items: &[T], target: &Point2, position: impl Fn(&T) -> Point2) -> usize {
    let mut best = 0;
    let mut best_dist = f64::MAX;
    for (i, item) in items.iter().enumerate() {
        let d = (position(item) - target).norm_squared();
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}
