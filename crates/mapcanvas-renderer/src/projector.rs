//! Projected → device coordinate conversion and antimeridian splitting.
//!
//! Rings are unwrapped relative to their first vertex: any jump wider than
//! half a world is folded back by whole world widths. If the unwrapped ring
//! then leaves the world extent it is cut at the crossed boundary. Part A
//! is the side holding the first vertex; part B is the remainder, shifted
//! back by one world width so both parts land inside the world.
//!
//! Closed rings are clipped per side, so each part is itself a closed ring.
//! Open paths are cut at every crossing; a path that crosses back and forth
//! more than once has its same-side runs joined along the boundary.

use mapcanvas_core::{Coordinate, Point, PointExtent, Size};

/// Converts projected coordinates to device pixels.
pub trait Projection {
    fn projected_to_device(&self, coord: &Coordinate) -> Point;

    /// Converts a size in projected units to pixels.
    fn projected_to_device_size(&self, size: Size) -> Size;

    /// The projected x range of one copy of the world. `None` disables splitting.
    fn world_extent(&self) -> Option<(f64, f64)> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    Closed,
    Open,
}

/// A projected ring: one device-space sequence, or two when it crossed the antimeridian.
#[derive(Debug, Clone, PartialEq)]
pub enum DevicePath {
    Single(Vec<Point>),
    Split([Vec<Point>; 2]),
}

impl DevicePath {
    pub fn is_split(&self) -> bool {
        matches!(self, DevicePath::Split(_))
    }

    pub fn parts(&self) -> Vec<&[Point]> {
        match self {
            DevicePath::Single(points) => vec![points.as_slice()],
            DevicePath::Split([a, b]) => vec![a.as_slice(), b.as_slice()],
        }
    }

    pub fn into_parts(self) -> Vec<Vec<Point>> {
        match self {
            DevicePath::Single(points) => vec![points],
            DevicePath::Split([a, b]) => vec![a, b],
        }
    }

    pub fn point_count(&self) -> usize {
        self.parts().iter().map(|p| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    pub fn extent(&self) -> Option<PointExtent> {
        self.parts()
            .into_iter()
            .filter_map(PointExtent::from_points)
            .reduce(|a, b| a.union(&b))
    }
}

/// The projection collaborator plus the renderer's splitting policy.
#[derive(Clone, Copy)]
pub struct Projector<'a> {
    projection: &'a dyn Projection,
    antimeridian: bool,
}

impl<'a> Projector<'a> {
    pub fn new(projection: &'a dyn Projection, antimeridian: bool) -> Self {
        Self {
            projection,
            antimeridian,
        }
    }

    pub fn point(&self, coord: &Coordinate) -> Point {
        self.projection.projected_to_device(coord)
    }

    pub fn size(&self, size: Size) -> Size {
        self.projection.projected_to_device_size(size)
    }

    pub fn project_ring(&self, coords: &[Coordinate], kind: RingKind) -> DevicePath {
        if self.antimeridian {
            project_ring(self.projection, coords, kind)
        } else {
            DevicePath::Single(to_device(self.projection, coords))
        }
    }
}

impl std::fmt::Debug for Projector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector")
            .field("antimeridian", &self.antimeridian)
            .finish()
    }
}

/// Projects a ring to device space, splitting it if it wraps the antimeridian.
pub fn project_ring(projection: &dyn Projection, coords: &[Coordinate], kind: RingKind) -> DevicePath {
    let Some((min_x, max_x)) = projection.world_extent() else {
        return DevicePath::Single(to_device(projection, coords));
    };
    let world = max_x - min_x;
    if coords.len() < 2 || !(world > 0.0) {
        return DevicePath::Single(to_device(projection, coords));
    }
    if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        log::warn!("Ring of {} vertices has non-finite coordinates, not split", coords.len());
        return DevicePath::Single(to_device(projection, coords));
    }

    let unwrapped = unwrap(coords, world);
    let (boundary, shift, inside_a): (f64, f64, fn(f64, f64) -> bool) =
        if unwrapped.iter().any(|c| c.x > max_x) {
            (max_x, -world, |x, b| x <= b)
        } else if unwrapped.iter().any(|c| c.x < min_x) {
            (min_x, world, |x, b| x >= b)
        } else {
            return DevicePath::Single(to_device(projection, &unwrapped));
        };

    let (part_a, part_b) = match kind {
        RingKind::Closed => (
            clip_closed(&unwrapped, boundary, |x| inside_a(x, boundary)),
            clip_closed(&unwrapped, boundary, |x| !inside_a(x, boundary) || x == boundary),
        ),
        RingKind::Open => cut_open(&unwrapped, boundary, |x| inside_a(x, boundary)),
    };

    if part_a.is_empty() || part_b.is_empty() {
        return DevicePath::Single(to_device(projection, &unwrapped));
    }

    log::debug!(
        "Ring of {} vertices split at x={} into {} + {} vertices",
        coords.len(),
        boundary,
        part_a.len(),
        part_b.len()
    );

    let part_b: Vec<Coordinate> = part_b
        .iter()
        .map(|c| Coordinate::new(c.x + shift, c.y))
        .collect();
    DevicePath::Split([
        to_device(projection, &part_a),
        to_device(projection, &part_b),
    ])
}

fn to_device(projection: &dyn Projection, coords: &[Coordinate]) -> Vec<Point> {
    coords
        .iter()
        .map(|c| projection.projected_to_device(c))
        .collect()
}

/// Makes a ring continuous across the date line, anchored at its first vertex.
fn unwrap(coords: &[Coordinate], world: f64) -> Vec<Coordinate> {
    let half = world / 2.0;
    let mut out = Vec::with_capacity(coords.len());
    let mut prev_x = coords[0].x;
    out.push(coords[0]);
    for c in &coords[1..] {
        let mut x = c.x;
        let jump = x - prev_x;
        if jump.abs() > half {
            x -= world * (jump / world).round();
        }
        out.push(Coordinate::new(x, c.y));
        prev_x = x;
    }
    out
}

fn crossing(p: &Coordinate, q: &Coordinate, boundary: f64) -> Coordinate {
    let t = (boundary - p.x) / (q.x - p.x);
    Coordinate::new(boundary, p.y + t * (q.y - p.y))
}

/// Sutherland–Hodgman clip of a closed ring against the half-plane `inside(x)`.
fn clip_closed(ring: &[Coordinate], boundary: f64, inside: impl Fn(f64) -> bool) -> Vec<Coordinate> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let cur = &ring[i];
        let prev = &ring[(i + n - 1) % n];
        match (inside(prev.x), inside(cur.x)) {
            (true, true) => out.push(*cur),
            (true, false) => out.push(crossing(prev, cur, boundary)),
            (false, true) => {
                out.push(crossing(prev, cur, boundary));
                out.push(*cur);
            }
            (false, false) => {}
        }
    }
    out
}

/// Cuts an open path at each boundary crossing, sharing the crossing point.
fn cut_open(
    path: &[Coordinate],
    boundary: f64,
    inside_a: impl Fn(f64) -> bool,
) -> (Vec<Coordinate>, Vec<Coordinate>) {
    let mut parts: [Vec<Coordinate>; 2] = [Vec::new(), Vec::new()];
    let side_of = |c: &Coordinate| if inside_a(c.x) { 0 } else { 1 };
    let mut side = side_of(&path[0]);
    parts[side].push(path[0]);
    for w in path.windows(2) {
        let next = side_of(&w[1]);
        if next != side {
            let ip = crossing(&w[0], &w[1], boundary);
            parts[side].push(ip);
            parts[next].push(ip);
            side = next;
        }
        parts[side].push(w[1]);
    }
    let [a, b] = parts;
    (a, b)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Plate carrée over a 360x180 canvas: device x = lon + 180, y = 90 - lat.
    pub(crate) struct PlateCarree {
        pub wrap: bool,
    }

    impl Projection for PlateCarree {
        fn projected_to_device(&self, c: &Coordinate) -> Point {
            Point::new(c.x + 180.0, 90.0 - c.y)
        }

        fn projected_to_device_size(&self, size: Size) -> Size {
            size
        }

        fn world_extent(&self) -> Option<(f64, f64)> {
            self.wrap.then_some((-180.0, 180.0))
        }
    }

    fn coords(pts: &[(f64, f64)]) -> Vec<Coordinate> {
        pts.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    #[test]
    fn test_ring_inside_world_is_single() {
        let proj = PlateCarree { wrap: true };
        let ring = coords(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let path = project_ring(&proj, &ring, RingKind::Closed);
        assert_eq!(
            path,
            DevicePath::Single(vec![
                Point::new(180.0, 90.0),
                Point::new(190.0, 90.0),
                Point::new(190.0, 80.0),
            ])
        );
    }

    #[test]
    fn test_closed_ring_split_at_east_boundary() {
        let proj = PlateCarree { wrap: true };
        let ring = coords(&[(170.0, 10.0), (-170.0, 10.0), (-170.0, -10.0), (170.0, -10.0)]);
        let DevicePath::Split([a, b]) = project_ring(&proj, &ring, RingKind::Closed) else {
            panic!("expected split");
        };
        assert_eq!(
            a,
            vec![
                Point::new(350.0, 80.0),
                Point::new(360.0, 80.0),
                Point::new(360.0, 100.0),
                Point::new(350.0, 100.0),
            ]
        );
        assert_eq!(
            b,
            vec![
                Point::new(0.0, 80.0),
                Point::new(10.0, 80.0),
                Point::new(10.0, 100.0),
                Point::new(0.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_closed_ring_split_at_west_boundary() {
        let proj = PlateCarree { wrap: true };
        let ring = coords(&[(-175.0, 0.0), (175.0, 0.0), (175.0, 5.0), (-175.0, 5.0)]);
        let path = project_ring(&proj, &ring, RingKind::Closed);
        let parts = path.parts();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].iter().all(|p| p.x <= 5.0 + 1e-10));
        assert!(parts[1].iter().all(|p| p.x >= 355.0 - 1e-10));
    }

    #[test]
    fn test_open_path_shares_crossing_point() {
        let proj = PlateCarree { wrap: true };
        let line = coords(&[(160.0, 0.0), (-160.0, 20.0)]);
        let DevicePath::Split([a, b]) = project_ring(&proj, &line, RingKind::Open) else {
            panic!("expected split");
        };
        assert_eq!(a, vec![Point::new(340.0, 90.0), Point::new(360.0, 80.0)]);
        assert_eq!(b, vec![Point::new(0.0, 80.0), Point::new(20.0, 70.0)]);
    }

    #[test]
    fn test_no_world_extent_never_splits() {
        let proj = PlateCarree { wrap: false };
        let line = coords(&[(170.0, 0.0), (-170.0, 0.0)]);
        let path = project_ring(&proj, &line, RingKind::Open);
        assert!(!path.is_split());
        assert_eq!(path.point_count(), 2);
    }

    #[test]
    fn test_projector_can_disable_splitting() {
        let proj = PlateCarree { wrap: true };
        let line = coords(&[(170.0, 0.0), (-170.0, 0.0)]);
        assert!(Projector::new(&proj, true)
            .project_ring(&line, RingKind::Open)
            .is_split());
        assert!(!Projector::new(&proj, false)
            .project_ring(&line, RingKind::Open)
            .is_split());
    }

    #[test]
    fn test_non_finite_ring_is_not_split() {
        let proj = PlateCarree { wrap: true };
        let line = coords(&[(0.0, 0.0), (f64::INFINITY, 0.0)]);
        let path = project_ring(&proj, &line, RingKind::Open);
        assert!(!path.is_split());
        assert_eq!(path.point_count(), 2);

        let ring = coords(&[(0.0, 0.0), (f64::NAN, 0.0), (0.0, 1.0)]);
        assert!(!project_ring(&proj, &ring, RingKind::Closed).is_split());
    }

    #[test]
    fn test_far_vertex_folds_in_one_step() {
        let proj = PlateCarree { wrap: true };
        let ring = coords(&[(0.0, 0.0), (3.6e11, 0.0), (0.0, 1.0)]);
        let DevicePath::Single(points) = project_ring(&proj, &ring, RingKind::Closed) else {
            panic!("expected single");
        };
        assert_eq!(points[1], Point::new(180.0, 90.0));

        let line = coords(&[(170.0, 0.0), (-170.0 + 720.0, 0.0)]);
        let DevicePath::Split([a, b]) = project_ring(&proj, &line, RingKind::Open) else {
            panic!("expected split");
        };
        assert_eq!(a.last(), Some(&Point::new(360.0, 90.0)));
        assert_eq!(b, vec![Point::new(0.0, 90.0), Point::new(10.0, 90.0)]);
    }

    #[test]
    fn test_empty_ring() {
        let proj = PlateCarree { wrap: true };
        let path = project_ring(&proj, &[], RingKind::Closed);
        assert!(path.is_empty());
        assert!(path.extent().is_none());
    }
}
