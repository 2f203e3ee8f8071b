//! Module for intersecting detector trajectories with the grid
//!
//! For a fixed detector the scattering vector `Q = ki - kf` traces a straight
//! line through (h, k, l) as the final wavevector varies:
//!
//! ```text
//!     (h, k, l)(kf) = qin - qout · kf,    kf_min <= kf <= kf_max
//! ```
//!
//! Every place this line crosses a bin edge of the output grid, plus the two
//! ends of the line, splits it into segments that each sit entirely inside one
//! output cell.

// internal modules
use crate::beam::IncidentBeam;
use crate::cache::DimensionCache;
use crate::frame::FrameTransform;

// fluxnorm modules
use fluxnorm_instrument::DetectorRecord;
use fluxnorm_utils::FloatExt;

// external crates
use nalgebra::Vector3;

/// A point on a trajectory, as (h, k, l) and the final wavevector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Reciprocal lattice coordinate along a*
    pub h: f64,
    /// Reciprocal lattice coordinate along b*
    pub k: f64,
    /// Reciprocal lattice coordinate along c*
    pub l: f64,
    /// Final wavevector magnitude
    pub kf: f64,
}

impl Intersection {
    /// New intersection from (h, k, l) and kf
    pub fn new(hkl: [f64; 3], kf: f64) -> Self {
        Self {
            h: hkl[0],
            k: hkl[1],
            l: hkl[2],
            kf,
        }
    }

    /// The (h, k, l) part of the point
    pub fn hkl(&self) -> [f64; 3] {
        [self.h, self.k, self.l]
    }

    /// Elementwise average of two points
    pub fn midpoint(&self, other: &Intersection) -> Intersection {
        Intersection {
            h: 0.5 * (self.h + other.h),
            k: 0.5 * (self.k + other.k),
            l: 0.5 * (self.l + other.l),
            kf: 0.5 * (self.kf + other.kf),
        }
    }

    /// Check that every coordinate is within `tol` of the other point
    fn approx_eq(&self, other: &Intersection, tol: f64) -> bool {
        self.h.approx_eq(other.h, tol)
            && self.k.approx_eq(other.k, tol)
            && self.l.approx_eq(other.l, tol)
            && self.kf.approx_eq(other.kf, tol)
    }
}

/// Path of one detector through (h, k, l) as the final wavevector varies
///
/// ```rust
/// # use fluxnorm_grid::Extent;
/// # use fluxnorm_instrument::DetectorRecord;
/// # use fluxnorm_norm::{FrameTransform, IncidentBeam, Trajectory};
/// let beam = IncidentBeam::with_constant(4.0, Extent::new(-5.0, 3.0), 1.0).unwrap();
/// let record = DetectorRecord::new(1, 0.0, 0.0);
/// let trajectory = Trajectory::new(&record, &FrameTransform::identity(), &beam);
///
/// // straight through, so only l changes
/// assert_eq!(trajectory.at(beam.kf_min()), [0.0, 0.0, 1.0]);
/// assert_eq!(trajectory.at(beam.kf_max()), [0.0, 0.0, -1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    origin: Vector3<f64>,
    direction: Vector3<f64>,
    kf_min: f64,
    kf_max: f64,
}

impl Trajectory {
    /// Trajectory of a detector for one run
    pub fn new(record: &DetectorRecord, frame: &FrameTransform, beam: &IncidentBeam) -> Self {
        let qin = Vector3::new(0.0, 0.0, beam.ki());
        Self {
            origin: frame.apply(&qin),
            direction: frame.apply(&record.scattering_direction()),
            kf_min: beam.kf_min(),
            kf_max: beam.kf_max(),
        }
    }

    /// The (h, k, l) coordinate at a final wavevector
    #[inline]
    pub fn at(&self, kf: f64) -> [f64; 3] {
        (self.origin - self.direction * kf).into()
    }

    /// Every point where the trajectory crosses the grid, sorted by kf
    ///
    /// Crossings are collected from the h, k and l bin edges and bounds, then
    /// the energy transfer bin edges, then the two ends of the trajectory.
    /// The sort is stable so points with equal kf keep that order, and
    /// consecutive points that coincide to within `tol` are merged.
    ///
    /// An empty list means the trajectory never enters the grid. A single
    /// point means it only touches it.
    pub fn intersections(&self, cache: &DimensionCache, tol: f64) -> Vec<Intersection> {
        let start = self.at(self.kf_min);
        let end = self.at(self.kf_max);
        let mut points = Vec::new();

        for axis in 0..3 {
            self.axis_crossings(axis, &start, &end, cache, tol, &mut points);
        }

        if let Some(edges) = cache.kf_edges() {
            for &kf in edges {
                if kf > self.kf_min && kf < self.kf_max {
                    push_if_inside(self.at(kf), kf, cache, tol, &mut points);
                }
            }
        }

        push_if_inside(start, self.kf_min, cache, tol, &mut points);
        push_if_inside(end, self.kf_max, cache, tol, &mut points);

        points.sort_by(|a, b| a.kf.total_cmp(&b.kf));
        points.dedup_by(|b, a| b.approx_eq(a, tol));
        points
    }

    /// Crossings with the planes of constant coordinate along one axis
    ///
    /// Along a non-degenerate axis both kf and the other two coordinates are
    /// linear in this axis's coordinate, so every plane maps straight to a kf.
    fn axis_crossings(
        &self,
        axis: usize,
        start: &[f64; 3],
        end: &[f64; 3],
        cache: &DimensionCache,
        tol: f64,
        points: &mut Vec<Intersection>,
    ) {
        let bounds = &cache.reciprocal()[axis];
        let (s, e) = (start[axis], end[axis]);

        if (e - s).abs() <= bounds.degeneracy_tolerance {
            return;
        }

        let slope = (self.kf_max - self.kf_min) / (e - s);
        let mut cross = |x: f64, kf: f64| {
            let mut hkl = self.at(kf);
            hkl[axis] = x;
            push_if_inside(hkl, kf, cache, tol, points);
        };

        // interior edges strictly between the two ends
        if let Some(edges) = &bounds.edges {
            for &x in edges {
                if (s - x) * (e - x) < 0.0 {
                    cross(x, self.kf_min + slope * (x - s));
                }
            }
        }

        // bounds only count if crossed strictly inside the kf range
        for x in [bounds.minimum, bounds.maximum] {
            let kf = self.kf_min + slope * (x - s);
            if kf > self.kf_min && kf < self.kf_max {
                cross(x, kf);
            }
        }
    }
}

#[inline]
fn push_if_inside(hkl: [f64; 3], kf: f64, cache: &DimensionCache, tol: f64, points: &mut Vec<Intersection>) {
    if cache.contains(&hkl, tol) {
        points.push(Intersection::new(hkl, kf));
    }
}
