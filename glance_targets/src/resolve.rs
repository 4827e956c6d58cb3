// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point → target resolution with cardinal tolerance probes.

use kurbo::{Point, Vec2};

/// Default tolerance radius, in the same units as the queried points.
pub const DEFAULT_TOLERANCE: f64 = 50.0;

/// Exact hit test: the selectable target directly under a point, if any.
///
/// Implement this for whatever UI tree you have. [`crate::TargetTree`] is one
/// implementation; [`hit_fn`] adapts a closure.
pub trait HitTest<K> {
    /// Return the target under `point`, or `None` over empty space.
    fn hit_test(&self, point: Point) -> Option<K>;
}

impl<K, T: HitTest<K> + ?Sized> HitTest<K> for &T {
    fn hit_test(&self, point: Point) -> Option<K> {
        (**self).hit_test(point)
    }
}

impl<K, T: HitTest<K> + ?Sized> HitTest<K> for &mut T {
    fn hit_test(&self, point: Point) -> Option<K> {
        (**self).hit_test(point)
    }
}

/// Adapter turning a closure into a [`HitTest`]. Build with [`hit_fn`].
#[derive(Clone, Copy)]
pub struct HitFn<F>(F);

impl<F> core::fmt::Debug for HitFn<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HitFn").finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`HitTest`].
pub fn hit_fn<K, F: Fn(Point) -> Option<K>>(f: F) -> HitFn<F> {
    HitFn(f)
}

impl<K, F: Fn(Point) -> Option<K>> HitTest<K> for HitFn<F> {
    fn hit_test(&self, point: Point) -> Option<K> {
        (self.0)(point)
    }
}

/// Resolves a (possibly noisy) point to a target id.
///
/// This is the seam the dwell pipeline depends on; it never sees the UI tree itself.
pub trait TargetResolver<K> {
    /// Return the best matching target for `point`, or `None`.
    fn resolve(&self, point: Point) -> Option<K>;
}

impl<K, T: TargetResolver<K> + ?Sized> TargetResolver<K> for &T {
    fn resolve(&self, point: Point) -> Option<K> {
        (**self).resolve(point)
    }
}

impl<K, T: TargetResolver<K> + ?Sized> TargetResolver<K> for &mut T {
    fn resolve(&self, point: Point) -> Option<K> {
        (**self).resolve(point)
    }
}

/// Which probe produced a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Probe {
    /// The queried point itself.
    Exact,
    /// `radius` above the point (smaller `y`).
    Up,
    /// `radius` below the point.
    Down,
    /// `radius` left of the point.
    Left,
    /// `radius` right of the point.
    Right,
}

impl Probe {
    /// Probe order. Fixed so results are deterministic when several neighbors qualify.
    pub const ORDER: [Self; 5] = [Self::Exact, Self::Up, Self::Down, Self::Left, Self::Right];

    /// Offset of this probe from the queried point for a given radius.
    pub fn offset(self, radius: f64) -> Vec2 {
        match self {
            Self::Exact => Vec2::ZERO,
            Self::Up => Vec2::new(0.0, -radius),
            Self::Down => Vec2::new(0.0, radius),
            Self::Left => Vec2::new(-radius, 0.0),
            Self::Right => Vec2::new(radius, 0.0),
        }
    }
}

/// Tolerance resolver: exact hit first, then four cardinal probes at `radius`.
///
/// Compensates for gaze jitter and small targets. A radius of zero, a negative
/// radius, or a non-finite radius disables the fallback probes. Non-finite
/// points never resolve.
#[derive(Clone, Debug)]
pub struct Tolerant<H> {
    /// Underlying exact hit test.
    pub inner: H,
    /// Probe distance.
    pub radius: f64,
}

impl<H> Tolerant<H> {
    /// Wrap `inner` with the [`DEFAULT_TOLERANCE`] radius.
    pub fn new(inner: H) -> Self {
        Self::with_radius(inner, DEFAULT_TOLERANCE)
    }

    /// Wrap `inner` with an explicit radius.
    pub fn with_radius(inner: H, radius: f64) -> Self {
        Self { inner, radius }
    }

    /// Unwrap the inner hit test.
    pub fn into_inner(self) -> H {
        self.inner
    }

    /// Resolve `point` and report which probe matched.
    pub fn resolve_probe<K>(&self, point: Point) -> Option<(K, Probe)>
    where
        H: HitTest<K>,
    {
        if !point.is_finite() {
            return None;
        }
        let probes: &[Probe] = if self.radius.is_finite() && self.radius > 0.0 {
            &Probe::ORDER
        } else {
            &Probe::ORDER[..1]
        };
        probes.iter().find_map(|&probe| {
            self.inner
                .hit_test(point + probe.offset(self.radius))
                .map(|target| (target, probe))
        })
    }
}

impl<K, H: HitTest<K>> TargetResolver<K> for Tolerant<H> {
    fn resolve(&self, point: Point) -> Option<K> {
        self.resolve_probe(point).map(|(target, _)| target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    /// Two symbols: "apple" at (100..200, 100..200), "banana" at (300..400, 100..200).
    fn board() -> HitFn<impl Fn(Point) -> Option<&'static str>> {
        hit_fn(|p: Point| {
            if Rect::new(100.0, 100.0, 200.0, 200.0).contains(p) {
                Some("apple")
            } else if Rect::new(300.0, 100.0, 400.0, 200.0).contains(p) {
                Some("banana")
            } else {
                None
            }
        })
    }

    #[test]
    fn exact_hit_wins() {
        let r = Tolerant::new(board());
        assert_eq!(
            r.resolve_probe(Point::new(150.0, 150.0)),
            Some(("apple", Probe::Exact))
        );
    }

    #[test]
    fn tagged_element_within_tolerance_above() {
        let r = Tolerant::new(board());
        // 40 units below apple's bottom edge.
        assert_eq!(
            r.resolve_probe(Point::new(150.0, 240.0)),
            Some(("apple", Probe::Up))
        );
    }

    #[test]
    fn cardinal_probes_cover_each_direction() {
        let r = Tolerant::new(board());
        assert_eq!(
            r.resolve_probe(Point::new(150.0, 60.0)),
            Some(("apple", Probe::Down))
        );
        assert_eq!(
            r.resolve_probe(Point::new(230.0, 150.0)),
            Some(("apple", Probe::Left))
        );
        assert_eq!(
            r.resolve_probe(Point::new(60.0, 150.0)),
            Some(("apple", Probe::Right))
        );
    }

    #[test]
    fn probe_order_is_deterministic() {
        // Halfway between the two symbols both Left and Right qualify; Left is checked first.
        let r = Tolerant::with_radius(board(), 60.0);
        assert_eq!(
            r.resolve_probe(Point::new(250.0, 150.0)),
            Some(("apple", Probe::Left))
        );

        // Up is checked before Left even when both match.
        let r = Tolerant::new(hit_fn(|p: Point| {
            if p.y < 0.0 {
                Some("up")
            } else if p.x < 0.0 {
                Some("left")
            } else {
                None
            }
        }));
        assert_eq!(r.resolve(Point::new(10.0, 10.0)), Some("up"));
    }

    #[test]
    fn nothing_within_tolerance_is_none() {
        let r = Tolerant::new(board());
        assert_eq!(r.resolve(Point::new(250.0, 400.0)), None);
        // Diagonal neighbors are not probed.
        assert_eq!(r.resolve(Point::new(220.0, 220.0)), None);
    }

    #[test]
    fn zero_radius_is_exact_only() {
        let r = Tolerant::with_radius(board(), 0.0);
        assert_eq!(r.resolve(Point::new(150.0, 240.0)), None);
        assert_eq!(r.resolve(Point::new(150.0, 150.0)), Some("apple"));
        let r = Tolerant::with_radius(board(), f64::NAN);
        assert_eq!(r.resolve(Point::new(150.0, 240.0)), None);
    }

    #[test]
    fn non_finite_points_never_resolve() {
        let r = Tolerant::new(hit_fn(|_| Some("everything")));
        assert_eq!(r.resolve(Point::new(f64::NAN, 0.0)), None);
        assert_eq!(r.resolve(Point::new(0.0, f64::INFINITY)), None);
        assert_eq!(r.resolve(Point::new(0.0, 0.0)), Some("everything"));
    }
}
