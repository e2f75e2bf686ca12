use serde::{Deserialize, Serialize};

/// Smallest allowed QR edge, in percent of the page.
pub const MIN_SIZE_PCT: f32 = 5.0;
/// Full page extent, in percent.
pub const MAX_PCT: f32 = 100.0;

/// A point in page-percentage space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

/// QR placement on a page, every field a percentage of the rendered page's
/// width/height. Valid positions keep the rectangle fully inside the page
/// and at least `MIN_SIZE_PCT` on each edge.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Display-only rotation in degrees. No interaction path sets it yet;
    /// it is carried so stored placements can round-trip a nonzero value.
    #[serde(default)]
    pub rotation: f32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            width: 15.0,
            height: 15.0,
            rotation: 0.0,
        }
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

impl Position {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
        .clamp_to_bounds()
    }

    /// Forces the rectangle into a valid state: edges at least `MIN_SIZE_PCT`,
    /// at most the full page, and the whole rectangle inside `[0, 100]` on
    /// both axes. Non-finite intermediates are discarded rather than
    /// propagated.
    #[must_use]
    pub fn clamp_to_bounds(self) -> Self {
        let width = finite_or(self.width, MIN_SIZE_PCT).clamp(MIN_SIZE_PCT, MAX_PCT);
        let height = finite_or(self.height, MIN_SIZE_PCT).clamp(MIN_SIZE_PCT, MAX_PCT);
        let x = finite_or(self.x, 0.0).clamp(0.0, MAX_PCT - width);
        let y = finite_or(self.y, 0.0).clamp(0.0, MAX_PCT - height);
        Self {
            x,
            y,
            width,
            height,
            rotation: finite_or(self.rotation, 0.0),
        }
    }

    /// Moves the rectangle without changing its size. Each axis clamps
    /// independently so sliding along one page edge still works.
    #[must_use]
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        let mut p = self;
        p.x = finite_or(p.x + dx, p.x).clamp(0.0, MAX_PCT - p.width);
        p.y = finite_or(p.y + dy, p.y).clamp(0.0, MAX_PCT - p.height);
        p
    }

    /// Drags one corner by `(dx, dy)` percent. The opposite corner stays
    /// fixed except where clamping intervenes. With `lock_aspect` the height
    /// follows the width; for the `ne` corner the top edge is re-derived so
    /// the bottom edge stays anchored.
    #[must_use]
    pub fn resize(self, corner: Corner, dx: f32, dy: f32, lock_aspect: bool) -> Self {
        let mut p = self;
        match corner {
            Corner::Se => {
                p.width += dx;
                p.height = if lock_aspect { p.width } else { p.height + dy };
            }
            Corner::Sw => {
                p.x += dx;
                p.width -= dx;
                p.height = if lock_aspect { p.width } else { p.height + dy };
            }
            Corner::Ne => {
                p.width += dx;
                if lock_aspect {
                    let bottom = self.y + self.height;
                    p.height = p.width;
                    p.y = bottom - p.height;
                } else {
                    p.y += dy;
                    p.height -= dy;
                }
            }
            Corner::Nw => {
                p.x += dx;
                p.y += dy;
                p.width -= dx;
                p.height = if lock_aspect { p.width } else { p.height - dy };
            }
        }
        p.clamp_to_bounds()
    }

    /// Keyboard move by `step` percent in one direction.
    #[must_use]
    pub fn nudge(self, direction: NudgeDirection, step: f32) -> Self {
        let p = match direction {
            NudgeDirection::Left => self.translate(-step, 0.0),
            NudgeDirection::Right => self.translate(step, 0.0),
            NudgeDirection::Up => self.translate(0.0, -step),
            NudgeDirection::Down => self.translate(0.0, step),
        };
        p.clamp_to_bounds()
    }

    /// Keyboard grow/shrink by `delta` percent on both edges, anchored at the
    /// top-left corner. With `lock_aspect` the result stays square.
    #[must_use]
    pub fn grow(self, delta: f32, lock_aspect: bool) -> Self {
        let mut p = self;
        p.width += delta;
        p.height = if lock_aspect { p.width } else { p.height + delta };
        p.clamp_to_bounds()
    }

    pub fn is_valid(self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= MIN_SIZE_PCT
            && self.height >= MIN_SIZE_PCT
            && self.x + self.width <= MAX_PCT
            && self.y + self.height <= MAX_PCT
    }

    pub fn rotation_radians(self) -> f32 {
        self.rotation.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pos(x: f32, y: f32, w: f32, h: f32) -> Position {
        Position {
            x,
            y,
            width: w,
            height: h,
            rotation: 0.0,
        }
    }

    #[test]
    fn clamp_enforces_min_size_and_page_bounds() {
        let p = pos(95.0, 95.0, 2.0, 300.0).clamp_to_bounds();
        assert!(p.is_valid());
        assert_eq!(p.width, MIN_SIZE_PCT);
        assert_eq!(p.height, MAX_PCT);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.x, 95.0);
    }

    #[test]
    fn clamp_discards_non_finite_input() {
        let p = Position {
            x: f32::NAN,
            y: f32::INFINITY,
            width: f32::NAN,
            height: -10.0,
            rotation: f32::NAN,
        }
        .clamp_to_bounds();
        assert!(p.is_valid());
        assert_eq!(p.rotation, 0.0);
    }

    #[test]
    fn translate_clamps_each_axis_independently() {
        let p = pos(10.0, 10.0, 20.0, 20.0).translate(200.0, -200.0);
        assert_eq!(p.x, 80.0);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.width, 20.0);
        assert_eq!(p.height, 20.0);
    }

    #[test]
    fn nw_corner_outward_keeps_opposite_corner_fixed() {
        let p = pos(20.0, 20.0, 20.0, 20.0).resize(Corner::Nw, -5.0, -5.0, false);
        assert_eq!(p, pos(15.0, 15.0, 25.0, 25.0));
        assert_eq!(p.x + p.width, 40.0);
        assert_eq!(p.y + p.height, 40.0);
    }

    #[test]
    fn se_corner_with_aspect_lock_grows_square() {
        let p = pos(50.0, 50.0, 15.0, 15.0).resize(Corner::Se, 10.0, 10.0, true);
        assert_eq!(p, pos(50.0, 50.0, 25.0, 25.0));
    }

    #[test]
    fn ne_corner_with_aspect_lock_keeps_bottom_edge_anchored() {
        let start = pos(20.0, 40.0, 10.0, 10.0);
        let p = start.resize(Corner::Ne, 5.0, -3.0, true);
        assert_eq!(p.width, p.height);
        assert_eq!(p.width, 15.0);
        assert_eq!(p.y + p.height, start.y + start.height);
    }

    #[test]
    fn sw_corner_moves_left_edge() {
        let p = pos(20.0, 20.0, 20.0, 20.0).resize(Corner::Sw, -5.0, 5.0, false);
        assert_eq!(p, pos(15.0, 20.0, 25.0, 25.0));
    }

    #[test]
    fn resize_never_collapses_below_min() {
        let p = pos(20.0, 20.0, 10.0, 10.0).resize(Corner::Se, -50.0, -50.0, false);
        assert!(p.is_valid());
        assert_eq!(p.width, MIN_SIZE_PCT);
        assert_eq!(p.height, MIN_SIZE_PCT);
    }

    #[test]
    fn grow_respects_aspect_lock_and_min() {
        let p = pos(10.0, 10.0, 8.0, 12.0).grow(1.0, true);
        assert_eq!(p.width, p.height);
        let q = pos(10.0, 10.0, 5.0, 5.0).grow(-1.0, false);
        assert_eq!(q.width, MIN_SIZE_PCT);
        assert_eq!(q.height, MIN_SIZE_PCT);
    }

    #[derive(Clone, Copy, Debug)]
    enum Op {
        Translate(f32, f32),
        Resize(Corner, f32, f32, bool),
        Nudge(NudgeDirection, f32),
        Grow(f32, bool),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let delta = -150.0f32..150.0f32;
        let corner = prop_oneof![
            Just(Corner::Nw),
            Just(Corner::Ne),
            Just(Corner::Sw),
            Just(Corner::Se),
        ];
        let dir = prop_oneof![
            Just(NudgeDirection::Left),
            Just(NudgeDirection::Right),
            Just(NudgeDirection::Up),
            Just(NudgeDirection::Down),
        ];
        prop_oneof![
            (delta.clone(), delta.clone()).prop_map(|(dx, dy)| Op::Translate(dx, dy)),
            (corner, delta.clone(), delta.clone(), any::<bool>())
                .prop_map(|(c, dx, dy, l)| Op::Resize(c, dx, dy, l)),
            (dir, prop_oneof![Just(1.0f32), Just(5.0f32)]).prop_map(|(d, s)| Op::Nudge(d, s)),
            (-3.0f32..3.0f32, any::<bool>()).prop_map(|(d, l)| Op::Grow(d, l)),
        ]
    }

    proptest! {
        #[test]
        fn bounds_invariant_holds_under_any_op_sequence(
            x in 0.0f32..80.0,
            y in 0.0f32..80.0,
            ops in proptest::collection::vec(op_strategy(), 1..40),
        ) {
            let mut p = pos(x, y, 15.0, 15.0).clamp_to_bounds();
            for op in ops {
                p = match op {
                    Op::Translate(dx, dy) => p.translate(dx, dy),
                    Op::Resize(c, dx, dy, l) => p.resize(c, dx, dy, l),
                    Op::Nudge(d, s) => p.nudge(d, s),
                    Op::Grow(d, l) => p.grow(d, l),
                };
                prop_assert!(p.is_valid(), "invalid position {:?} after {:?}", p, op);
            }
        }

        #[test]
        fn aspect_lock_always_yields_square(
            dx in -60.0f32..60.0,
            dy in -60.0f32..60.0,
        ) {
            for corner in [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se] {
                let p = pos(30.0, 30.0, 20.0, 20.0).resize(corner, dx, dy, true);
                prop_assert_eq!(p.width, p.height);
                prop_assert!(p.is_valid());
            }
        }
    }
}
