//! Integer pixel geometry

/// A pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A pixel extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// An axis-aligned rectangle; `w`/`h` may be zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Translate a window point into this rectangle's local coordinates
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.x, p.y - self.y)
    }

    /// Translate a local point back into window coordinates
    pub fn to_global(&self, p: Point) -> Point {
        Point::new(p.x + self.x, p.y + self.y)
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Shrink by the same margin on every side
    pub fn inset(&self, margin: i32) -> Rect {
        Rect::new(
            self.x + margin,
            self.y + margin,
            (self.w - 2 * margin).max(0),
            (self.h - 2 * margin).max(0),
        )
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        Rect::new(x, y, (r - x).max(0), (b - y).max(0))
    }
}

/// Round `value` down to a multiple of `step`
pub fn floor_to(value: i32, step: i32) -> i32 {
    if step <= 0 {
        return value;
    }
    value.div_euclid(step) * step
}

/// Round `value` up to a multiple of `step`
pub fn ceil_to(value: i32, step: i32) -> i32 {
    if step <= 0 {
        return value;
    }
    let floored = floor_to(value, step);
    if floored == value {
        value
    } else {
        floored + step
    }
}

/// Whether `y` falls inside the row that starts at `top` and is `height` tall
pub fn y_within(y: i32, top: i32, height: i32) -> bool {
    y >= top && y < top + height
}
