use std::fmt;

use thiserror::Error;

/// 屏幕坐标点（主显示器左上角为原点）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 任一轴上的位移超过 `threshold` 时返回 true
    pub fn moved_beyond(&self, other: Point, threshold: i32) -> bool {
        let threshold = i64::from(threshold);
        (i64::from(self.x) - i64::from(other.x)).abs() > threshold
            || (i64::from(self.y) - i64::from(other.y)).abs() > threshold
    }
}

/// 屏幕矩形，右/下边界为开区间
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// 由任意两个角点构造规范化矩形（left <= right, top <= bottom）
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// `right - left`，溢出时饱和，符号保持不变
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// 宽高均为正才算有效选区
    pub fn has_area(&self) -> bool {
        self.validate().is_ok()
    }

    /// 宽高均为正（且不溢出 i32）时返回自身，否则返回携带宽高的错误
    pub fn validate(self) -> Result<Rect, InvalidDimensions> {
        match (
            self.right.checked_sub(self.left),
            self.bottom.checked_sub(self.top),
        ) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Ok(self),
            _ => Err(InvalidDimensions {
                width: self.width(),
                height: self.height(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("invalid region dimensions: width={width}, height={height}")]
pub struct InvalidDimensions {
    pub width: i32,
    pub height: i32,
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {}) {}x{}",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}
