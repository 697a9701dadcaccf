#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(x: {}, y: {})", self.x, self.y)
    }
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(width: {}, height: {})", self.width, self.height)
    }
}

impl Size {
    pub const ZERO: Size = Size { width: 0, height: 0 };

    pub fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Axis aligned rectangle, used for host viewports (editor pixels) and
/// overlay fills (panel pixels).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rectangle {
    pub start: Position,
    pub size: Size,
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(x:{}, y:{}, width: {}, height: {})",
            self.start.x, self.start.y, self.size.width, self.size.height
        )
    }
}

impl Rectangle {
    pub fn new(start: Position, size: Size) -> Self {
        Self { start, size }
    }

    pub fn from(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            start: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn left(&self) -> i32 {
        self.start.x
    }

    pub fn right(&self) -> i32 {
        self.start.x + self.size.width
    }

    pub fn top(&self) -> i32 {
        self.start.y
    }

    pub fn bottom(&self) -> i32 {
        self.start.y + self.size.height
    }

    pub fn get_width(&self) -> i32 {
        self.size.width
    }

    pub fn get_height(&self) -> i32 {
        self.size.height
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Intersection with `other`; empty (zero sized) when they do not overlap.
    pub fn intersect(&self, other: &Rectangle) -> Rectangle {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Rectangle::from(left, top, 0, 0);
        }
        Rectangle::from(left, top, right - left, bottom - top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect() {
        let a = Rectangle::from(0, 0, 10, 10);
        let b = Rectangle::from(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Rectangle::from(5, 5, 5, 5));
        assert!(a.intersect(&Rectangle::from(20, 20, 1, 1)).is_empty());
    }
}
