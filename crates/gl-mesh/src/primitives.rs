//! Geometric value types shared across the mesh and solver.

use gl_core::Real;
use nalgebra::Point3;

/// Mesh axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One of the six face directions of a Cartesian cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    XMinus,
    XPlus,
    YMinus,
    YPlus,
    ZMinus,
    ZPlus,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::XMinus,
        Direction::XPlus,
        Direction::YMinus,
        Direction::YPlus,
        Direction::ZMinus,
        Direction::ZPlus,
    ];

    /// The four lateral directions around a Z-running pipe.
    pub const LATERAL: [Direction; 4] = [
        Direction::XMinus,
        Direction::XPlus,
        Direction::YMinus,
        Direction::YPlus,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::XMinus => Direction::XPlus,
            Direction::XPlus => Direction::XMinus,
            Direction::YMinus => Direction::YPlus,
            Direction::YPlus => Direction::YMinus,
            Direction::ZMinus => Direction::ZPlus,
            Direction::ZPlus => Direction::ZMinus,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::XMinus | Direction::XPlus => Axis::X,
            Direction::YMinus | Direction::YPlus => Axis::Y,
            Direction::ZMinus | Direction::ZPlus => Axis::Z,
        }
    }

    /// Stable index into per-direction arrays.
    pub fn slot(self) -> usize {
        match self {
            Direction::XMinus => 0,
            Direction::XPlus => 1,
            Direction::YMinus => 2,
            Direction::YPlus => 3,
            Direction::ZMinus => 4,
            Direction::ZPlus => 5,
        }
    }
}

/// Axis-aligned rectangle in the XY plane.
///
/// Containment is half-open (`min <= c < min + width`) so adjacent cells
/// never both claim a shared boundary point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x_min: Real,
    pub y_min: Real,
    pub width: Real,
    pub height: Real,
}

impl Rect {
    pub fn contains(&self, x: Real, y: Real) -> bool {
        x >= self.x_min
            && x < self.x_min + self.width
            && y >= self.y_min
            && y < self.y_min + self.height
    }
}

/// Spatial extents of one Cartesian cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellExtents {
    pub x_min: Real,
    pub x_max: Real,
    pub y_min: Real,
    pub y_max: Real,
    pub z_min: Real,
    pub z_max: Real,
}

impl CellExtents {
    pub fn width(&self) -> Real {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> Real {
        self.y_max - self.y_min
    }

    pub fn depth(&self) -> Real {
        self.z_max - self.z_min
    }

    pub fn volume(&self) -> Real {
        self.width() * self.height() * self.depth()
    }

    pub fn centroid(&self) -> Point3<Real> {
        Point3::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
            (self.z_min + self.z_max) / 2.0,
        )
    }

    /// Area of the face normal to the given direction.
    pub fn normal_area(&self, direction: Direction) -> Real {
        match direction.axis() {
            Axis::X => self.height() * self.depth(),
            Axis::Y => self.width() * self.depth(),
            Axis::Z => self.width() * self.height(),
        }
    }

    /// Projection onto the XY plane, used for pipe membership tests.
    pub fn xy_rect(&self) -> Rect {
        Rect {
            x_min: self.x_min,
            y_min: self.y_min,
            width: self.width(),
            height: self.height(),
        }
    }
}
