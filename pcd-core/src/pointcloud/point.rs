// LAS data coordinates are stored as scaled integers.
// `las` resolves them on read, as follows
// x = (x * scale[0]) + offset[0]
// and the writer applies the inverse with the same header, so a record that
// is only moved from reader to writer keeps its raw integer coordinates.
pub type PointRecord = las::Point;

/// A bounded batch of records in file order.
pub type Chunk = Vec<PointRecord>;

/// One entry per record of a [`Chunk`]; `true` keeps the record.
pub type KeepMask = Vec<bool>;

/// The planar part of a record. Only this is consulted by the clip decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<&PointRecord> for Position {
    fn from(point: &PointRecord) -> Self {
        Self {
            x: point.x,
            y: point.y,
        }
    }
}

impl From<Position> for geo::Coord<f64> {
    fn from(position: Position) -> Self {
        geo::Coord {
            x: position.x,
            y: position.y,
        }
    }
}
