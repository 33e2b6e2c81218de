use super::CornerId;

/// One of the eight points a contour cell can emit: its four lattice
/// corners and the crossing point on each of its four edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl Node {
    /// The state bit of a lattice corner, or `None` for an edge node.
    #[must_use]
    pub fn bit(self) -> Option<u8> {
        match self {
            Self::TopLeft => Some(ContourState::TOP_LEFT),
            Self::TopRight => Some(ContourState::TOP_RIGHT),
            Self::BottomLeft => Some(ContourState::BOTTOM_LEFT),
            Self::BottomRight => Some(ContourState::BOTTOM_RIGHT),
            _ => None,
        }
    }

    /// Whether this node sits on an edge rather than a lattice corner.
    #[must_use]
    pub fn is_edge(self) -> bool {
        self.bit().is_none()
    }
}

/// A side of a cell, also naming the neighbour across it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// The side's endpoints in canonical direction: left to right for
    /// horizontal edges, top to bottom for vertical ones. Both cells sharing
    /// an edge see the same segment, so their crossings agree bit for bit.
    #[must_use]
    pub fn endpoints(self) -> (Node, Node) {
        match self {
            Self::Top => (Node::TopLeft, Node::TopRight),
            Self::Bottom => (Node::BottomLeft, Node::BottomRight),
            Self::Left => (Node::TopLeft, Node::BottomLeft),
            Self::Right => (Node::TopRight, Node::BottomRight),
        }
    }

    /// The side's endpoints walking counter-clockwise around the cell.
    #[must_use]
    pub fn ccw_endpoints(self) -> (Node, Node) {
        match self {
            Self::Left => (Node::TopLeft, Node::BottomLeft),
            Self::Bottom => (Node::BottomLeft, Node::BottomRight),
            Self::Right => (Node::BottomRight, Node::TopRight),
            Self::Top => (Node::TopRight, Node::TopLeft),
        }
    }

    /// The edge node on this side.
    #[must_use]
    pub fn node(self) -> Node {
        match self {
            Self::Top => Node::Top,
            Self::Bottom => Node::Bottom,
            Self::Left => Node::Left,
            Self::Right => Node::Right,
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

/// Emission class of a contour state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    Empty,
    Triangle,
    Trapezoid,
    Pentagon,
    /// Two opposite corners: emitted as two separate corner triangles.
    Saddle,
    Full,
}

use Node::{Bottom as B, BottomLeft as BL, BottomRight as BR, Left as L, Right as R};
use Node::{Top as T, TopLeft as TL, TopRight as TR};

/// Polygons emitted per state, each listed counter-clockwise (seen from +Z)
/// around the ring `TL, L, BL, B, BR, R, TR, T`.
const CONTOUR_TABLE: [&[&[Node]]; 16] = [
    &[],
    &[&[B, BR, R]],
    &[&[L, BL, B]],
    &[&[L, BL, BR, R]],
    &[&[R, TR, T]],
    &[&[B, BR, TR, T]],
    &[&[L, BL, B], &[R, TR, T]],
    &[&[L, BL, BR, TR, T]],
    &[&[TL, L, T]],
    &[&[TL, L, T], &[B, BR, R]],
    &[&[TL, BL, B, T]],
    &[&[TL, BL, BR, R, T]],
    &[&[TL, L, R, TR]],
    &[&[TL, L, B, BR, TR]],
    &[&[TL, BL, B, R, TR]],
    &[&[TL, BL, BR, TR]],
];

/// Four-bit occupancy code `TL*8 + TR*4 + BL*2 + BR*1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContourState(u8);

impl ContourState {
    pub const TOP_LEFT: u8 = 8;
    pub const TOP_RIGHT: u8 = 4;
    pub const BOTTOM_LEFT: u8 = 2;
    pub const BOTTOM_RIGHT: u8 = 1;

    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(15);

    /// Builds a state from its code; bits above the low four are dropped.
    #[must_use]
    pub fn new(code: u8) -> Self {
        Self(code & 0x0f)
    }

    /// Builds a state from per-corner flags in `[TL, TR, BL, BR]` order.
    #[must_use]
    pub fn from_corners(inside: [bool; 4]) -> Self {
        let [tl, tr, bl, br] = inside;
        Self(
            u8::from(tl) * Self::TOP_LEFT
                + u8::from(tr) * Self::TOP_RIGHT
                + u8::from(bl) * Self::BOTTOM_LEFT
                + u8::from(br) * Self::BOTTOM_RIGHT,
        )
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self.0
    }

    /// Whether the lattice corner `node` is inside. Edge nodes are never inside.
    #[must_use]
    pub fn contains(self, node: Node) -> bool {
        node.bit().is_some_and(|bit| self.0 & bit != 0)
    }

    /// States 0 and 15 carry no boundary crossing.
    #[must_use]
    pub fn is_pure(self) -> bool {
        self == Self::EMPTY || self == Self::FULL
    }

    /// Union of two occupancy codes.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Polygons to emit, counter-clockwise.
    #[must_use]
    pub fn polygons(self) -> &'static [&'static [Node]] {
        CONTOUR_TABLE[usize::from(self.0)]
    }

    #[must_use]
    pub fn kind(self) -> ContourKind {
        match self.0 {
            0 => ContourKind::Empty,
            15 => ContourKind::Full,
            6 | 9 => ContourKind::Saddle,
            c => match c.count_ones() {
                1 => ContourKind::Triangle,
                2 => ContourKind::Trapezoid,
                _ => ContourKind::Pentagon,
            },
        }
    }
}

/// Identity of one rasterized shape (a room, or a corridor with its caps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u32);

/// Result of offering a cell to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The cell is reserved and refused the fill.
    Rejected,
    /// No corner of the cell lies inside the shape.
    Untouched,
    /// The cell took the shape's occupancy; boundary detail should be written.
    Detailed,
    /// A second shape overlapped the cell; it is now fully filled with no boundary detail.
    Demoted,
}

/// The finest rasterization unit.
#[derive(Debug, Clone)]
pub struct ContourCell {
    corners: [CornerId; 4],
    edges: [CornerId; 4],
    state: ContourState,
    filled: bool,
    reserved: bool,
    marked: bool,
    overlapped: bool,
    owner: Option<ShapeId>,
}

impl ContourCell {
    /// Assembles a cell from shared lattice corners `[TL, TR, BL, BR]` and
    /// private edge corners `[Top, Bottom, Left, Right]`.
    #[must_use]
    pub fn new(corners: [CornerId; 4], edges: [CornerId; 4]) -> Self {
        Self {
            corners,
            edges,
            state: ContourState::EMPTY,
            filled: false,
            reserved: false,
            marked: false,
            overlapped: false,
            owner: None,
        }
    }

    /// The corner behind `node`.
    #[must_use]
    pub fn node(&self, node: Node) -> CornerId {
        match node {
            Node::TopLeft => self.corners[0],
            Node::TopRight => self.corners[1],
            Node::BottomLeft => self.corners[2],
            Node::BottomRight => self.corners[3],
            Node::Top => self.edges[Side::Top.slot()],
            Node::Bottom => self.edges[Side::Bottom.slot()],
            Node::Left => self.edges[Side::Left.slot()],
            Node::Right => self.edges[Side::Right.slot()],
        }
    }

    /// Lattice corners in `[TL, TR, BL, BR]` order.
    #[must_use]
    pub fn corners(&self) -> [CornerId; 4] {
        self.corners
    }

    /// The private crossing corner on `side`.
    #[must_use]
    pub fn edge(&self, side: Side) -> CornerId {
        self.edges[side.slot()]
    }

    #[must_use]
    pub fn state(&self) -> ContourState {
        self.state
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Whether more than one shape has claimed this cell.
    #[must_use]
    pub fn is_overlapped(&self) -> bool {
        self.overlapped
    }

    #[must_use]
    pub fn owner(&self) -> Option<ShapeId> {
        self.owner
    }

    /// Whether the cell contributes geometry to the mesh.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        self.filled && !self.reserved
    }

    /// Offers the cell to `owner`, whose footprint covers the corners in `inside`.
    ///
    /// Reserved cells refuse every fill. The first shape sets the state; the
    /// same shape coming back widens it; any other shape demotes the cell
    /// to full occupancy. Filling never un-fills.
    pub fn apply(&mut self, inside: ContourState, owner: ShapeId) -> Transition {
        if self.reserved {
            return Transition::Rejected;
        }
        if inside == ContourState::EMPTY {
            return Transition::Untouched;
        }
        match self.owner {
            None => {
                self.filled = true;
                self.state = inside;
                self.owner = Some(owner);
                Transition::Detailed
            }
            Some(current) if current == owner => {
                self.state = self.state.union(inside);
                Transition::Detailed
            }
            Some(_) => {
                self.state = ContourState::FULL;
                self.overlapped = true;
                Transition::Demoted
            }
        }
    }

    /// Excludes the cell from all future fills.
    pub fn reserve(&mut self) {
        self.reserved = true;
    }

    /// Flags the cell for retention across a layer stitch.
    pub fn mark(&mut self) {
        self.marked = true;
    }

    /// Drops occupancy back to empty; reservation and marking are kept.
    pub(crate) fn clear(&mut self) {
        self.state = ContourState::EMPTY;
        self.filled = false;
        self.overlapped = false;
        self.owner = None;
    }
}
