//! The eight resize handles around a selected object.

use glam::DVec2;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Number of resize handles.
pub const HANDLE_COUNT: usize = 8;

/// Corner positions (world y points up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

/// Edge midpoint positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Right,
    Left,
}

/// Type of resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Resizes both axes.
    Corner(Corner),
    /// Resizes one axis.
    Edge(Edge),
}

/// Pointer cursor hint for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorIcon {
    #[default]
    Default,
    Grab,
    NsResize,
    EwResize,
    NeswResize,
    NwseResize,
}

impl CursorIcon {
    pub fn as_css(self) -> &'static str {
        match self {
            CursorIcon::Default => "auto",
            CursorIcon::Grab => "grab",
            CursorIcon::NsResize => "ns-resize",
            CursorIcon::EwResize => "ew-resize",
            CursorIcon::NeswResize => "nesw-resize",
            CursorIcon::NwseResize => "nwse-resize",
        }
    }
}

impl HandleKind {
    /// Handles in index order: four corners, then four edges.
    pub const ALL: [HandleKind; HANDLE_COUNT] = [
        HandleKind::Corner(Corner::TopRight),
        HandleKind::Corner(Corner::TopLeft),
        HandleKind::Corner(Corner::BottomRight),
        HandleKind::Corner(Corner::BottomLeft),
        HandleKind::Edge(Edge::Top),
        HandleKind::Edge(Edge::Bottom),
        HandleKind::Edge(Edge::Right),
        HandleKind::Edge(Edge::Left),
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        // ALL holds every variant exactly once.
        Self::ALL.iter().position(|h| *h == self).unwrap_or(0)
    }

    /// Direction from the center, each component in {-1, 0, 1}.
    pub fn direction(self) -> DVec2 {
        match self {
            HandleKind::Corner(Corner::TopRight) => DVec2::new(1.0, 1.0),
            HandleKind::Corner(Corner::TopLeft) => DVec2::new(-1.0, 1.0),
            HandleKind::Corner(Corner::BottomRight) => DVec2::new(1.0, -1.0),
            HandleKind::Corner(Corner::BottomLeft) => DVec2::new(-1.0, -1.0),
            HandleKind::Edge(Edge::Top) => DVec2::new(0.0, 1.0),
            HandleKind::Edge(Edge::Bottom) => DVec2::new(0.0, -1.0),
            HandleKind::Edge(Edge::Right) => DVec2::new(1.0, 0.0),
            HandleKind::Edge(Edge::Left) => DVec2::new(-1.0, 0.0),
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(self, HandleKind::Corner(_))
    }

    /// Position in the object's local 2x2 unit space.
    pub fn local_position(self) -> Point {
        let d = self.direction();
        Point::new(d.x, d.y)
    }

    pub fn cursor(self) -> CursorIcon {
        let d = self.direction();
        if d.x == 0.0 {
            CursorIcon::NsResize
        } else if d.y == 0.0 {
            CursorIcon::EwResize
        } else if d.x == d.y {
            CursorIcon::NeswResize
        } else {
            CursorIcon::NwseResize
        }
    }
}
