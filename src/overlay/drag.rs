/// Drag and edge-snap geometry for the floating button
///
/// Pure state machine: the DOM controller feeds it pointer coordinates and
/// the button's bounding rectangle and applies the returned placements.
///
/// ```text
/// Idle --press--> Pressed --move past threshold--> Dragging --release--> Snapping --settle--> Idle
///                    \--release (click)--> Idle
/// ```

use crate::record::ButtonPosition;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Element bounding box in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[cfg(test)]
    pub fn is_inside(&self, viewport: Viewport) -> bool {
        self.left >= 0.0 && self.top >= 0.0 && self.right() <= viewport.width && self.bottom() <= viewport.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapEdge {
    Left,
    Right,
}

/// Move `rect` so its top-left is at (left, top) but fully inside the viewport
pub fn clamp_to_viewport(left: f64, top: f64, rect: Rect, viewport: Viewport) -> Rect {
    let max_left = (viewport.width - rect.width).max(0.0);
    let max_top = (viewport.height - rect.height).max(0.0);
    Rect {
        left: left.max(0.0).min(max_left),
        top: top.max(0.0).min(max_top),
        ..rect
    }
}

/// Nearest vertical edge; the left edge only wins when strictly closer
pub fn choose_edge(rect: Rect, viewport: Viewport) -> SnapEdge {
    let to_left = rect.left;
    let to_right = viewport.width - rect.right();
    if to_left < to_right {
        SnapEdge::Left
    } else {
        SnapEdge::Right
    }
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

/// Explicit left/top placement used while dragging
pub fn dragging_position(rect: Rect) -> ButtonPosition {
    ButtonPosition {
        top: px(rect.top),
        left: px(rect.left),
        right: "auto".to_string(),
        bottom: "auto".to_string(),
    }
}

/// Placement against `edge`, keeping the vertical offset reached while dragging
pub fn snapped_position(rect: Rect, edge: SnapEdge) -> ButtonPosition {
    let (left, right) = match edge {
        SnapEdge::Left => (px(0.0), "auto".to_string()),
        SnapEdge::Right => ("auto".to_string(), px(0.0)),
    };
    ButtonPosition {
        top: px(rect.top),
        left,
        right,
        bottom: "auto".to_string(),
    }
}

/// A restored placement whose box lies outside the viewport, moved back
/// inside against the edge it was saved on. `None` when it already fits or
/// the viewport has no size yet.
pub fn fit_to_viewport(position: &ButtonPosition, rect: Rect, viewport: Viewport) -> Option<ButtonPosition> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    let fitted = clamp_to_viewport(rect.left, rect.top, rect, viewport);
    if fitted == rect {
        return None;
    }
    let edge = if position.left != "auto" && position.right == "auto" {
        SnapEdge::Left
    } else {
        SnapEdge::Right
    };
    Some(snapped_position(fitted, edge))
}

/// One press of the button, from pointer-down to release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start_pointer: Point,
    pub start_rect: Rect,
    pub current_rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragPhase {
    Idle,
    Pressed(DragSession),
    Dragging(DragSession),
    Snapping(ButtonPosition),
}

/// What the controller should do in response to an input
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    None,
    /// Apply the placement; `began` is set on the first move of a drag
    Moved { position: ButtonPosition, began: bool },
    /// Released without crossing the threshold
    Click,
    /// Apply the snapped placement and show snap feedback
    Snapped { edge: SnapEdge, position: ButtonPosition },
}

#[derive(Debug, Clone)]
pub struct DragMachine {
    phase: DragPhase,
    threshold: f64,
}

impl DragMachine {
    pub fn new(threshold: f64) -> Self {
        DragMachine {
            phase: DragPhase::Idle,
            threshold: threshold.max(0.0),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// A press or drag is in progress on the element
    pub fn is_active(&self) -> bool {
        matches!(self.phase, DragPhase::Pressed(_) | DragPhase::Dragging(_))
    }

    /// Pointer or touch down on the button. Ignored unless idle.
    pub fn press(&mut self, pointer: Point, rect: Rect) -> bool {
        if !matches!(self.phase, DragPhase::Idle) {
            return false;
        }
        self.phase = DragPhase::Pressed(DragSession {
            start_pointer: pointer,
            start_rect: rect,
            current_rect: rect,
        });
        true
    }

    pub fn motion(&mut self, pointer: Point, viewport: Viewport) -> DragEffect {
        let (mut session, began) = match &self.phase {
            DragPhase::Pressed(session) => {
                if session.start_pointer.distance_to(pointer) <= self.threshold {
                    return DragEffect::None;
                }
                (*session, true)
            }
            DragPhase::Dragging(session) => (*session, false),
            _ => return DragEffect::None,
        };

        let dx = pointer.x - session.start_pointer.x;
        let dy = pointer.y - session.start_pointer.y;
        session.current_rect = clamp_to_viewport(
            session.start_rect.left + dx,
            session.start_rect.top + dy,
            session.start_rect,
            viewport,
        );
        self.phase = DragPhase::Dragging(session);

        DragEffect::Moved {
            position: dragging_position(session.current_rect),
            began,
        }
    }

    /// Pointer or touch up anywhere on the page
    pub fn release(&mut self, viewport: Viewport) -> DragEffect {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Pressed(_) => DragEffect::Click,
            DragPhase::Dragging(session) => {
                let rect = clamp_to_viewport(
                    session.current_rect.left,
                    session.current_rect.top,
                    session.current_rect,
                    viewport,
                );
                let edge = choose_edge(rect, viewport);
                let position = snapped_position(rect, edge);
                self.phase = DragPhase::Snapping(position.clone());
                DragEffect::Snapped { edge, position }
            }
            other => {
                self.phase = other;
                DragEffect::None
            }
        }
    }

    /// Interrupted touch: a press is dropped, a drag still snaps
    pub fn cancel(&mut self, viewport: Viewport) -> DragEffect {
        match self.phase {
            DragPhase::Pressed(_) => {
                self.phase = DragPhase::Idle;
                DragEffect::None
            }
            DragPhase::Dragging(_) => self.release(viewport),
            _ => DragEffect::None,
        }
    }

    /// Snap feedback finished; returns the placement to persist
    pub fn settle(&mut self) -> Option<ButtonPosition> {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Snapping(position) => Some(position),
            other => {
                self.phase = other;
                None
            }
        }
    }
}
