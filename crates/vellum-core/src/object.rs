//! Canvas object model: shared base attributes plus a closed set of kinds.

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for canvas objects.
pub type ObjectId = Uuid;

/// Minimum width/height of any object.
pub const MIN_OBJECT_SIZE: f64 = 1.0;

/// Minimum font size after resize scaling.
pub const MIN_FONT_SIZE: f64 = 4.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Normalize an angle in degrees to the range [0, 360).
pub fn normalize_angle(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid(360.0) can return 360.0 for tiny negative inputs.
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Kind-specific data for each object variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Axis-aligned rectangle with optional rounded corners.
    Rect { corner_radius: f64 },
    /// Ellipse inscribed in the bounding box.
    Ellipse,
    /// Container region; dragging a frame carries the objects inside it.
    Frame,
    /// Line segment; the second endpoint is relative to the object origin.
    Line { x2: f64, y2: f64 },
    /// Arrow; the second endpoint is relative to the object origin.
    Arrow { x2: f64, y2: f64 },
    /// Free-form pen stroke; points are relative to the bounding-box origin.
    Path { points: Vec<Point> },
    /// Text block.
    Text { content: String, font_size: f64 },
    /// Group of objects; `children` is the ordered child-id list.
    Group { children: Vec<ObjectId> },
    /// Bitmap reference.
    Image { src: String },
    /// Video reference.
    Video { src: String },
}

impl ObjectKind {
    /// Short lowercase name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Rect { .. } => "rect",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Frame => "frame",
            ObjectKind::Line { .. } => "line",
            ObjectKind::Arrow { .. } => "arrow",
            ObjectKind::Path { .. } => "path",
            ObjectKind::Text { .. } => "text",
            ObjectKind::Group { .. } => "group",
            ObjectKind::Image { .. } => "image",
            ObjectKind::Video { .. } => "video",
        }
    }
}

/// A canvas object: shared base attributes plus kind-specific data.
///
/// `x`/`y` are the top-left corner in parent-relative units (canvas-absolute
/// when `parent_id` is `None`). `rotation` is degrees, normalized to
/// [0, 360) on write. `z_index` is an ordering key whose values are only
/// meaningful relative to each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub z_index: i64,
    pub fill: Option<SerializableColor>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: f64,
    pub parent_id: Option<ObjectId>,
    pub visible: bool,
    pub locked: bool,
    pub name: Option<String>,
    pub kind: ObjectKind,
}

impl CanvasObject {
    /// Create a new object with a fresh id and default styling.
    pub fn new(kind: ObjectKind, origin: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: origin.x,
            y: origin.y,
            width: width.max(MIN_OBJECT_SIZE),
            height: height.max(MIN_OBJECT_SIZE),
            rotation: 0.0,
            opacity: 1.0,
            z_index: 0,
            fill: None,
            stroke: Some(SerializableColor::black()),
            stroke_width: 2.0,
            parent_id: None,
            visible: true,
            locked: false,
            name: None,
            kind,
        }
    }

    /// The object's rectangle in parent-relative coordinates, ignoring rotation.
    pub fn local_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// The object's rectangle anchored at the given absolute origin.
    pub fn rect_at(&self, origin: Point) -> Rect {
        Rect::new(
            origin.x,
            origin.y,
            origin.x + self.width,
            origin.y + self.height,
        )
    }

    /// Set the rotation, normalizing to [0, 360).
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
    }

    /// Whether this object is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ObjectKind::Group { .. })
    }

    /// Whether this object is a frame.
    pub fn is_frame(&self) -> bool {
        matches!(self.kind, ObjectKind::Frame)
    }

    /// The group's child-id list, if this object is a group.
    pub fn children(&self) -> Option<&[ObjectId]> {
        match &self.kind {
            ObjectKind::Group { children } => Some(children),
            _ => None,
        }
    }

    /// Hit-test a canvas point against this object anchored at `origin`
    /// (its absolute top-left). Rotation is handled by rotating the probe
    /// point into the object's local frame.
    pub fn hit_test(&self, origin: Point, point: Point, tolerance: f64) -> bool {
        let rect = self.rect_at(origin);
        let point = if self.rotation != 0.0 {
            unrotate_about(point, rect.center(), self.rotation)
        } else {
            point
        };

        match &self.kind {
            ObjectKind::Line { x2, y2 } | ObjectKind::Arrow { x2, y2 } => {
                let a = origin;
                let b = Point::new(origin.x + x2, origin.y + y2);
                point_to_segment_dist(point, a, b) <= tolerance.max(self.stroke_width)
            }
            ObjectKind::Path { points } => {
                if points.len() < 2 {
                    return rect.inflate(tolerance, tolerance).contains(point);
                }
                let world: Vec<Point> = points
                    .iter()
                    .map(|p| Point::new(origin.x + p.x, origin.y + p.y))
                    .collect();
                point_to_polyline_dist(point, &world) <= tolerance.max(self.stroke_width)
            }
            ObjectKind::Ellipse => {
                let center = rect.center();
                let rx = (self.width / 2.0 + tolerance).max(f64::EPSILON);
                let ry = (self.height / 2.0 + tolerance).max(f64::EPSILON);
                let nx = (point.x - center.x) / rx;
                let ny = (point.y - center.y) / ry;
                nx * nx + ny * ny <= 1.0
            }
            _ => rect.inflate(tolerance, tolerance).contains(point),
        }
    }
}

/// Rotate `point` about `center` by `-degrees`, mapping a canvas-space probe
/// into the object's unrotated frame.
pub fn unrotate_about(point: Point, center: Point, degrees: f64) -> Point {
    rotate_about(point, center, -degrees)
}

/// Rotate `point` about `center` by `degrees`.
pub fn rotate_about(point: Point, center: Point, degrees: f64) -> Point {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Sparse update for an object. Only present fields are applied; kind-specific
/// fields are ignored when the target object is of a different kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Option<SerializableColor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Option<SerializableColor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// `Some(None)` detaches the object from its parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<ObjectId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Line/arrow endpoint, relative to the object origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2: Option<f64>,
    /// Path points, relative to the bounding-box origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ObjectId>>,
}

impl ObjectPatch {
    /// A patch that only moves the object.
    pub fn move_to(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl CanvasObject {
    /// Apply a patch to this object, clamping sizes and normalizing rotation.
    ///
    /// `parent_id` is deliberately not applied here: reparenting must go
    /// through the store so the parent/child links stay consistent and
    /// cycle-free.
    pub(crate) fn apply_patch_fields(&mut self, patch: &ObjectPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(MIN_OBJECT_SIZE);
        }
        if let Some(height) = patch.height {
            self.height = height.max(MIN_OBJECT_SIZE);
        }
        if let Some(rotation) = patch.rotation {
            self.set_rotation(rotation);
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = z_index;
        }
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = stroke;
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.stroke_width = stroke_width.max(0.0);
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(ref name) = patch.name {
            self.name = Some(name.clone());
        }
        match &mut self.kind {
            ObjectKind::Line { x2, y2 } | ObjectKind::Arrow { x2, y2 } => {
                if let Some(nx2) = patch.x2 {
                    *x2 = nx2;
                }
                if let Some(ny2) = patch.y2 {
                    *y2 = ny2;
                }
            }
            ObjectKind::Path { points } => {
                if let Some(ref new_points) = patch.points {
                    *points = new_points.clone();
                }
            }
            ObjectKind::Text { content, font_size } => {
                if let Some(ref new_content) = patch.content {
                    *content = new_content.clone();
                }
                if let Some(new_size) = patch.font_size {
                    *font_size = new_size.max(MIN_FONT_SIZE);
                }
            }
            ObjectKind::Group { children } => {
                if let Some(ref new_children) = patch.children {
                    *children = new_children.clone();
                }
            }
            _ => {}
        }
    }
}
