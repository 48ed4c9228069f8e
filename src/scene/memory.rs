//! In-memory scene graph: a flat stack of drawables rasterised on the CPU.

use serde::{Deserialize, Serialize};

use crate::bitmap::buffer::BitmapBuffer;
use crate::effects::catalog::Effect;
use crate::foundation::core::{BlendMode, ObjectId, ObjectKind, Point, Rect, Rgba8};
use crate::foundation::error::{EaselError, EaselResult};
use crate::scene::composite::{composite, composite_in_place};
use crate::scene::graph::{PixelEditable, SceneGraph, SceneObject, SceneObjectInfo};
use crate::scene::snapshot::{SceneSnapshot, base64_bytes};

/// Raster image object: encoded source plus a non-destructive filter chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageSource {
    /// Top-left corner on the canvas, rounded to whole pixels when drawn.
    pub origin: Point,
    /// Encoded (PNG) source bytes.
    #[serde(with = "base64_bytes")]
    pub encoded: Vec<u8>,
    /// Filters run over the decoded source, in order.
    #[serde(default)]
    pub filters: Vec<Effect>,
    #[serde(skip)]
    filtered: Option<BitmapBuffer>,
}

impl ImageSource {
    /// Image at `origin` with no filters.
    pub fn new(origin: Point, encoded: Vec<u8>) -> Self {
        Self {
            origin,
            encoded,
            filters: Vec::new(),
            filtered: None,
        }
    }

    /// Decode and filter. Uses the cached result when the chain has been applied.
    pub fn pixels(&self) -> EaselResult<BitmapBuffer> {
        if let Some(cached) = &self.filtered {
            return Ok(cached.clone());
        }
        run_chain(BitmapBuffer::decode(&self.encoded)?, &self.filters)
    }
}

fn run_chain(mut bitmap: BitmapBuffer, chain: &[Effect]) -> EaselResult<BitmapBuffer> {
    for effect in chain {
        bitmap = effect.apply(&bitmap)?;
    }
    Ok(bitmap)
}

impl PixelEditable for ImageSource {
    fn pixel_source(&self) -> &[u8] {
        &self.encoded
    }

    fn replace_pixel_source(&mut self, encoded: Vec<u8>) -> EaselResult<()> {
        let filtered = run_chain(BitmapBuffer::decode(&encoded)?, &self.filters)?;
        self.encoded = encoded;
        self.filtered = Some(filtered);
        Ok(())
    }

    fn filter_chain(&self) -> &[Effect] {
        &self.filters
    }

    fn set_filter_chain(&mut self, chain: Vec<Effect>) {
        self.filters = chain;
        self.filtered = None;
    }

    fn apply_filter_chain(&mut self) -> EaselResult<()> {
        let filtered = run_chain(BitmapBuffer::decode(&self.encoded)?, &self.filters)?;
        self.filtered = Some(filtered);
        Ok(())
    }
}

/// Anything the in-memory scene can hold.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Drawable {
    /// Axis-aligned filled rectangle.
    Rect {
        /// Bounds in canvas pixels.
        rect: Rect,
        /// Fill colour.
        fill: Rgba8,
    },
    /// Filled ellipse inscribed in `rect`.
    Ellipse {
        /// Bounding box in canvas pixels.
        rect: Rect,
        /// Fill colour.
        fill: Rgba8,
    },
    /// Text run. Stored and serialised; not rasterised.
    Text {
        /// Baseline origin.
        origin: Point,
        /// UTF-8 content.
        content: String,
        /// Font size in pixels.
        size: f64,
        /// Fill colour.
        fill: Rgba8,
    },
    /// Raster image.
    Image(ImageSource),
    /// Nested drawables, flattened onto one layer before compositing.
    Group {
        /// Children, bottom to top.
        children: Vec<Drawable>,
    },
}

impl Drawable {
    /// Kind reported to the layer manager.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Drawable::Rect { .. } | Drawable::Ellipse { .. } => ObjectKind::Shape,
            Drawable::Text { .. } => ObjectKind::Text,
            Drawable::Image(_) => ObjectKind::Image,
            Drawable::Group { .. } => ObjectKind::Group,
        }
    }

    fn draw_into(&self, layer: &mut BitmapBuffer) -> EaselResult<()> {
        match self {
            Drawable::Rect { rect, fill } => {
                fill_where(layer, *rect, *fill, |_, _| true);
            }
            Drawable::Ellipse { rect, fill } => {
                let c = rect.center();
                let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
                if rx > 0.0 && ry > 0.0 {
                    fill_where(layer, *rect, *fill, |px, py| {
                        let dx = (px - c.x) / rx;
                        let dy = (py - c.y) / ry;
                        dx * dx + dy * dy <= 1.0
                    });
                }
            }
            Drawable::Text { .. } => {}
            Drawable::Image(img) => {
                let bitmap = img.pixels()?;
                blit(layer, &bitmap, img.origin);
            }
            Drawable::Group { children } => {
                for child in children {
                    child.draw_into(layer)?;
                }
            }
        }
        Ok(())
    }

    /// Decode and filter every image, nested ones included.
    fn prepare(&mut self) -> EaselResult<()> {
        match self {
            Drawable::Image(img) => img.apply_filter_chain(),
            Drawable::Group { children } => children.iter_mut().try_for_each(Drawable::prepare),
            Drawable::Rect { .. } | Drawable::Ellipse { .. } | Drawable::Text { .. } => Ok(()),
        }
    }

    fn validate(&self) -> EaselResult<()> {
        match self {
            Drawable::Rect { rect, .. } | Drawable::Ellipse { rect, .. } => {
                if !rect.is_finite() {
                    return Err(EaselError::validation("shape bounds must be finite"));
                }
            }
            Drawable::Text { origin, size, .. } => {
                if !origin.is_finite() || !size.is_finite() || *size <= 0.0 {
                    return Err(EaselError::validation("text needs a finite origin and positive size"));
                }
            }
            Drawable::Image(img) => {
                if !img.origin.is_finite() {
                    return Err(EaselError::validation("image origin must be finite"));
                }
            }
            Drawable::Group { children } => {
                for child in children {
                    child.validate()?;
                }
            }
        }
        Ok(())
    }
}

/// Source-over `fill` onto every pixel whose centre lies in `bounds` and passes `inside`.
fn fill_where(layer: &mut BitmapBuffer, bounds: Rect, fill: Rgba8, inside: impl Fn(f64, f64) -> bool) {
    let (w, h) = (layer.width(), layer.height());
    let x0 = bounds.x0.min(bounds.x1).floor().max(0.0) as u32;
    let y0 = bounds.y0.min(bounds.y1).floor().max(0.0) as u32;
    let x1 = (bounds.x0.max(bounds.x1).ceil().max(0.0) as u32).min(w);
    let y1 = (bounds.y0.max(bounds.y1).ceil().max(0.0) as u32).min(h);
    let bounds = bounds.abs();

    let data = layer.pixels_mut();
    for y in y0..y1 {
        let py = f64::from(y) + 0.5;
        for x in x0..x1 {
            let px = f64::from(x) + 0.5;
            if px < bounds.x0 || px >= bounds.x1 || py < bounds.y0 || py >= bounds.y1 {
                continue;
            }
            if !inside(px, py) {
                continue;
            }
            let i = ((y as usize) * (w as usize) + x as usize) * 4;
            let out = composite(
                [data[i], data[i + 1], data[i + 2], data[i + 3]],
                fill.to_array(),
                1.0,
                BlendMode::SourceOver,
            );
            data[i..i + 4].copy_from_slice(&out);
        }
    }
}

fn blit(layer: &mut BitmapBuffer, src: &BitmapBuffer, origin: Point) {
    let ox = origin.x.round() as i64;
    let oy = origin.y.round() as i64;
    let (lw, lh) = (i64::from(layer.width()), i64::from(layer.height()));
    let sw = src.width() as usize;
    let spx = src.pixels();
    let data = layer.pixels_mut();

    for sy in 0..i64::from(src.height()) {
        let y = oy + sy;
        if y < 0 || y >= lh {
            continue;
        }
        for sx in 0..sw as i64 {
            let x = ox + sx;
            if x < 0 || x >= lw {
                continue;
            }
            let s = ((sy as usize) * sw + sx as usize) * 4;
            let d = ((y * lw + x) as usize) * 4;
            let out = composite(
                [data[d], data[d + 1], data[d + 2], data[d + 3]],
                [spx[s], spx[s + 1], spx[s + 2], spx[s + 3]],
                1.0,
                BlendMode::SourceOver,
            );
            data[d..d + 4].copy_from_slice(&out);
        }
    }
}

/// One object on the in-memory scene stack.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    /// Handle issued at insertion.
    pub id: ObjectId,
    /// Optional user-facing name.
    #[serde(default)]
    pub name: Option<String>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Drawn when `true`.
    pub visible: bool,
    /// Composite operation.
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// What is drawn.
    pub drawable: Drawable,
}

impl SceneObject for SceneNode {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn kind(&self) -> ObjectKind {
        self.drawable.kind()
    }

    fn opacity(&self) -> f64 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    fn pixel_editable(&self) -> Option<&dyn PixelEditable> {
        match &self.drawable {
            Drawable::Image(img) => Some(img),
            _ => None,
        }
    }

    fn pixel_editable_mut(&mut self) -> Option<&mut dyn PixelEditable> {
        match &mut self.drawable {
            Drawable::Image(img) => Some(img),
            _ => None,
        }
    }
}

/// A canvas of fixed size holding a bottom-to-top stack of [`SceneNode`]s.
#[derive(Clone, Debug)]
pub struct Scene {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) background: Rgba8,
    pub(crate) nodes: Vec<SceneNode>,
    pub(crate) next_id: u64,
}

impl Scene {
    /// Empty `width x height` canvas with a white background.
    pub fn new(width: u32, height: u32) -> EaselResult<Self> {
        if width == 0 || height == 0 {
            return Err(EaselError::EmptyBuffer);
        }
        Ok(Self {
            width,
            height,
            background: Rgba8::WHITE,
            nodes: Vec::new(),
            next_id: 1,
        })
    }

    /// Replace the background colour.
    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    /// Canvas width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Background colour.
    pub fn background(&self) -> Rgba8 {
        self.background
    }

    /// Insert a named drawable on top of the stack.
    pub fn add_named(&mut self, drawable: Drawable, name: impl Into<String>) -> EaselResult<ObjectId> {
        let id = self.add_object(drawable)?;
        if let Some(node) = self.nodes.last_mut() {
            node.name = Some(name.into());
        }
        Ok(id)
    }

    fn position(&self, id: ObjectId) -> EaselResult<usize> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| EaselError::not_found(format!("scene {id}")))
    }

    pub(crate) fn from_parts(snapshot: SceneSnapshot) -> EaselResult<Self> {
        snapshot.validate()?;
        let mut scene = Self {
            width: snapshot.width,
            height: snapshot.height,
            background: snapshot.background,
            nodes: snapshot.objects,
            next_id: snapshot.next_id,
        };
        // Filter caches are not serialised; rebuild them so a bad image fails here.
        for node in &mut scene.nodes {
            node.drawable.validate()?;
            node.drawable.prepare()?;
        }
        Ok(scene)
    }
}

impl SceneGraph for Scene {
    type Object = SceneNode;
    type Drawable = Drawable;

    fn add_object(&mut self, drawable: Drawable) -> EaselResult<ObjectId> {
        drawable.validate()?;
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.nodes.push(SceneNode {
            id,
            name: None,
            opacity: 1.0,
            visible: true,
            blend_mode: BlendMode::SourceOver,
            drawable,
        });
        Ok(id)
    }

    fn remove_object(&mut self, id: ObjectId) -> EaselResult<()> {
        let pos = self.position(id)?;
        self.nodes.remove(pos);
        Ok(())
    }

    fn objects(&self) -> Vec<SceneObjectInfo> {
        self.nodes
            .iter()
            .map(|n| SceneObjectInfo {
                id: n.id,
                kind: n.drawable.kind(),
                name: n.name.clone(),
            })
            .collect()
    }

    fn object(&self, id: ObjectId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn to_snapshot(&self) -> EaselResult<String> {
        Ok(serde_json::to_string(&SceneSnapshot::of(self))?)
    }

    #[tracing::instrument(skip(self, snapshot), fields(bytes = snapshot.len()))]
    fn restore_from_snapshot(&mut self, snapshot: &str) -> EaselResult<()> {
        let parsed: SceneSnapshot = serde_json::from_str(snapshot)
            .map_err(|e| EaselError::snapshot(format!("malformed scene snapshot: {e}")))?;
        let scene = Self::from_parts(parsed)
            .map_err(|e| EaselError::snapshot(format!("invalid scene snapshot: {e}")))?;
        *self = scene;
        Ok(())
    }

    fn bring_forward(&mut self, id: ObjectId) -> EaselResult<()> {
        let pos = self.position(id)?;
        if pos + 1 < self.nodes.len() {
            self.nodes.swap(pos, pos + 1);
        }
        Ok(())
    }

    fn send_backward(&mut self, id: ObjectId) -> EaselResult<()> {
        let pos = self.position(id)?;
        if pos > 0 {
            self.nodes.swap(pos, pos - 1);
        }
        Ok(())
    }

    fn bring_to_front(&mut self, id: ObjectId) -> EaselResult<()> {
        let pos = self.position(id)?;
        let node = self.nodes.remove(pos);
        self.nodes.push(node);
        Ok(())
    }

    fn send_to_back(&mut self, id: ObjectId) -> EaselResult<()> {
        let pos = self.position(id)?;
        let node = self.nodes.remove(pos);
        self.nodes.insert(0, node);
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(objects = self.nodes.len()))]
    fn render(&self) -> EaselResult<BitmapBuffer> {
        let mut canvas = BitmapBuffer::filled(self.width, self.height, self.background)?;
        for node in self.nodes.iter().filter(|n| n.visible && n.opacity > 0.0) {
            let mut layer = BitmapBuffer::new(self.width, self.height)?;
            node.drawable.draw_into(&mut layer)?;
            composite_in_place(&mut canvas, &layer, node.opacity, node.blend_mode)?;
        }
        Ok(canvas)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/memory.rs"]
mod tests;
