use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{CirclePrimitive, LinePrimitive, RectPrimitive, TextPrimitive};

/// One draw command. Order inside a frame is paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line(LinePrimitive),
    Rect(RectPrimitive),
    Circle(CirclePrimitive),
    Text(TextPrimitive),
}

impl Primitive {
    pub fn validate(&self) -> ChartResult<()> {
        match self {
            Primitive::Line(line) => line.validate(),
            Primitive::Rect(rect) => rect.validate(),
            Primitive::Circle(circle) => circle.validate(),
            Primitive::Text(text) => text.validate(),
        }
    }
}

/// Per-kind primitive counts for the last frame a backend drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub circles_drawn: usize,
    pub texts_drawn: usize,
}

impl RenderStats {
    pub fn record(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Line(_) => self.lines_drawn += 1,
            Primitive::Rect(_) => self.rects_drawn += 1,
            Primitive::Circle(_) => self.circles_drawn += 1,
            Primitive::Text(_) => self.texts_drawn += 1,
        }
    }

    #[must_use]
    pub fn total(self) -> usize {
        self.lines_drawn + self.rects_drawn + self.circles_drawn + self.texts_drawn
    }
}

/// Backend-agnostic scene for one chart draw pass.
///
/// Unlike per-kind buckets, primitives are kept in a single ordered list so
/// translucent bars and lines composite in the order series were added.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub primitives: Vec<Primitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.primitives.push(Primitive::Text(text));
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.primitives.push(Primitive::Rect(rect));
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &LinePrimitive> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Line(line) => Some(line),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = &RectPrimitive> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Rect(rect) => Some(rect),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = &CirclePrimitive> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Circle(circle) => Some(circle),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextPrimitive> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for primitive in &self.primitives {
            primitive.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> RenderStats {
        let mut stats = RenderStats::default();
        for primitive in &self.primitives {
            stats.record(primitive);
        }
        stats
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
