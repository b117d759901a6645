use crate::error::ChartResult;
use crate::render::{RenderFrame, RenderStats, Renderer};

/// Renderer that validates frames and only counts what it would draw.
#[derive(Debug, Default)]
pub struct NullRenderer {
    last_stats: RenderStats,
}

impl NullRenderer {
    #[must_use]
    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.last_stats = frame.stats();
        Ok(())
    }
}
