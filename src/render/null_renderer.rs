use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless usage.
///
/// It still validates frame content so tests can catch invalid geometry
/// without serializing SVG.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub render_count: usize,
    pub last_element_count: usize,
    pub last_shape_count: usize,
    pub last_frame: Option<RenderFrame>,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.render_count += 1;
        self.last_element_count = frame.element_count();
        self.last_shape_count = frame.shape_count();
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
