use tracing::trace;

use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// Serializes frames into SVG markup.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    indent: Option<usize>,
    last_svg: Option<String>,
}

impl SvgRenderer {
    /// Renderer producing single-line markup.
    #[must_use]
    pub fn compact() -> Self {
        Self::default()
    }

    /// Renderer producing indented markup, one element per line.
    #[must_use]
    pub fn pretty(indent: usize) -> Self {
        Self {
            indent: Some(indent),
            last_svg: None,
        }
    }

    #[must_use]
    pub fn last_svg(&self) -> Option<&str> {
        self.last_svg.as_deref()
    }

    pub fn take_svg(&mut self) -> Option<String> {
        self.last_svg.take()
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        let mut out = String::with_capacity(frame.element_count() * 64);
        frame.root.write_to(&mut out, self.indent);
        trace!(bytes = out.len(), "serialized svg frame");
        self.last_svg = Some(out);
        Ok(())
    }
}
