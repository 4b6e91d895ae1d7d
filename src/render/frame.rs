use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::SvgElement;

/// Geometry attributes that must hold finite numbers.
const NUMERIC_ATTRIBUTES: [&str; 11] = [
    "x", "y", "width", "height", "cx", "cy", "r", "x1", "y1", "x2", "y2",
];

/// Attributes that additionally must not be negative.
const NON_NEGATIVE_ATTRIBUTES: [&str; 3] = ["width", "height", "r"];

/// Backend-agnostic scene for one chart draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub root: SvgElement,
}

impl RenderFrame {
    /// Wraps `body` in an `<svg>` root sized to `viewport`.
    #[must_use]
    pub fn new(viewport: Viewport, body: SvgElement) -> Self {
        let root = SvgElement::new("svg")
            .with_attr("xmlns", "http://www.w3.org/2000/svg")
            .with_attr("width", viewport.width)
            .with_attr("height", viewport.height)
            .with_attr(
                "viewBox",
                format!("0 0 {} {}", viewport.width, viewport.height),
            )
            .with_child(body);
        Self { viewport, root }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        validate_element(&self.root)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.root.element_count()
    }

    /// Number of drawable shapes (rect, circle, line, path).
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.root
            .find_all(|element| matches!(element.name.as_str(), "rect" | "circle" | "line" | "path"))
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shape_count() == 0 && self.root.find_all(|e| e.name == "text").is_empty()
    }

    #[must_use]
    pub fn to_svg_string(&self) -> String {
        self.root.to_svg_string()
    }
}

fn validate_element(element: &SvgElement) -> ChartResult<()> {
    if element.name != "svg" {
        for name in NUMERIC_ATTRIBUTES {
            let Some(raw) = element.attr(name) else {
                continue;
            };
            let value: f64 = raw.parse().map_err(|_| {
                ChartError::InvalidData(format!(
                    "<{}> attribute `{name}` is not numeric: `{raw}`",
                    element.name
                ))
            })?;
            if !value.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "<{}> attribute `{name}` must be finite",
                    element.name
                )));
            }
            if NON_NEGATIVE_ATTRIBUTES.contains(&name) && value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "<{}> attribute `{name}` must be >= 0",
                    element.name
                )));
            }
        }
    }
    if element.name == "text" && element.text.as_deref().is_none_or(str::is_empty) {
        return Err(ChartError::InvalidData(
            "text element must not be empty".to_owned(),
        ));
    }

    for child in &element.children {
        validate_element(child)?;
    }
    Ok(())
}
