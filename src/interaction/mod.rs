use serde::{Deserialize, Serialize};

/// The shape under the pointer, identified the way markup tags it
/// (`class` plus `data-label`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitTarget {
    pub label: String,
    pub class: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl HitTarget {
    #[must_use]
    pub fn new(label: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            class: class.into(),
            category: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// `true` when any whitespace-separated class token is in `classes`.
    #[must_use]
    pub fn has_any_class(&self, classes: &[&str]) -> bool {
        self.class
            .split_whitespace()
            .any(|token| classes.contains(&token))
    }
}

/// Pointer input delivered by the host, in viewport pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Enter { target: HitTarget, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    /// Pointer left a shape; `related` is the shape it moved onto, if any.
    Leave { related: Option<HitTarget> },
    /// Pointer left the whole chart container.
    LeaveContainer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HoverMode {
    #[default]
    Idle,
    Hovering,
}

/// Chart-local tooltip state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TooltipState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub label: Option<String>,
    pub category: Option<String>,
}

/// What one pointer event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverOutcome {
    pub highlight_changed: bool,
    pub tooltip_changed: bool,
}

/// Hover state machine shared by every chart:
/// idle -> enter (highlight label, show tooltip) -> move (reposition) -> leave (clear).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverController {
    mode: HoverMode,
    highlighted: Vec<String>,
    tooltip: TooltipState,
}

impl HoverController {
    #[must_use]
    pub fn mode(&self) -> HoverMode {
        self.mode
    }

    #[must_use]
    pub fn highlighted(&self) -> &[String] {
        &self.highlighted
    }

    #[must_use]
    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    #[must_use]
    pub fn hovered_target(&self) -> Option<(&str, Option<&str>)> {
        if self.mode != HoverMode::Hovering {
            return None;
        }
        let label = self.tooltip.label.as_deref()?;
        Some((label, self.tooltip.category.as_deref()))
    }

    /// Applies `event`. `hover_classes` are the classes of shapes that belong
    /// to the same hover group; leaving onto one of them keeps the highlight.
    pub fn handle(&mut self, event: &PointerEvent, hover_classes: &[&str]) -> HoverOutcome {
        match event {
            PointerEvent::Enter { target, x, y } => self.on_enter(target, *x, *y),
            PointerEvent::Move { x, y } => self.on_move(*x, *y),
            PointerEvent::Leave { related } => {
                let stays_in_group = related
                    .as_ref()
                    .is_some_and(|target| target.has_any_class(hover_classes));
                if stays_in_group {
                    HoverOutcome::default()
                } else {
                    self.clear()
                }
            }
            PointerEvent::LeaveContainer => self.clear(),
        }
    }

    fn on_enter(&mut self, target: &HitTarget, x: f64, y: f64) -> HoverOutcome {
        let next = vec![target.label.clone()];
        let highlight_changed = self.highlighted != next;
        self.highlighted = next;
        self.mode = HoverMode::Hovering;

        let tooltip = TooltipState {
            visible: true,
            x,
            y,
            label: Some(target.label.clone()),
            category: target.category.clone(),
        };
        let tooltip_changed = self.tooltip != tooltip;
        self.tooltip = tooltip;

        HoverOutcome {
            highlight_changed,
            tooltip_changed,
        }
    }

    fn on_move(&mut self, x: f64, y: f64) -> HoverOutcome {
        if self.mode != HoverMode::Hovering || !x.is_finite() || !y.is_finite() {
            return HoverOutcome::default();
        }
        let tooltip_changed = self.tooltip.x != x || self.tooltip.y != y;
        self.tooltip.x = x;
        self.tooltip.y = y;
        HoverOutcome {
            highlight_changed: false,
            tooltip_changed,
        }
    }

    /// Returns to idle, dropping highlight and tooltip.
    pub fn clear(&mut self) -> HoverOutcome {
        let highlight_changed = !self.highlighted.is_empty();
        let tooltip_changed = self.tooltip.visible;
        self.highlighted.clear();
        self.tooltip = TooltipState::default();
        self.mode = HoverMode::Idle;
        HoverOutcome {
            highlight_changed,
            tooltip_changed,
        }
    }
}

/// Places a tooltip box next to the pointer, flipped and clamped so it stays
/// inside `bounds` (`width`, `height`).
#[must_use]
pub fn place_tooltip(
    pointer: (f64, f64),
    size: (f64, f64),
    bounds: (f64, f64),
    offset: f64,
) -> (f64, f64) {
    let (px, py) = pointer;
    let (w, h) = size;
    let (max_w, max_h) = bounds;

    let mut x = px + offset;
    if x + w > max_w {
        x = px - offset - w;
    }
    let mut y = py + offset;
    if y + h > max_h {
        y = py - offset - h;
    }
    (
        x.clamp(0.0, (max_w - w).max(0.0)),
        y.clamp(0.0, (max_h - h).max(0.0)),
    )
}
