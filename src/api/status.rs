use crate::core::Viewport;
use crate::render::SvgElement;

/// How a chart decides that it has nothing to show.
pub enum NoDataRule<D> {
    /// The dataset is empty.
    Auto,
    /// Host decides explicitly.
    Flag(bool),
    Predicate(Box<dyn Fn(&D) -> bool>),
}

impl<D> Default for NoDataRule<D> {
    fn default() -> Self {
        Self::Auto
    }
}

impl<D> std::fmt::Debug for NoDataRule<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<D> NoDataRule<D> {
    #[must_use]
    pub fn predicate(predicate: impl Fn(&D) -> bool + 'static) -> Self {
        Self::Predicate(Box::new(predicate))
    }

    #[must_use]
    pub fn is_no_data(&self, dataset: &D, is_empty: bool) -> bool {
        match self {
            Self::Auto => is_empty,
            Self::Flag(flag) => *flag,
            Self::Predicate(predicate) => predicate(dataset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStatus {
    Loading,
    NoData,
    Ready,
}

/// Loading/no-data flags plus optional override components.
#[derive(Debug)]
pub struct StatusSlots<D> {
    pub is_loading: bool,
    pub loading_component: Option<SvgElement>,
    pub no_data: NoDataRule<D>,
    pub no_data_component: Option<SvgElement>,
}

impl<D> Default for StatusSlots<D> {
    fn default() -> Self {
        Self {
            is_loading: false,
            loading_component: None,
            no_data: NoDataRule::Auto,
            no_data_component: None,
        }
    }
}

impl<D> StatusSlots<D> {
    #[must_use]
    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    #[must_use]
    pub fn with_loading_component(mut self, component: SvgElement) -> Self {
        self.loading_component = Some(component);
        self
    }

    #[must_use]
    pub fn with_no_data(mut self, rule: NoDataRule<D>) -> Self {
        self.no_data = rule;
        self
    }

    #[must_use]
    pub fn with_no_data_component(mut self, component: SvgElement) -> Self {
        self.no_data_component = Some(component);
        self
    }

    /// Element drawn instead of the chart body, `None` when ready.
    #[must_use]
    pub fn placeholder(&self, status: ChartStatus, viewport: Viewport) -> Option<SvgElement> {
        match status {
            ChartStatus::Loading => Some(
                self.loading_component
                    .clone()
                    .unwrap_or_else(|| default_loading_component(viewport)),
            ),
            ChartStatus::NoData => Some(
                self.no_data_component
                    .clone()
                    .unwrap_or_else(|| default_no_data_component(viewport)),
            ),
            ChartStatus::Ready => None,
        }
    }
}

/// Loading wins over no-data; no-data wins over the chart body.
#[must_use]
pub fn resolve_status<D>(slots: &StatusSlots<D>, dataset: &D, is_empty: bool) -> ChartStatus {
    if slots.is_loading {
        ChartStatus::Loading
    } else if slots.no_data.is_no_data(dataset, is_empty) {
        ChartStatus::NoData
    } else {
        ChartStatus::Ready
    }
}

const SPINNER_RADIUS: f64 = 16.0;
const SPIN_KEYFRAMES: &str =
    "@keyframes spin { from { transform: rotate(0deg); } to { transform: rotate(360deg); } }";

/// Rotating arc centered in the viewport.
#[must_use]
pub fn default_loading_component(viewport: Viewport) -> SvgElement {
    let cx = f64::from(viewport.width) * 0.5;
    let cy = f64::from(viewport.height) * 0.5;
    let r = SPINNER_RADIUS;
    let arc = format!("M{cx},{} A{r},{r} 0 0 1 {},{cy}", cy - r, cx + r);

    SvgElement::group()
        .with_class("chart-loading")
        .with_child(SvgElement::new("style").with_text(SPIN_KEYFRAMES))
        .with_child(
            SvgElement::circle(cx, cy, r)
                .with_class("chart-loading-track")
                .with_attr("fill", "none")
                .with_attr("stroke", "#e0e0e0")
                .with_attr("stroke-width", 4),
        )
        .with_child(
            SvgElement::path(arc)
                .with_class("chart-loading-arc")
                .with_attr("fill", "none")
                .with_attr("stroke", "#555555")
                .with_attr("stroke-width", 4)
                .with_attr(
                    "style",
                    format!(
                        "animation: spin 1s linear infinite; transform-origin: {cx}px {cy}px"
                    ),
                ),
        )
}

#[must_use]
pub fn default_no_data_component(viewport: Viewport) -> SvgElement {
    SvgElement::text_at(
        f64::from(viewport.width) * 0.5,
        f64::from(viewport.height) * 0.5,
        "No data",
    )
    .with_class("chart-no-data")
    .with_attr("text-anchor", "middle")
    .with_attr("dominant-baseline", "middle")
    .with_attr("fill", "#888888")
}

#[cfg(test)]
mod tests {
    use super::{ChartStatus, NoDataRule, StatusSlots, resolve_status};

    #[test]
    fn loading_suppresses_no_data() {
        let slots = StatusSlots::<Vec<u8>>::default().loading(true);
        assert_eq!(resolve_status(&slots, &Vec::new(), true), ChartStatus::Loading);
    }

    #[test]
    fn predicate_overrides_emptiness() {
        let slots = StatusSlots::<Vec<u8>>::default()
            .with_no_data(NoDataRule::predicate(|data: &Vec<u8>| data.iter().all(|v| *v == 0)));
        assert_eq!(resolve_status(&slots, &vec![0, 0], false), ChartStatus::NoData);
        assert_eq!(resolve_status(&slots, &vec![1], false), ChartStatus::Ready);
    }

    #[test]
    fn explicit_flag_wins_over_dataset() {
        let slots = StatusSlots::<Vec<u8>>::default().with_no_data(NoDataRule::Flag(false));
        assert_eq!(resolve_status(&slots, &Vec::new(), true), ChartStatus::Ready);
    }
}
