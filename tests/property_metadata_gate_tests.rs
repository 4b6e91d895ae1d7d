use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use chart_svg::ChartRuntime;
use chart_svg::api::{ChartCallbacks, ChartConfig, ChartContext};
use chart_svg::charts::VerticalStackBarChart;
use chart_svg::core::{KeyedRecord, Viewport};
use chart_svg::render::NullRenderer;
use proptest::prelude::*;

const KEYS: [&str; 3] = ["coal", "solar", "wind"];

#[derive(Debug, Clone)]
enum Step {
    Render,
    ToggleDisabled(usize),
    Highlight(usize),
    ClearHighlight,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Render),
        2 => (0..KEYS.len()).prop_map(Step::ToggleDisabled),
        1 => (0..KEYS.len()).prop_map(Step::Highlight),
        1 => Just(Step::ClearHighlight),
    ]
}

fn records() -> Vec<KeyedRecord> {
    vec![
        KeyedRecord::new("2021")
            .with_value("coal", 4.0)
            .with_value("solar", 1.0)
            .with_value("wind", 2.0),
        KeyedRecord::new("2022")
            .with_value("coal", 3.0)
            .with_value("solar", 3.0)
            .with_value("wind", 5.0),
    ]
}

proptest! {
    #[test]
    fn metadata_callback_fires_once_per_distinct_state(steps in prop::collection::vec(step(), 1..40)) {
        let calls = Rc::new(RefCell::new(0usize));
        let seen = Rc::clone(&calls);
        let mut runtime = ChartRuntime::new(
            VerticalStackBarChart::new(records()),
            NullRenderer::default(),
            ChartConfig::new(Viewport::new(640, 360)),
        )
        .expect("runtime")
        .with_callbacks(
            ChartCallbacks::default().on_chart_data_processed(move |_| *seen.borrow_mut() += 1),
        );
        let mut ctx = ChartContext::default();

        // Metadata only depends on which keys are disabled; highlight is
        // drawn but never reported.
        let mut disabled: BTreeSet<&str> = BTreeSet::new();
        let mut last_rendered: Option<BTreeSet<&str>> = None;
        let mut transitions = 0usize;
        for step in &steps {
            match step {
                Step::Render => {
                    let outcome = runtime.render(&mut ctx).expect("render");
                    let changed = last_rendered.as_ref() != Some(&disabled);
                    prop_assert_eq!(outcome.metadata_changed, changed);
                    if changed {
                        transitions += 1;
                        last_rendered = Some(disabled.clone());
                    }
                }
                Step::ToggleDisabled(index) => {
                    let key = KEYS[*index];
                    ctx.toggle_disabled(key);
                    if !disabled.remove(key) {
                        disabled.insert(key);
                    }
                }
                Step::Highlight(index) => {
                    ctx.set_highlight_items([KEYS[*index]]);
                }
                Step::ClearHighlight => {
                    ctx.clear_highlight();
                }
            }
        }

        prop_assert_eq!(*calls.borrow(), transitions);
    }
}
