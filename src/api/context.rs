use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Color, ColorMapping};
use crate::error::{ChartError, ChartResult};

/// Descriptive metadata attached to a category label by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategoryMetadata {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

/// Initial provider state; every field is optional with empty defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContextProps {
    #[serde(default)]
    pub colors_mapping: ColorMapping,
    #[serde(default)]
    pub colors_based_mapping: ColorMapping,
    #[serde(default)]
    pub highlight_items: Vec<String>,
    #[serde(default)]
    pub disabled_items: Vec<String>,
    #[serde(default)]
    pub visible_items: Vec<String>,
    #[serde(default)]
    pub category_metadata: IndexMap<String, CategoryMetadata>,
}

impl ContextProps {
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::Serialization(format!("failed to parse context props: {e}")))
    }
}

/// Cross-chart UI state shared by every chart rendered under one provider.
///
/// Mutation goes through `&mut self`, so one writer at a time is enforced by
/// the borrow checker; every effective change bumps `revision`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartContext {
    colors_mapping: ColorMapping,
    colors_based_mapping: ColorMapping,
    highlight_items: IndexSet<String>,
    disabled_items: IndexSet<String>,
    visible_items: IndexSet<String>,
    category_metadata: IndexMap<String, CategoryMetadata>,
    revision: u64,
}

impl ChartContext {
    pub fn new(props: ContextProps) -> ChartResult<Self> {
        validate_mapping(&props.colors_mapping)?;
        validate_mapping(&props.colors_based_mapping)?;
        Ok(Self {
            colors_mapping: props.colors_mapping,
            colors_based_mapping: props.colors_based_mapping,
            highlight_items: props.highlight_items.into_iter().collect(),
            disabled_items: props.disabled_items.into_iter().collect(),
            visible_items: props.visible_items.into_iter().collect(),
            category_metadata: props.category_metadata,
            revision: 0,
        })
    }

    /// Snapshot of the current state in props form.
    #[must_use]
    pub fn to_props(&self) -> ContextProps {
        ContextProps {
            colors_mapping: self.colors_mapping.clone(),
            colors_based_mapping: self.colors_based_mapping.clone(),
            highlight_items: self.highlight_items.iter().cloned().collect(),
            disabled_items: self.disabled_items.iter().cloned().collect(),
            visible_items: self.visible_items.iter().cloned().collect(),
            category_metadata: self.category_metadata.clone(),
        }
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self, what: &'static str) {
        self.revision = self.revision.wrapping_add(1);
        trace!(revision = self.revision, what, "chart context changed");
    }

    #[must_use]
    pub fn colors_mapping(&self) -> &ColorMapping {
        &self.colors_mapping
    }

    #[must_use]
    pub fn colors_based_mapping(&self) -> &ColorMapping {
        &self.colors_based_mapping
    }

    #[must_use]
    pub fn highlight_items(&self) -> Vec<String> {
        self.highlight_items.iter().cloned().collect()
    }

    #[must_use]
    pub fn disabled_items(&self) -> Vec<String> {
        self.disabled_items.iter().cloned().collect()
    }

    #[must_use]
    pub fn visible_items(&self) -> Vec<String> {
        self.visible_items.iter().cloned().collect()
    }

    #[must_use]
    pub fn category_metadata(&self, label: &str) -> Option<&CategoryMetadata> {
        self.category_metadata.get(label)
    }

    /// Display name for `label`, falling back to the label itself.
    #[must_use]
    pub fn display_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.category_metadata
            .get(label)
            .and_then(|meta| meta.display_name.as_deref())
            .unwrap_or(label)
    }

    pub fn set_colors_mapping(&mut self, mapping: ColorMapping) -> ChartResult<()> {
        validate_mapping(&mapping)?;
        if self.colors_mapping != mapping {
            self.colors_mapping = mapping;
            self.touch("colors_mapping");
        }
        Ok(())
    }

    /// Adds entries for labels without a color; existing entries are kept.
    /// Returns `true` when anything was added.
    pub fn merge_colors_mapping(&mut self, generated: &ColorMapping) -> ChartResult<bool> {
        validate_mapping(generated)?;
        let mut changed = false;
        for (label, color) in generated {
            if !self.colors_mapping.contains_key(label) {
                self.colors_mapping.insert(label.clone(), color.clone());
                changed = true;
            }
        }
        if changed {
            self.touch("colors_mapping");
        }
        Ok(changed)
    }

    pub fn set_colors_based_mapping(&mut self, mapping: ColorMapping) -> ChartResult<()> {
        validate_mapping(&mapping)?;
        if self.colors_based_mapping != mapping {
            self.colors_based_mapping = mapping;
            self.touch("colors_based_mapping");
        }
        Ok(())
    }

    /// Replaces the highlighted set. Returns `true` if it changed.
    pub fn set_highlight_items<I, S>(&mut self, labels: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next: IndexSet<String> = labels.into_iter().map(Into::into).collect();
        if next == self.highlight_items {
            return false;
        }
        self.highlight_items = next;
        self.touch("highlight_items");
        true
    }

    pub fn clear_highlight(&mut self) -> bool {
        self.set_highlight_items(std::iter::empty::<String>())
    }

    pub fn set_disabled_items<I, S>(&mut self, labels: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next: IndexSet<String> = labels.into_iter().map(Into::into).collect();
        if next == self.disabled_items {
            return false;
        }
        self.disabled_items = next;
        self.touch("disabled_items");
        true
    }

    /// Flips whether `label` is disabled; returns the new disabled state.
    pub fn toggle_disabled(&mut self, label: &str) -> bool {
        let disabled = if self.disabled_items.shift_remove(label) {
            false
        } else {
            self.disabled_items.insert(label.to_owned());
            true
        };
        self.touch("disabled_items");
        disabled
    }

    pub fn set_visible_items<I, S>(&mut self, labels: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next: IndexSet<String> = labels.into_iter().map(Into::into).collect();
        if next == self.visible_items {
            return false;
        }
        self.visible_items = next;
        self.touch("visible_items");
        true
    }

    pub fn set_category_metadata(&mut self, metadata: IndexMap<String, CategoryMetadata>) {
        if self.category_metadata != metadata {
            self.category_metadata = metadata;
            self.touch("category_metadata");
        }
    }

    #[must_use]
    pub fn is_disabled(&self, label: &str) -> bool {
        self.disabled_items.contains(label)
    }

    /// Rendered and counted in aggregates: not disabled, and inside the
    /// visible allow-list when one is set.
    #[must_use]
    pub fn is_active(&self, label: &str) -> bool {
        !self.is_disabled(label)
            && (self.visible_items.is_empty() || self.visible_items.contains(label))
    }

    #[must_use]
    pub fn is_highlighted(&self, label: &str) -> bool {
        self.highlight_items.contains(label)
    }

    #[must_use]
    pub fn has_highlight(&self) -> bool {
        !self.highlight_items.is_empty()
    }

    /// Some other label is highlighted.
    #[must_use]
    pub fn is_dimmed(&self, label: &str) -> bool {
        self.has_highlight() && !self.is_highlighted(label)
    }

    /// Active labels from `labels`, in the given order.
    #[must_use]
    pub fn active_labels<'a, S: AsRef<str> + 'a>(
        &self,
        labels: impl IntoIterator<Item = &'a S>,
    ) -> Vec<String> {
        let mut active = Vec::new();
        for label in labels {
            let label: &str = label.as_ref();
            if self.is_active(label) {
                active.push(label.to_owned());
            }
        }
        active
    }
}

/// Rejects malformed hex/rgb colors; named CSS colors pass through.
fn validate_mapping(mapping: &ColorMapping) -> ChartResult<()> {
    for (label, color) in mapping {
        let trimmed = color.trim();
        if trimmed.starts_with('#') || trimmed.to_ascii_lowercase().starts_with("rgb") {
            Color::parse(trimmed).map_err(|e| {
                ChartError::InvalidConfig(format!("color for `{label}` is invalid: {e}"))
            })?;
        }
    }
    Ok(())
}
