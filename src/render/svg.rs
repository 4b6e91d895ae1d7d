use std::fmt::{Display, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::format::format_svg_number;

/// One node of an SVG document tree.
///
/// Attributes keep insertion order so serialized output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvgElement {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<SvgElement>,
    pub text: Option<String>,
}

impl SvgElement {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    #[must_use]
    pub fn group() -> Self {
        Self::new("g")
    }

    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new("rect")
            .with_num("x", x)
            .with_num("y", y)
            .with_num("width", width.max(0.0))
            .with_num("height", height.max(0.0))
    }

    #[must_use]
    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::new("circle")
            .with_num("cx", cx)
            .with_num("cy", cy)
            .with_num("r", r.max(0.0))
    }

    #[must_use]
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new("line")
            .with_num("x1", x1)
            .with_num("y1", y1)
            .with_num("x2", x2)
            .with_num("y2", y2)
    }

    #[must_use]
    pub fn path(d: impl Into<String>) -> Self {
        Self::new("path").with_attr("d", d.into())
    }

    #[must_use]
    pub fn text_at(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self::new("text")
            .with_num("x", x)
            .with_num("y", y)
            .with_text(text)
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.attributes.insert(name.into(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_num(self, name: impl Into<String>, value: f64) -> Self {
        self.with_attr(name, format_svg_number(value))
    }

    #[must_use]
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attr("class", class.into())
    }

    /// Tags the element with the series/category label used for hit testing.
    #[must_use]
    pub fn with_label(self, label: &str) -> Self {
        self.with_attr("data-label", label)
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SvgElement) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = SvgElement>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: SvgElement) {
        self.children.push(child);
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Numeric attribute value, `None` when absent or unparsable.
    #[must_use]
    pub fn num_attr(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(|value| value.parse().ok())
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|entry| entry == class))
    }

    /// Depth-first search over this element and its descendants.
    #[must_use]
    pub fn find_all(&self, predicate: impl Fn(&SvgElement) -> bool) -> Vec<&SvgElement> {
        let mut found = Vec::new();
        self.collect(&predicate, &mut found);
        found
    }

    fn collect<'a>(&'a self, predicate: &impl Fn(&SvgElement) -> bool, out: &mut Vec<&'a SvgElement>) {
        if predicate(self) {
            out.push(self);
        }
        for child in &self.children {
            child.collect(predicate, out);
        }
    }

    #[must_use]
    pub fn find_by_class(&self, class: &str) -> Vec<&SvgElement> {
        let mut found = Vec::new();
        self.collect(&|element: &SvgElement| element.has_class(class), &mut found);
        found
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SvgElement::element_count)
            .sum::<usize>()
    }

    /// Serializes the subtree; `indent` of `Some(n)` pretty-prints with n spaces.
    pub fn write_to(&self, out: &mut String, indent: Option<usize>) {
        self.write_at(out, indent, 0);
    }

    fn write_at(&self, out: &mut String, indent: Option<usize>, depth: usize) {
        if let Some(width) = indent {
            out.extend(std::iter::repeat_n(' ', width * depth));
        }
        let _ = write!(out, "<{}", self.name);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_xml(value));
        }

        if self.children.is_empty() && self.text.is_none() {
            out.push_str("/>");
            if indent.is_some() {
                out.push('\n');
            }
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_xml(text));
        }
        if !self.children.is_empty() {
            if indent.is_some() {
                out.push('\n');
            }
            for child in &self.children {
                child.write_at(out, indent, depth + 1);
            }
            if let Some(width) = indent {
                out.extend(std::iter::repeat_n(' ', width * depth));
            }
        }
        let _ = write!(out, "</{}>", self.name);
        if indent.is_some() {
            out.push('\n');
        }
    }

    #[must_use]
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out, None);
        out
    }
}

#[must_use]
pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
