//! Adapter between views and the embedded flexbox engine.
//!
//! Every view owns one node in a shared [`taffy`] tree. Style properties
//! arrive as loosely-typed name/value pairs (the public style interface is
//! string-keyed, CSS-flavored) and are translated here into typed taffy
//! styles; unknown names and unparsable values are rejected as no-ops, never
//! errors. Layout is computed for a whole subtree in one pass, in logical
//! pixels, and read back per node relative to its parent.

use crate::geometry::{Bounds, Pixels, Size, point, px, size};
use crate::util::ResultExt;
use std::fmt::Write as _;
use taffy::style_helpers::{FromLength, FromPercent, TaffyAuto, TaffyMaxContent};
use taffy::{
    AvailableSpace, NodeId, TaffyTree,
    prelude::{auto, length, percent},
    style::{
        AlignContent, AlignItems, Display, FlexDirection, FlexWrap, LengthPercentage,
        LengthPercentageAuto, Position, Style,
    },
};

type TaffySize<T> = taffy::geometry::Size<T>;

/// Identifier of a view's node in the layout tree.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LayoutId(NodeId);

/// A style property value: either text (`"row"`, `"50%"`, `"auto"`) or a
/// plain number of logical pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    Text(String),
    Number(f32),
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_owned())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(value as f32)
    }
}

/// Normalizes a property or enum-value string: lowercased, ASCII letters
/// only. `"flex-direction"`, `"flexDirection"` and `"Flex Direction"` all
/// normalize to `"flexdirection"`.
pub(crate) fn normalize_style_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// Node allocation only fails on tree-internal invariant violations, which
// would already mean the view tree is corrupt.
const EXPECT_MESSAGE: &str = "layout tree rejected a structurally valid operation";

pub(crate) struct LayoutEngine {
    tree: TaffyTree<()>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        LayoutEngine {
            tree: TaffyTree::new(),
        }
    }

    pub fn new_node(&mut self) -> LayoutId {
        LayoutId(self.tree.new_leaf(Style::default()).expect(EXPECT_MESSAGE))
    }

    pub fn remove(&mut self, node: LayoutId) {
        self.tree.remove(node.0).log_err();
    }

    pub fn insert_child(&mut self, parent: LayoutId, index: usize, child: LayoutId) {
        self.tree
            .insert_child_at_index(parent.0, index, child.0)
            .log_err();
    }

    pub fn remove_child(&mut self, parent: LayoutId, child: LayoutId) {
        self.tree.remove_child(parent.0, child.0).log_err();
    }

    pub fn children(&self, parent: LayoutId) -> Vec<LayoutId> {
        self.tree
            .children(parent.0)
            .log_err()
            .unwrap_or_default()
            .into_iter()
            .map(LayoutId)
            .collect()
    }

    /// Flips whether the node participates in layout at all. Invisible views
    /// are taken out of flow, matching native toolkit behavior.
    pub fn set_display(&mut self, node: LayoutId, participates: bool) {
        self.update_style(node, |style| {
            style.display = if participates {
                Display::Flex
            } else {
                Display::None
            };
        });
    }

    /// Applies the view's minimum size constraint, re-derived whenever the
    /// font (and thus the native widget's preferred size) changes.
    pub fn set_min_size(&mut self, node: LayoutId, min: Size<Pixels>) {
        self.update_style(node, |style| {
            style.min_size = TaffySize {
                width: length(min.width.0),
                height: length(min.height.0),
            };
        });
    }

    /// Applies one normalized style property. Returns false when the name or
    /// value is not recognized; the caller treats that as a no-op.
    pub fn apply_property(&mut self, node: LayoutId, key: &str, value: &StyleValue) -> bool {
        let Some(mut style) = self.tree.style(node.0).log_err().cloned() else {
            return false;
        };
        let applied = apply_to_style(&mut style, key, value);
        if applied {
            self.tree.set_style(node.0, style).log_err();
        } else {
            log::warn!("ignoring unsupported style property {key:?} = {value:?}");
        }
        applied
    }

    /// Recomputes layout for the subtree rooted at `root`, constrained to the
    /// node's current on-screen size. The root's styled size is overridden for
    /// the pass and restored afterwards so percentage and auto styles on the
    /// root survive for when it participates in an ancestor's pass.
    pub fn compute(&mut self, root: LayoutId, available: Size<Pixels>) {
        let Some(saved) = self.tree.style(root.0).log_err().cloned() else {
            return;
        };
        let mut pass_style = saved.clone();
        pass_style.size = TaffySize {
            width: length(available.width.0),
            height: length(available.height.0),
        };
        self.tree.set_style(root.0, pass_style).log_err();
        self.tree
            .compute_layout(root.0, TaffySize::<AvailableSpace>::MAX_CONTENT)
            .log_err();
        self.tree.set_style(root.0, saved).log_err();
    }

    /// The node's computed bounds, relative to its parent, in logical pixels.
    pub fn bounds(&self, node: LayoutId) -> Bounds<Pixels> {
        let Some(layout) = self.tree.layout(node.0).log_err() else {
            return Bounds::default();
        };
        Bounds {
            origin: point(px(layout.location.x), px(layout.location.y)),
            size: size(px(layout.size.width), px(layout.size.height)),
        }
    }

    /// Debug dump of the computed layout subtree.
    pub fn debug_string(&self, root: LayoutId) -> String {
        let mut out = String::new();
        self.debug_node(root, 0, &mut out);
        out
    }

    fn debug_node(&self, node: LayoutId, depth: usize, out: &mut String) {
        let b = self.bounds(node);
        let _ = writeln!(
            out,
            "{:indent$}node {:?} origin=({:?}, {:?}) size=({:?}, {:?})",
            "",
            node.0,
            b.origin.x,
            b.origin.y,
            b.size.width,
            b.size.height,
            indent = depth * 2,
        );
        for child in self.children(node) {
            self.debug_node(child, depth + 1, out);
        }
    }

    fn update_style(&mut self, node: LayoutId, f: impl FnOnce(&mut Style)) {
        if let Some(mut style) = self.tree.style(node.0).log_err().cloned() {
            f(&mut style);
            self.tree.set_style(node.0, style).log_err();
        }
    }
}

fn apply_to_style(style: &mut Style, key: &str, value: &StyleValue) -> bool {
    match key {
        "display" => set(parse_display(value), &mut style.display),
        "position" => set(parse_position(value), &mut style.position),
        "flexdirection" => set(parse_flex_direction(value), &mut style.flex_direction),
        "flexwrap" => set(parse_flex_wrap(value), &mut style.flex_wrap),
        "flexgrow" => set(parse_number(value), &mut style.flex_grow),
        "flexshrink" => set(parse_number(value), &mut style.flex_shrink),
        "flexbasis" => set(parse_auto_length(value), &mut style.flex_basis),
        "width" => set(parse_auto_length(value), &mut style.size.width),
        "height" => set(parse_auto_length(value), &mut style.size.height),
        "minwidth" => set(parse_auto_length(value), &mut style.min_size.width),
        "minheight" => set(parse_auto_length(value), &mut style.min_size.height),
        "maxwidth" => set(parse_auto_length(value), &mut style.max_size.width),
        "maxheight" => set(parse_auto_length(value), &mut style.max_size.height),
        "margin" => parse_auto_length(value)
            .map(|v: LengthPercentageAuto| {
                style.margin = taffy::geometry::Rect {
                    left: v,
                    right: v,
                    top: v,
                    bottom: v,
                };
            })
            .is_some(),
        "margintop" => set(parse_auto_length(value), &mut style.margin.top),
        "marginbottom" => set(parse_auto_length(value), &mut style.margin.bottom),
        "marginleft" => set(parse_auto_length(value), &mut style.margin.left),
        "marginright" => set(parse_auto_length(value), &mut style.margin.right),
        "padding" => parse_length_percent(value)
            .map(|v: LengthPercentage| {
                style.padding = taffy::geometry::Rect {
                    left: v,
                    right: v,
                    top: v,
                    bottom: v,
                };
            })
            .is_some(),
        "paddingtop" => set(parse_length_percent(value), &mut style.padding.top),
        "paddingbottom" => set(parse_length_percent(value), &mut style.padding.bottom),
        "paddingleft" => set(parse_length_percent(value), &mut style.padding.left),
        "paddingright" => set(parse_length_percent(value), &mut style.padding.right),
        "top" => set(parse_auto_length(value), &mut style.inset.top),
        "bottom" => set(parse_auto_length(value), &mut style.inset.bottom),
        "left" => set(parse_auto_length(value), &mut style.inset.left),
        "right" => set(parse_auto_length(value), &mut style.inset.right),
        "alignitems" => set(parse_align_items(value).map(Some), &mut style.align_items),
        "alignself" => set(parse_align_items(value).map(Some), &mut style.align_self),
        "aligncontent" => set(parse_align_content(value).map(Some), &mut style.align_content),
        "justifycontent" => set(
            parse_align_content(value).map(Some),
            &mut style.justify_content,
        ),
        "gap" => parse_length_percent(value)
            .map(|v: LengthPercentage| {
                style.gap = TaffySize {
                    width: v,
                    height: v,
                };
            })
            .is_some(),
        "rowgap" => set(parse_length_percent(value), &mut style.gap.height),
        "columngap" => set(parse_length_percent(value), &mut style.gap.width),
        _ => false,
    }
}

fn set<T>(parsed: Option<T>, slot: &mut T) -> bool {
    match parsed {
        Some(value) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn parse_number(value: &StyleValue) -> Option<f32> {
    match value {
        StyleValue::Number(n) => Some(*n),
        StyleValue::Text(s) => s.trim().parse().ok(),
    }
}

fn parse_length_percent<T: FromLength + FromPercent>(value: &StyleValue) -> Option<T> {
    match value {
        StyleValue::Number(n) => Some(length(*n)),
        StyleValue::Text(s) => {
            let s = s.trim();
            if let Some(pct) = s.strip_suffix('%') {
                pct.trim().parse::<f32>().ok().map(|v| percent(v / 100.0))
            } else {
                s.parse::<f32>().ok().map(length)
            }
        }
    }
}

fn parse_auto_length<T: FromLength + FromPercent + TaffyAuto>(value: &StyleValue) -> Option<T> {
    if let StyleValue::Text(s) = value {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Some(auto());
        }
    }
    parse_length_percent(value)
}

fn text_value(value: &StyleValue) -> Option<String> {
    match value {
        StyleValue::Text(s) => Some(normalize_style_name(s)),
        StyleValue::Number(_) => None,
    }
}

fn parse_display(value: &StyleValue) -> Option<Display> {
    match text_value(value)?.as_str() {
        "flex" => Some(Display::Flex),
        "none" => Some(Display::None),
        _ => None,
    }
}

fn parse_position(value: &StyleValue) -> Option<Position> {
    match text_value(value)?.as_str() {
        "relative" => Some(Position::Relative),
        "absolute" => Some(Position::Absolute),
        _ => None,
    }
}

fn parse_flex_direction(value: &StyleValue) -> Option<FlexDirection> {
    match text_value(value)?.as_str() {
        "row" => Some(FlexDirection::Row),
        "column" => Some(FlexDirection::Column),
        "rowreverse" => Some(FlexDirection::RowReverse),
        "columnreverse" => Some(FlexDirection::ColumnReverse),
        _ => None,
    }
}

fn parse_flex_wrap(value: &StyleValue) -> Option<FlexWrap> {
    match text_value(value)?.as_str() {
        "nowrap" => Some(FlexWrap::NoWrap),
        "wrap" => Some(FlexWrap::Wrap),
        "wrapreverse" => Some(FlexWrap::WrapReverse),
        _ => None,
    }
}

fn parse_align_items(value: &StyleValue) -> Option<AlignItems> {
    match text_value(value)?.as_str() {
        "start" => Some(AlignItems::Start),
        "end" => Some(AlignItems::End),
        "flexstart" => Some(AlignItems::FlexStart),
        "flexend" => Some(AlignItems::FlexEnd),
        "center" => Some(AlignItems::Center),
        "baseline" => Some(AlignItems::Baseline),
        "stretch" => Some(AlignItems::Stretch),
        _ => None,
    }
}

fn parse_align_content(value: &StyleValue) -> Option<AlignContent> {
    match text_value(value)?.as_str() {
        "start" => Some(AlignContent::Start),
        "end" => Some(AlignContent::End),
        "flexstart" => Some(AlignContent::FlexStart),
        "flexend" => Some(AlignContent::FlexEnd),
        "center" => Some(AlignContent::Center),
        "stretch" => Some(AlignContent::Stretch),
        "spacebetween" => Some(AlignContent::SpaceBetween),
        "spacearound" => Some(AlignContent::SpaceAround),
        "spaceevenly" => Some(AlignContent::SpaceEvenly),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_property_names() {
        assert_eq!(normalize_style_name("flex-direction"), "flexdirection");
        assert_eq!(normalize_style_name("FlexDirection"), "flexdirection");
        assert_eq!(normalize_style_name("background-color"), "backgroundcolor");
    }

    #[test]
    fn unknown_property_is_rejected() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        assert!(!engine.apply_property(node, "bogus", &"12".into()));
        assert!(!engine.apply_property(node, "width", &"fish".into()));
    }

    #[test]
    fn computes_row_layout() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let a = engine.new_node();
        let b = engine.new_node();
        engine.insert_child(root, 0, a);
        engine.insert_child(root, 1, b);

        assert!(engine.apply_property(root, "flexdirection", &"row".into()));
        assert!(engine.apply_property(a, "flexgrow", &1.0.into()));
        assert!(engine.apply_property(b, "flexgrow", &1.0.into()));

        engine.compute(root, size(px(100.0), px(50.0)));
        let a_bounds = engine.bounds(a);
        let b_bounds = engine.bounds(b);
        assert_eq!(a_bounds, crate::geometry::bounds(px(0.0), px(0.0), px(50.0), px(50.0)));
        assert_eq!(b_bounds, crate::geometry::bounds(px(50.0), px(0.0), px(50.0), px(50.0)));
    }

    #[test]
    fn hidden_node_is_out_of_flow() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let a = engine.new_node();
        let b = engine.new_node();
        engine.insert_child(root, 0, a);
        engine.insert_child(root, 1, b);
        engine.apply_property(root, "flexdirection", &"row".into());
        engine.apply_property(a, "flexgrow", &1.0.into());
        engine.apply_property(b, "flexgrow", &1.0.into());

        engine.set_display(a, false);
        engine.compute(root, size(px(100.0), px(50.0)));
        assert_eq!(engine.bounds(b).size.width, px(100.0));
    }

    #[test]
    fn percentage_width_resolves_against_parent() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let child = engine.new_node();
        engine.insert_child(root, 0, child);
        engine.apply_property(child, "width", &"50%".into());
        engine.apply_property(child, "height", &"100%".into());

        engine.compute(root, size(px(200.0), px(80.0)));
        assert_eq!(engine.bounds(child).size, size(px(100.0), px(80.0)));
    }
}
