use nui::{App, Container, DevicePixels, TooltipId, View, bounds, point, px};
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn layout_at_scale_two_rounds_edges_without_gaps() {
    init_logger();
    let (app, platform) = App::headless();
    platform.set_scale_factor(2.0);

    let parent = Container::new(&app);
    parent.set_style_property("flex-direction", "row");
    let children: Vec<View> = (0..3)
        .map(|_| {
            let child = View::new(&app);
            child.set_style_property("flex-grow", 1.0);
            parent.add_child_view(&child);
            child
        })
        .collect();

    parent.set_bounds(bounds(px(0.0), px(0.0), px(100.0), px(50.0)));
    assert_eq!(parent.pixel_bounds().size.width, DevicePixels(200));

    // 100 logical pixels split three ways cannot divide evenly; rounding
    // each edge keeps the children contiguous and exactly filling.
    let mut edge = DevicePixels(0);
    let mut total = DevicePixels(0);
    for child in &children {
        let b = child.pixel_bounds();
        assert_eq!(b.origin.x, edge);
        edge = b.origin.x + b.size.width;
        total = total + b.size.width;
    }
    assert_eq!(total, DevicePixels(200));
}

#[test]
fn nested_containers_lay_out_in_one_pass() {
    init_logger();
    let (app, _platform) = App::headless();
    let outer = Container::new(&app);
    outer.set_style_property("flex-direction", "row");
    let inner = Container::new(&app);
    inner.set_style([("flex-grow", "1"), ("flex-direction", "column")]);
    let leaf = View::new(&app);
    leaf.set_style_property("flex-grow", 1.0);
    inner.add_child_view(&leaf);
    outer.add_child_view(inner.as_view());

    outer.set_bounds(bounds(px(0.0), px(0.0), px(80.0), px(60.0)));

    assert_eq!(inner.bounds(), bounds(px(0.0), px(0.0), px(80.0), px(60.0)));
    assert_eq!(leaf.bounds(), bounds(px(0.0), px(0.0), px(80.0), px(60.0)));
}

#[test]
fn style_batch_runs_a_single_layout_pass() {
    init_logger();
    let (app, platform) = App::headless();
    let parent = Container::new(&app);
    let child = View::new(&app);
    child.set_style([("flex-grow", "1"), ("align-self", "stretch")]);
    parent.add_child_view(&child);
    parent.set_bounds(bounds(px(0.0), px(0.0), px(100.0), px(100.0)));
    platform.take_calls();

    // Both properties move the child; applied as a batch the backend sees
    // one bounds assignment.
    let applied = parent.set_style([("padding", "4"), ("padding-top", "10")]);
    assert_eq!(applied, 2);
    assert_eq!(platform.calls_named("set_pixel_bounds"), 1);
    assert_eq!(child.bounds(), bounds(px(4.0), px(10.0), px(92.0), px(86.0)));
}

#[test]
fn unknown_properties_in_a_batch_are_skipped() {
    init_logger();
    let (app, _platform) = App::headless();
    let view = View::new(&app);
    let applied = view.set_style([("width", "50"), ("borderradius", "4"), ("height", "oops")]);
    assert_eq!(applied, 1);
}

#[test]
fn visibility_is_effective_only_when_the_whole_chain_is_visible() {
    init_logger();
    let (app, _platform) = App::headless();
    let parent = Container::new(&app);
    let child = View::new(&app);
    parent.add_child_view(&child);

    assert!(child.is_visible_in_hierarchy());
    parent.set_visible(false);
    assert!(child.is_visible(), "the child's own flag is untouched");
    assert!(!child.is_visible_in_hierarchy());

    parent.set_visible(true);
    child.set_visible(false);
    assert!(!child.is_visible_in_hierarchy());
}

#[test]
fn absolute_offsets_accumulate_up_the_parent_chain() {
    init_logger();
    let (app, _platform) = App::headless();
    let outer = Container::new(&app);
    let inner = Container::new(&app);
    let leaf = View::new(&app);

    inner.set_style([
        ("position", "absolute"),
        ("left", "5"),
        ("top", "5"),
        ("width", "50"),
        ("height", "50"),
    ]);
    leaf.set_style([
        ("position", "absolute"),
        ("left", "2"),
        ("top", "3"),
        ("width", "10"),
        ("height", "10"),
    ]);
    inner.add_child_view(&leaf);
    outer.add_child_view(inner.as_view());
    outer.set_bounds(bounds(px(10.0), px(10.0), px(100.0), px(100.0)));

    assert_eq!(leaf.bounds().origin, point(px(2.0), px(3.0)));
    assert_eq!(leaf.offset_from_view(&leaf), Some(point(px(0.0), px(0.0))));
    assert_eq!(leaf.offset_from_view(inner.as_view()), Some(point(px(2.0), px(3.0))));
    assert_eq!(leaf.offset_from_view(outer.as_view()), Some(point(px(7.0), px(8.0))));
    assert_eq!(leaf.offset_from_root(), point(px(7.0), px(8.0)));

    let unrelated = View::new(&app);
    assert_eq!(leaf.offset_from_view(&unrelated), None);
}

#[test]
fn dropping_handles_destroys_native_widgets() {
    init_logger();
    let (app, platform) = App::headless();
    let parent = Container::new(&app);
    let child = View::new(&app);
    parent.add_child_view(&child);
    assert_eq!(platform.view_count(), 2);

    // The parent keeps the child alive past this handle.
    drop(child);
    assert_eq!(platform.view_count(), 2);

    let child = parent.remove_child_view_at(0);
    drop(child);
    assert_eq!(platform.view_count(), 1);

    drop(parent);
    assert_eq!(platform.view_count(), 0);
}

#[test]
fn whole_view_tooltip_replaces_everything() {
    init_logger();
    let (app, platform) = App::headless();
    let view = View::new(&app);
    view.set_bounds(bounds(px(0.0), px(0.0), px(100.0), px(100.0)));

    view.set_tooltip("first");
    view.set_tooltip("second");
    assert_eq!(view.tooltip_count(), 1);
    assert_eq!(
        view.tooltip_text_at(point(px(1.0), px(1.0))),
        Some("second".to_owned())
    );

    let id = view.add_tooltip_for_rect("left half", bounds(px(0.0), px(0.0), px(50.0), px(100.0)));
    assert_ne!(id, TooltipId::DEFAULT);
    assert_eq!(view.tooltip_count(), 1, "the default entry was displaced");
    assert_eq!(view.tooltip_text_at(point(px(80.0), px(1.0))), None);
    assert_eq!(
        view.tooltip_text_at(point(px(10.0), px(1.0))),
        Some("left half".to_owned())
    );

    assert!(view.remove_tooltip(id));
    assert!(!view.remove_tooltip(id));
    assert!(platform.calls_named("remove_tooltip") >= 2);
}

#[test]
fn focus_follows_focusability() {
    init_logger();
    let (app, _platform) = App::headless();
    let first = View::new(&app);
    let second = View::new(&app);

    first.focus();
    assert!(!first.has_focus(), "unfocusable views cannot take focus");

    first.set_focusable(true);
    second.set_focusable(true);
    first.focus();
    assert!(first.has_focus());
    second.focus();
    assert!(!first.has_focus());
    assert!(second.has_focus());
}

#[test]
fn enabled_state_reaches_the_backend() {
    init_logger();
    let (app, _platform) = App::headless();
    let view = View::new(&app);
    assert!(view.is_enabled());
    view.set_enabled(false);
    assert!(!view.is_enabled());
}

#[test]
fn input_dispatch_stops_at_the_first_handler() {
    init_logger();
    let (app, _platform) = App::headless();
    let view = View::new(&app);

    let reached_second = std::rc::Rc::new(std::cell::Cell::new(false));
    view.responder()
        .on_key_down(|event| {
            if event.key == "escape" {
                event.mark_handled();
            }
        })
        .detach();
    let flag = reached_second.clone();
    view.responder().on_key_down(move |_| flag.set(true)).detach();

    let escape = nui::KeyEvent::new("escape");
    assert!(view.responder().dispatch_key_down(&escape));
    assert!(!reached_second.get());

    let other = nui::KeyEvent::new("a");
    assert!(!view.responder().dispatch_key_down(&other));
    assert!(reached_second.get());
}
