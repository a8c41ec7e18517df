//! End-to-end layout scenarios: mount a description tree, run a full
//! build/layout/paint pass, and assert on the resulting cells.

use weft_core::geometry::{Constraints, EdgeInsets, Size};
use weft_render::canvas::Canvas;
use weft_render::style::{Color, Style};
use weft_render::Buffer;
use weft_tree::{Component, ElementTree, PipelineOwner, RenderTree};
use weft_widgets::{
    Center, Column, Container, CrossAxisAlignment, DecoratedBox, MainAxisAlignment, Padding, Row,
    SizedBox, Text,
};

struct Harness {
    elements: ElementTree,
    render: RenderTree,
    pipeline: PipelineOwner,
}

impl Harness {
    fn mount(component: impl Component + 'static) -> Self {
        let mut harness = Self {
            elements: ElementTree::new(),
            render: RenderTree::new(),
            pipeline: PipelineOwner::new(),
        };
        harness.elements.mount_root(
            Box::new(component),
            &mut harness.render,
            &mut harness.pipeline,
        );
        harness
    }

    fn frame(&mut self, width: u16, height: u16) -> Buffer {
        self.elements
            .flush_build(&mut self.render, &mut self.pipeline);

        let mut errors = Vec::new();
        if let Some(root) = self.render.root() {
            let tight = Constraints::tight(Size::new(f32::from(width), f32::from(height)));
            self.render.layout_node(root, tight, false, &mut errors);
        }
        assert!(errors.is_empty(), "unexpected layout errors: {errors:?}");
        self.pipeline.flush_layout(&mut self.render);

        let mut buffer = Buffer::new(width, height);
        {
            let mut canvas = Canvas::new(&mut buffer);
            self.pipeline.flush_paint(&mut self.render, &mut canvas);
        }
        buffer
    }
}

fn symbol(buffer: &Buffer, x: u16, y: u16) -> char {
    buffer.get_cell(x, y).expect("cell in bounds").symbol
}

fn row_text(buffer: &Buffer, y: u16) -> String {
    buffer
        .row(y)
        .iter()
        .filter(|c| !c.is_continuation())
        .map(|c| c.symbol)
        .collect::<String>()
        .trim_end()
        .to_owned()
}

// ---------------------------------------------------------------------------
// Centering uses display width, not codepoint count
// ---------------------------------------------------------------------------

#[test]
fn centering_emoji_text_in_45_columns_starts_at_16() {
    // "✨ Features:" is 12 columns (2 + 1 + 9); (45 - 12) / 2 = 16.
    let mut h = Harness::mount(Center::new(Box::new(Text::new("✨ Features:"))));
    let buffer = h.frame(45, 3);

    assert_eq!(symbol(&buffer, 16, 1), '✨');
    assert!(buffer.get_cell(17, 1).expect("cell").is_continuation());
    assert_eq!(symbol(&buffer, 18, 1), ' ');
    assert_eq!(symbol(&buffer, 19, 1), 'F');
    // Column 15 stays empty: the text occupies 16..28.
    assert_eq!(symbol(&buffer, 15, 1), ' ');
}

#[test]
fn centering_ascii_text_of_equal_width_lands_at_the_same_offset() {
    // "Hello World!" is also 12 columns, so the offset matches.
    let mut h = Harness::mount(Center::new(Box::new(Text::new("Hello World!"))));
    let buffer = h.frame(45, 3);

    assert_eq!(symbol(&buffer, 16, 1), 'H');
    assert_eq!(symbol(&buffer, 27, 1), '!');
}

// ---------------------------------------------------------------------------
// Column cross-axis centering with a wide glyph
// ---------------------------------------------------------------------------

#[test]
fn column_cross_center_floors_and_writes_a_continuation() {
    let mut h = Harness::mount(
        Column::new(vec![
            Box::new(Text::new("abc")),
            Box::new(Text::new("✨")),
        ])
        .cross_axis_alignment(CrossAxisAlignment::Center),
    );
    let buffer = h.frame(50, 6);

    // (50 - 3) / 2 = 23 (floored).
    assert_eq!(symbol(&buffer, 23, 0), 'a');
    assert_eq!(symbol(&buffer, 24, 0), 'b');
    assert_eq!(symbol(&buffer, 25, 0), 'c');

    // (50 - 2) / 2 = 24; the wide glyph's trailing half sits at column 25.
    assert_eq!(symbol(&buffer, 24, 1), '✨');
    assert_eq!(symbol(&buffer, 25, 1), '\u{200B}');
}

// ---------------------------------------------------------------------------
// Flex alignment
// ---------------------------------------------------------------------------

#[test]
fn row_lays_children_left_to_right() {
    let mut h = Harness::mount(Row::new(vec![
        Box::new(Text::new("ab")),
        Box::new(Text::new("cd")),
    ]));
    let buffer = h.frame(10, 1);
    assert_eq!(row_text(&buffer, 0), "abcd");
}

#[test]
fn row_main_axis_center_floors_the_leading_gap() {
    let mut h = Harness::mount(
        Row::new(vec![Box::new(Text::new("abc"))])
            .main_axis_alignment(MainAxisAlignment::Center),
    );
    let buffer = h.frame(10, 1);
    // (10 - 3) / 2 = 3 (floored).
    assert_eq!(symbol(&buffer, 3, 0), 'a');
    assert_eq!(symbol(&buffer, 5, 0), 'c');
}

#[test]
fn row_main_axis_end_packs_to_the_right() {
    let mut h = Harness::mount(
        Row::new(vec![Box::new(Text::new("abc"))])
            .main_axis_alignment(MainAxisAlignment::End),
    );
    let buffer = h.frame(10, 1);
    assert_eq!(symbol(&buffer, 7, 0), 'a');
    assert_eq!(symbol(&buffer, 9, 0), 'c');
}

#[test]
fn column_stacks_children_top_to_bottom() {
    let mut h = Harness::mount(Column::new(vec![
        Box::new(Text::new("one")),
        Box::new(Text::new("two")),
        Box::new(Text::new("three")),
    ]));
    let buffer = h.frame(10, 5);
    assert_eq!(row_text(&buffer, 0), "one");
    assert_eq!(row_text(&buffer, 1), "two");
    assert_eq!(row_text(&buffer, 2), "three");
}

// ---------------------------------------------------------------------------
// Boxes
// ---------------------------------------------------------------------------

#[test]
fn sized_box_clamps_its_child_to_the_fixed_size() {
    // Center loosens the terminal's tight constraints so the fixed 4x1
    // footprint is observable.
    let mut h = Harness::mount(Center::new(Box::new(SizedBox::new(
        4.0,
        1.0,
        Box::new(Text::new("overflowing")),
    ))));
    let buffer = h.frame(10, 3);

    // The 4-wide box centers at x = (10 - 4) / 2 = 3 and truncates the
    // text to "over".
    assert_eq!(symbol(&buffer, 3, 1), 'o');
    assert_eq!(symbol(&buffer, 6, 1), 'r');
    assert_eq!(symbol(&buffer, 7, 1), ' ');
}

#[test]
fn padding_insets_the_child() {
    let mut h = Harness::mount(Padding::new(
        EdgeInsets::symmetric(2.0, 1.0),
        Box::new(Text::new("hi")),
    ));
    let buffer = h.frame(10, 4);
    assert_eq!(symbol(&buffer, 2, 1), 'h');
    assert_eq!(symbol(&buffer, 3, 1), 'i');
    assert_eq!(symbol(&buffer, 0, 0), ' ');
}

#[test]
fn decorated_box_draws_border_and_insets_content() {
    let mut h = Harness::mount(DecoratedBox::new(Box::new(Text::new("hi"))).border(Style::new()));
    let buffer = h.frame(8, 4);

    assert_eq!(symbol(&buffer, 0, 0), '┌');
    assert_eq!(symbol(&buffer, 7, 0), '┐');
    assert_eq!(symbol(&buffer, 0, 3), '└');
    assert_eq!(symbol(&buffer, 7, 3), '┘');
    assert_eq!(symbol(&buffer, 1, 1), 'h');
    assert_eq!(symbol(&buffer, 2, 1), 'i');
}

#[test]
fn decorated_box_background_fills_styled_spaces() {
    let style = Style::new().bg(Color::Blue);
    let mut h = Harness::mount(DecoratedBox::new(Box::new(Text::new("x"))).background(style));
    let buffer = h.frame(6, 2);

    let cell = buffer.get_cell(5, 1).expect("cell");
    assert_eq!(cell.style.bg, Some(Color::Blue));
    assert_eq!(symbol(&buffer, 0, 0), 'x');
}

#[test]
fn container_composes_size_decoration_and_padding() {
    let mut h = Harness::mount(Center::new(Box::new(
        Container::new()
            .width(10.0)
            .height(5.0)
            .padding(EdgeInsets::all(1.0))
            .border(Style::new())
            .child(Box::new(Text::new("ok"))),
    )));
    let buffer = h.frame(20, 9);

    // The 10x5 bordered box is centered: x = (20-10)/2 = 5, y = (9-5)/2 = 2.
    assert_eq!(symbol(&buffer, 5, 2), '┌');
    assert_eq!(symbol(&buffer, 14, 2), '┐');
    assert_eq!(symbol(&buffer, 5, 6), '└');
    // Border inset (1) + padding (1) puts the text at (7, 4).
    assert_eq!(symbol(&buffer, 7, 4), 'o');
    assert_eq!(symbol(&buffer, 8, 4), 'k');
}

#[test]
fn bare_container_builds_to_its_child() {
    let mut h = Harness::mount(Container::new().child(Box::new(Text::new("plain"))));
    let buffer = h.frame(8, 1);
    assert_eq!(row_text(&buffer, 0), "plain");
}
