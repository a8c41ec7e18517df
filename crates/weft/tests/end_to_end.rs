//! Whole-pipeline scenarios through the public API: description tree →
//! build → layout → paint → ANSI emission, and raw input bytes → typed
//! events → tree routing.

use std::any::Any;

use weft::{
    Buffer, Canvas, Center, Column, Component, Constraints, ElementTree, Event, InputParser,
    Instance, MouseButton, MouseEvent, PipelineOwner, RenderTree, Row, Size, State, Text,
};
use weft_render::emit::emit_frame;

fn render_to_buffer(root: Box<dyn Component>, width: u16, height: u16) -> Buffer {
    let mut elements = ElementTree::new();
    let mut render = RenderTree::new();
    let mut pipeline = PipelineOwner::new();

    elements.mount_root(root, &mut render, &mut pipeline);
    elements.flush_build(&mut render, &mut pipeline);

    let mut errors = Vec::new();
    if let Some(render_root) = render.root() {
        let tight = Constraints::tight(Size::new(f32::from(width), f32::from(height)));
        render.layout_node(render_root, tight, false, &mut errors);
    }
    assert!(errors.is_empty(), "layout errors: {errors:?}");
    pipeline.flush_layout(&mut render);

    let mut buffer = Buffer::new(width, height);
    {
        let mut canvas = Canvas::new(&mut buffer);
        pipeline.flush_paint(&mut render, &mut canvas);
    }
    buffer
}

fn emitted(buffer: &Buffer) -> String {
    let mut out = Vec::new();
    emit_frame(&mut out, buffer).expect("emit to vec");
    String::from_utf8(out).expect("utf-8")
}

#[test]
fn a_description_tree_round_trips_to_ansi() {
    let buffer = render_to_buffer(
        Box::new(Column::new(vec![
            Box::new(Text::new("Hello 🌍 World")),
            Box::new(Text::new("second")),
        ])),
        20,
        2,
    );

    let output = emitted(&buffer);
    assert!(output.starts_with("\x1b[1;1H"), "cursor home first");
    assert!(!output.contains('\u{200B}'), "continuations never emitted");
    assert!(output.contains("Hello 🌍 World"));

    // Row-major character order survives the emitter.
    let hello = output.find("Hello").expect("first row content");
    let second = output.find("second").expect("second row content");
    assert!(hello < second);
}

#[test]
fn emoji_centering_survives_the_whole_pipeline() {
    let buffer = render_to_buffer(
        Box::new(Center::new(Box::new(Text::new("✨ Features:")))),
        45,
        3,
    );
    // (45 - 12) / 2 = 16.
    assert_eq!(buffer.get_cell(16, 1).map(|c| c.symbol), Some('✨'));
    assert_eq!(buffer.get_cell(17, 1).map(|c| c.symbol), Some('\u{200B}'));
}

/// A stateful scroll sink for routing assertions.
#[derive(Debug, Clone)]
struct ScrollSink;

struct ScrollSinkState {
    seen: Vec<MouseButton>,
}

impl Component for ScrollSink {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_boxed(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
    fn instantiate(&self) -> Instance {
        Instance::Stateful(Box::new(ScrollSinkState { seen: Vec::new() }))
    }
}

impl State for ScrollSinkState {
    fn build(&mut self, _component: &dyn Component) -> Box<dyn Component> {
        Box::new(Text::new(format!("scrolled {} times", self.seen.len())))
    }

    fn handle_scroll(&mut self, event: &MouseEvent) -> bool {
        self.seen.push(event.button);
        true
    }
}

#[test]
fn wheel_bytes_route_from_parser_to_state() {
    let mut elements = ElementTree::new();
    let mut render = RenderTree::new();
    let mut pipeline = PipelineOwner::new();
    elements.mount_root(
        Box::new(Row::new(vec![Box::new(ScrollSink)])),
        &mut render,
        &mut pipeline,
    );

    // Lay out and paint so world rects exist for hit testing.
    elements.flush_build(&mut render, &mut pipeline);
    let mut errors = Vec::new();
    let render_root = render.root().expect("render root");
    render.layout_node(
        render_root,
        Constraints::tight(Size::new(30.0, 2.0)),
        false,
        &mut errors,
    );
    pipeline.flush_layout(&mut render);
    let mut buffer = Buffer::new(30, 2);
    {
        let mut canvas = Canvas::new(&mut buffer);
        pipeline.flush_paint(&mut render, &mut canvas);
    }

    // SGR wheel-up report at column 10, row 1 (1-based on the wire).
    let mut parser = InputParser::new();
    let events = parser.advance(b"\x1b[<64;10;1M");
    assert_eq!(events.len(), 1);
    let Event::Mouse(mouse) = events[0] else {
        panic!("expected a mouse event");
    };
    assert_eq!(mouse.button, MouseButton::WheelUp);
    assert_eq!((mouse.x, mouse.y), (9, 0));

    let innermost = render
        .hit_chain(mouse.x, mouse.y)
        .first()
        .copied()
        .expect("hit something");
    let owner = render.owner(innermost).expect("owning element");
    let handler = elements
        .dispatch_scroll(owner, &mouse)
        .expect("sink consumes the wheel");
    assert!(elements.is_stateful(handler));
}
