//! BDD step definitions for event stream parsing

use cucumber::gherkin::Step;
use cucumber::{given, then, when};

use device_status::sse::{SseLine, SseParser};

use crate::world::DeviceStatusWorld;

fn feed(world: &mut DeviceStatusWorld, line: &str) {
    match world.parser.feed_line(line) {
        SseLine::Pending => {}
        SseLine::Retry(ms) => world.retry_ms = Some(ms),
        SseLine::Event(event) => world.parsed_events.push(event),
    }
}

#[given("a fresh event stream parser")]
fn fresh_parser(world: &mut DeviceStatusWorld) {
    world.parser = SseParser::new();
    world.parsed_events.clear();
    world.retry_ms = None;
}

#[when("the stream delivers:")]
fn stream_delivers(world: &mut DeviceStatusWorld, step: &Step) {
    let text = step.docstring.as_ref().expect("step needs a doc string");
    for line in text.lines() {
        feed(world, line);
    }
}

#[when("the stream delivers a blank line")]
fn stream_delivers_blank(world: &mut DeviceStatusWorld) {
    feed(world, "");
}

#[then(expr = "{int} event(s) is/are dispatched")]
fn events_dispatched(world: &mut DeviceStatusWorld, count: usize) {
    assert_eq!(
        world.parsed_events.len(),
        count,
        "Dispatched events: {:?}",
        world.parsed_events
    );
}

#[then(expr = "event {int} has type {string} and data {string}")]
fn event_has(world: &mut DeviceStatusWorld, index: usize, event_type: String, data: String) {
    let event = &world.parsed_events[index - 1];
    assert_eq!(event.event_type, event_type);
    assert_eq!(event.data, data);
}

#[then(expr = "event {int} has {int} data lines")]
fn event_data_lines(world: &mut DeviceStatusWorld, index: usize, lines: usize) {
    let event = &world.parsed_events[index - 1];
    assert_eq!(event.data.split('\n').count(), lines);
}

#[then(expr = "the reconnection delay is {int} ms")]
fn reconnection_delay(world: &mut DeviceStatusWorld, ms: u64) {
    assert_eq!(world.retry_ms, Some(ms));
}

#[then(expr = "the last event id is {string}")]
fn last_event_id(world: &mut DeviceStatusWorld, id: String) {
    assert_eq!(world.parser.last_event_id(), id);
}
