//! BDD step definitions for device status rendering

use chrono::{Local, NaiveTime, TimeZone};
use cucumber::{given, then, when};

use device_status::format::SignalRange;
use device_status::sse::SseEvent;
use device_status::{DeviceStatusError, Element, MemoryDisplay, SourceEvent, StatusHandlers};

use crate::world::DeviceStatusWorld;

fn parse_element(id: &str) -> Element {
    Element::from_id(id).unwrap_or_else(|| panic!("Unknown element: {}", id))
}

fn local_timestamp(time: &str) -> i64 {
    let time = NaiveTime::parse_from_str(time, "%H:%M").expect("time must be HH:MM");
    let date = chrono::NaiveDate::from_ymd_opt(2020, 3, 13).unwrap();
    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .expect("local time must exist")
        .timestamp()
}

fn deliver(world: &mut DeviceStatusWorld, event_type: &str, payload: &str) {
    let handlers = world.handlers.as_mut().expect("display not set");
    let event = SourceEvent::Message(SseEvent::new(event_type, payload));
    world.last_result = Some(handlers.handle_event(&event));
}

#[given(expr = "a signal range from {int} dBm to {int} dBm")]
fn signal_range(world: &mut DeviceStatusWorld, max_dbm: i32, min_dbm: i32) {
    world.signal_range = SignalRange {
        max_dbm: f64::from(max_dbm),
        min_dbm: f64::from(min_dbm),
    };
}

#[given("a status display with all elements")]
fn display_with_all_elements(world: &mut DeviceStatusWorld) {
    world.handlers = Some(StatusHandlers::new(
        MemoryDisplay::with_status_elements(),
        "deviceStatus",
        world.signal_range,
    ));
}

#[given(expr = "a status display without the {string} element")]
fn display_without_element(world: &mut DeviceStatusWorld, id: String) {
    let missing = parse_element(&id);
    let elements: Vec<Element> = Element::STATUS
        .into_iter()
        .filter(|e| *e != missing)
        .collect();
    world.handlers = Some(StatusHandlers::new(
        MemoryDisplay::new(&elements),
        "deviceStatus",
        world.signal_range,
    ));
}

#[when(expr = "a {string} event arrives with payload {string}")]
fn event_with_payload(world: &mut DeviceStatusWorld, event_type: String, payload: String) {
    deliver(world, &event_type, &payload);
}

#[when(expr = "a {string} event arrives with no payload")]
fn event_without_payload(world: &mut DeviceStatusWorld, event_type: String) {
    deliver(world, &event_type, "");
}

#[when(
    expr = "a {string} event arrives for local time {string} with ssid {string}, rssi {int} and voltage {float}"
)]
fn event_for_local_time(
    world: &mut DeviceStatusWorld,
    event_type: String,
    time: String,
    ssid: String,
    rssi: i32,
    voltage: f64,
) {
    let payload = serde_json::json!({
        "ts": local_timestamp(&time),
        "ssid": ssid,
        "rssi": rssi,
        "voltage": voltage,
    })
    .to_string();
    deliver(world, &event_type, &payload);
}

#[then("the event is accepted")]
fn event_accepted(world: &mut DeviceStatusWorld) {
    match world.last_result.as_ref().expect("no event delivered") {
        Ok(()) => {}
        Err(e) => panic!("Expected the event to be accepted, got: {}", e),
    }
}

#[then("the event is rejected as malformed JSON")]
fn event_rejected_json(world: &mut DeviceStatusWorld) {
    let result = world.last_result.as_ref().expect("no event delivered");
    assert!(
        matches!(result, Err(DeviceStatusError::Json(_))),
        "Expected a JSON error, got {:?}",
        result
    );
}

#[then(expr = "the event is rejected because element {string} is missing")]
fn event_rejected_missing(world: &mut DeviceStatusWorld, id: String) {
    match world.last_result.as_ref().expect("no event delivered") {
        Err(DeviceStatusError::MissingElement(missing)) => assert_eq!(missing, &id),
        other => panic!("Expected MissingElement({}), got {:?}", id, other),
    }
}

#[then(expr = "element {string} shows {string}")]
fn element_shows(world: &mut DeviceStatusWorld, id: String, expected: String) {
    let display = world.handlers.as_ref().expect("display not set").display();
    assert_eq!(
        display.text(parse_element(&id)),
        Some(expected.as_str()),
        "Unexpected content in {}",
        id
    );
}

#[then("no element was written")]
fn nothing_written(world: &mut DeviceStatusWorld) {
    let display = world.handlers.as_ref().expect("display not set").display();
    assert_eq!(display.writes(), 0);
}
