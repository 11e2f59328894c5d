use serde::Serialize;

/// Last key accepted by a keyboard component, with its reaction time in
/// seconds measured from the component's onset.
#[derive(Clone, Debug, Serialize)]
pub struct KeyPress {
    pub name: String,
    pub rt: f64,
}

/// One valid click collected by a mouse component. Coordinates are in
/// height units; `time` is seconds since the mouse component started.
#[derive(Clone, Debug, Serialize)]
pub struct ClickSample {
    pub x: f32,
    pub y: f32,
    pub left: bool,
    pub middle: bool,
    pub right: bool,
    pub time: f64,
    pub clicked_name: String,
}
