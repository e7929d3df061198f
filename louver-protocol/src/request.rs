//! Control request parsing
//!
//! Two endpoints: `status`, and `control?key=value[&key=value…]`. A
//! leading `/` is accepted so raw HTTP-style paths parse too. The pairs
//! of one query are executed in order.

use heapless::Vec;

/// Most key/value pairs accepted in one query
pub const MAX_PAIRS: usize = 8;

/// Parsed request line
pub type Request = Vec<ControlRequest, MAX_PAIRS>;

/// Argument of `stepper_move`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveRequest {
    /// Jog toward the lower limit
    Left,
    /// Jog toward the upper limit
    Right,
    /// Absolute move to step 0
    Home,
    /// Relative move in steps
    Steps(i32),
    /// Relative move in millimeters
    Millimeters(f32),
}

/// One control operation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlRequest {
    /// `stepper_enable=0|1`
    Enable(bool),
    /// `stepper_move=left|right|home|<steps>|<mm>`
    Move(MoveRequest),
    /// `stepper_position=<steps>`, absolute
    Position(i32),
    /// `stepper_speed=<steps/s>`
    Speed(f32),
    /// `stepper_acceleration=<steps/s²>`
    Acceleration(f32),
    /// `stepper_stop=1`
    Stop,
    /// `stepper_auto=0|1`
    Auto(bool),
    /// `status`
    Status,
}

/// Request parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Blank line
    Empty,
    /// Bytes are not UTF-8
    NotUtf8,
    /// Path is neither `control` nor `status`
    UnknownEndpoint,
    /// `control` without any key/value pair
    EmptyQuery,
    /// Pair without `=`
    MissingValue,
    /// Key not recognized
    UnknownKey,
    /// Value malformed or out of range for its key
    InvalidValue,
    /// More than [`MAX_PAIRS`] pairs
    TooManyPairs,
}

impl ParseError {
    /// Short reason used in `ERR` replies
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseError::Empty => "empty",
            ParseError::NotUtf8 => "not-utf8",
            ParseError::UnknownEndpoint => "unknown-endpoint",
            ParseError::EmptyQuery => "empty-query",
            ParseError::MissingValue => "missing-value",
            ParseError::UnknownKey => "unknown-key",
            ParseError::InvalidValue => "invalid-value",
            ParseError::TooManyPairs => "too-many-pairs",
        }
    }
}

/// Parse one request line from raw bytes
pub fn parse_request(line: &[u8]) -> Result<Request, ParseError> {
    let line = core::str::from_utf8(line).map_err(|_| ParseError::NotUtf8)?;
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }
    let line = line.strip_prefix('/').unwrap_or(line);

    let (path, query) = match line.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (line, None),
    };

    let mut request = Request::new();
    match (path, query) {
        ("status", None) => {
            // Capacity is at least one
            let _ = request.push(ControlRequest::Status);
        }
        ("control", Some(query)) => {
            for pair in query.split('&').filter(|pair| !pair.is_empty()) {
                let parsed = parse_pair(pair)?;
                request.push(parsed).map_err(|_| ParseError::TooManyPairs)?;
            }
            if request.is_empty() {
                return Err(ParseError::EmptyQuery);
            }
        }
        ("control", None) => return Err(ParseError::EmptyQuery),
        _ => return Err(ParseError::UnknownEndpoint),
    }
    Ok(request)
}

fn parse_pair(pair: &str) -> Result<ControlRequest, ParseError> {
    let (key, value) = pair.split_once('=').ok_or(ParseError::MissingValue)?;
    let value = value.trim();

    match key.trim() {
        "stepper_enable" => parse_flag(value).map(ControlRequest::Enable),
        "stepper_move" => parse_move(value).map(ControlRequest::Move),
        "stepper_position" => parse_steps(value).map(ControlRequest::Position),
        "stepper_speed" => parse_float(value).map(ControlRequest::Speed),
        "stepper_acceleration" => parse_float(value).map(ControlRequest::Acceleration),
        "stepper_stop" => match value {
            "1" => Ok(ControlRequest::Stop),
            _ => Err(ParseError::InvalidValue),
        },
        "stepper_auto" => parse_flag(value).map(ControlRequest::Auto),
        _ => Err(ParseError::UnknownKey),
    }
}

fn parse_flag(value: &str) -> Result<bool, ParseError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_steps(value: &str) -> Result<i32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_move(value: &str) -> Result<MoveRequest, ParseError> {
    match value {
        "left" => Ok(MoveRequest::Left),
        "right" => Ok(MoveRequest::Right),
        "home" => Ok(MoveRequest::Home),
        _ => match value.parse::<i32>() {
            Ok(steps) => Ok(MoveRequest::Steps(steps)),
            Err(_) => parse_float(value).map(MoveRequest::Millimeters),
        },
    }
}
