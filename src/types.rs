use failure::Fail;
use serde_json::{json, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    Car,
    Motorcycle,
}

impl VehicleType {
    /// Numeric code the upstream form expects. Fixed by the external
    /// protocol, not configurable.
    pub fn code(self) -> &'static str {
        match self {
            VehicleType::Car => "1",
            VehicleType::Motorcycle => "2",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Motorcycle => "motorcycle",
        }
    }
}

impl FromStr for VehicleType {
    type Err = failure::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(VehicleType::Car),
            "motorcycle" => Ok(VehicleType::Motorcycle),
            other => Err(format_err!("unsupported vehicle type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub date: String,
    pub location: String,
    pub description: String,
}

impl Violation {
    pub fn to_json(&self) -> Value {
        json!({
            "date": self.date,
            "location": self.location,
            "description": self.description,
        })
    }
}

/// Terminal failure reasons for a whole lookup.
#[derive(Debug, Fail)]
pub enum LookupError {
    #[fail(display = "maximum retry attempts reached")]
    MaxRetriesExceeded,
    #[fail(display = "lookup failed: {}", _0)]
    Other(String),
}

/// Final result of a lookup. `NoViolations` and `Failed` are distinct on
/// purpose; the HTTP layer decides how to present each.
#[derive(Debug)]
pub enum Outcome {
    Violations(Vec<Violation>),
    NoViolations,
    Failed(LookupError),
}
