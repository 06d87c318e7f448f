//! Request schema and the mapping from request keys to dataset columns

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dataset column holding the shape name
pub const SHAPE_COLUMN: &str = "Shape";

/// Feature column that carries the encoded shape
pub const SHAPE_CODE_COLUMN: &str = "Shape_num";

/// Target columns, in model output order
pub const TARGET_COLUMNS: [&str; 3] = ["Qout", "Qloss", "Efficiency (%)"];

/// Numeric input fields accepted by `/predict`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputField {
    SolarRadiation,
    CollectorArea,
    MassFlowRate,
    Velocity,
    InletTemp,
    OutletTemp,
    AmbientTemp,
    Nusselt,
    Distance,
}

impl InputField {
    /// Fields in validation order
    pub const ALL: [InputField; 9] = [
        InputField::SolarRadiation,
        InputField::CollectorArea,
        InputField::MassFlowRate,
        InputField::Velocity,
        InputField::InletTemp,
        InputField::OutletTemp,
        InputField::AmbientTemp,
        InputField::Nusselt,
        InputField::Distance,
    ];

    /// JSON key used by clients
    pub fn key(self) -> &'static str {
        match self {
            InputField::SolarRadiation => "solarRadiation",
            InputField::CollectorArea => "collectorArea",
            InputField::MassFlowRate => "massFlowRate",
            InputField::Velocity => "velocity",
            InputField::InletTemp => "inletTemp",
            InputField::OutletTemp => "outletTemp",
            InputField::AmbientTemp => "ambientTemp",
            InputField::Nusselt => "nusselt",
            InputField::Distance => "distance",
        }
    }

    /// Column name in the reference dataset
    pub fn column(self) -> &'static str {
        match self {
            InputField::SolarRadiation => "Intensity of Radiation (I) W/m2",
            InputField::CollectorArea => "Length of plate (L) m",
            InputField::MassFlowRate => "Breadth/Base (B) m",
            InputField::Velocity => "Velocity of air (V) m/s",
            InputField::InletTemp => "Temperature in (Ti) °C",
            InputField::OutletTemp => "Temperature out (To) °C",
            InputField::AmbientTemp => "Ambient Temperature (Tamb) °C",
            InputField::Nusselt => "Nusselt Number (Nu)",
            InputField::Distance => "Distance Between Plate and Glass (x) m",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.column() == column)
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Feature columns in model input order: the shape code followed by every input field.
///
/// Fitting records this list in the pipeline artifact and serving assembles
/// vectors from the recorded copy.
pub fn feature_columns() -> Vec<String> {
    std::iter::once(SHAPE_CODE_COLUMN)
        .chain(InputField::ALL.iter().map(|f| f.column()))
        .map(str::to_string)
        .collect()
}

/// Raw JSON value supplied for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Body of a `/predict` request
///
/// `null` and absent keys both deserialize to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub shape: Option<FieldValue>,
    pub solar_radiation: Option<FieldValue>,
    pub collector_area: Option<FieldValue>,
    pub mass_flow_rate: Option<FieldValue>,
    pub velocity: Option<FieldValue>,
    pub inlet_temp: Option<FieldValue>,
    pub outlet_temp: Option<FieldValue>,
    pub ambient_temp: Option<FieldValue>,
    pub nusselt: Option<FieldValue>,
    pub distance: Option<FieldValue>,
}

impl PredictRequest {
    pub fn field(&self, field: InputField) -> Option<&FieldValue> {
        match field {
            InputField::SolarRadiation => self.solar_radiation.as_ref(),
            InputField::CollectorArea => self.collector_area.as_ref(),
            InputField::MassFlowRate => self.mass_flow_rate.as_ref(),
            InputField::Velocity => self.velocity.as_ref(),
            InputField::InletTemp => self.inlet_temp.as_ref(),
            InputField::OutletTemp => self.outlet_temp.as_ref(),
            InputField::AmbientTemp => self.ambient_temp.as_ref(),
            InputField::Nusselt => self.nusselt.as_ref(),
            InputField::Distance => self.distance.as_ref(),
        }
    }

    pub fn set_field(&mut self, field: InputField, value: FieldValue) {
        let slot = match field {
            InputField::SolarRadiation => &mut self.solar_radiation,
            InputField::CollectorArea => &mut self.collector_area,
            InputField::MassFlowRate => &mut self.mass_flow_rate,
            InputField::Velocity => &mut self.velocity,
            InputField::InletTemp => &mut self.inlet_temp,
            InputField::OutletTemp => &mut self.outlet_temp,
            InputField::AmbientTemp => &mut self.ambient_temp,
            InputField::Nusselt => &mut self.nusselt,
            InputField::Distance => &mut self.distance,
        };
        *slot = Some(value);
    }
}
