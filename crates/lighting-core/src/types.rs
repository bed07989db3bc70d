use serde::{Deserialize, Serialize};
use std::fmt;

/// Installation zone, derived from mounting height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Interior,
    Exterior,
}

impl Zone {
    /// Heights strictly below this are interior.
    pub const EXTERIOR_FROM_HEIGHT: f64 = 5.0;

    pub fn from_height(height: f64) -> Self {
        if height < Self::EXTERIOR_FROM_HEIGHT {
            Zone::Interior
        } else {
            Zone::Exterior
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Interior => write!(f, "interior"),
            Zone::Exterior => write!(f, "exterior"),
        }
    }
}

/// Illuminance targets for a kind of space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceProfile {
    pub required_lux: f64,
    pub required_uniformity: f64,
}

/// A luminaire and the rated powers (W) it is offered in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuminaireOption {
    pub name: String,
    pub powers: Vec<f64>,
}

impl LuminaireOption {
    pub fn new(name: impl Into<String>, powers: &[f64]) -> Self {
        Self {
            name: name.into(),
            powers: powers.to_vec(),
        }
    }
}

/// Physical footprint of a luminaire, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum LuminaireShape {
    Circle { diameter: f64 },
    Square { size: f64 },
    Rectangle { width: f64, height: f64 },
}

impl LuminaireShape {
    /// Extent along the room length and width axes.
    pub fn extent(&self) -> (f64, f64) {
        match *self {
            LuminaireShape::Circle { diameter } => (diameter, diameter),
            LuminaireShape::Square { size } => (size, size),
            LuminaireShape::Rectangle { width, height } => (width, height),
        }
    }
}

impl Default for LuminaireShape {
    fn default() -> Self {
        LuminaireShape::Square { size: 0.5 }
    }
}

/// Allowed fixture spacing per axis, in meters (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingConstraint {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl SpacingConstraint {
    pub fn clamp_x(&self, spacing: f64) -> f64 {
        spacing.min(self.max_x).max(self.min_x)
    }

    pub fn clamp_y(&self, spacing: f64) -> f64 {
        spacing.min(self.max_y).max(self.min_y)
    }
}

/// One luminaire/power/efficacy combination that meets the target.
///
/// Field labels are the ones existing report consumers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingResult {
    #[serde(rename = "Luminaire")]
    pub luminaire: String,
    #[serde(rename = "Power (W)")]
    pub power: f64,
    #[serde(rename = "Efficacy (lm/W)")]
    pub efficacy: f64,
    #[serde(rename = "Fixtures")]
    pub fixtures: u32,
    /// Rounded to 2 decimals, like `spacing_y`
    #[serde(rename = "Spacing X (m)")]
    pub spacing_x: f64,
    #[serde(rename = "Spacing Y (m)")]
    pub spacing_y: f64,
    #[serde(rename = "Average Lux")]
    pub average_lux: f64,
    #[serde(rename = "Uniformity")]
    pub uniformity: f64,
    #[serde(rename = "Total Power (W)")]
    pub total_power: f64,
    #[serde(rename = "Beam Angle (°)")]
    pub beam_angle: f64,
    #[serde(rename = "Columns", default)]
    pub columns: u32,
    #[serde(rename = "Rows", default)]
    pub rows: u32,
}

impl LightingResult {
    /// Column headers, in serialization order.
    pub const LABELS: [&'static str; 12] = [
        "Luminaire",
        "Power (W)",
        "Efficacy (lm/W)",
        "Fixtures",
        "Spacing X (m)",
        "Spacing Y (m)",
        "Average Lux",
        "Uniformity",
        "Total Power (W)",
        "Beam Angle (°)",
        "Columns",
        "Rows",
    ];

    /// Cell values matching [`LightingResult::LABELS`].
    pub fn cells(&self) -> [String; 12] {
        [
            self.luminaire.clone(),
            self.power.to_string(),
            self.efficacy.to_string(),
            self.fixtures.to_string(),
            self.spacing_x.to_string(),
            self.spacing_y.to_string(),
            self.average_lux.to_string(),
            self.uniformity.to_string(),
            self.total_power.to_string(),
            self.beam_angle.to_string(),
            self.columns.to_string(),
            self.rows.to_string(),
        ]
    }
}

/// Output of a planner run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingPlan {
    pub zone: Zone,
    pub area: f64,
    pub length: f64,
    pub width: f64,
    /// In catalog order (luminaire, then power, then efficacy); not ranked
    pub results: Vec<LightingResult>,
}

/// Client details carried alongside a calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(rename = "Project Name", default)]
    pub project_name: String,
    #[serde(rename = "Client Name", default)]
    pub client_name: String,
    #[serde(rename = "Client Number", default)]
    pub client_number: String,
    #[serde(rename = "Company Name", default)]
    pub company_name: String,
}

impl ProjectInfo {
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("Project Name", &self.project_name),
            ("Client Name", &self.client_name),
            ("Client Number", &self.client_number),
            ("Company Name", &self.company_name),
        ]
    }
}

/// Input: What user provides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub place: String,
    /// Side lengths A, B, C, D in meters, in order around the room
    pub sides: [f64; 4],
    /// Mounting height in meters
    pub height: f64,
    #[serde(default)]
    pub project_info: ProjectInfo,
}

/// One past calculation, as kept in the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub project_info: ProjectInfo,
    pub results: Vec<LightingResult>,
}

/// Error type for planning
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Degenerate room geometry: {0}")]
    Geometry(String),

    #[error("Unknown place: {0}")]
    UnknownPlace(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Rendering failed")]
    Render(#[from] fmt::Error),

    #[error("PDF export failed: {0}")]
    Pdf(String),
}

impl PlannerError {
    /// True for errors caused by the caller's request rather than the service.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PlannerError::Geometry(_) | PlannerError::UnknownPlace(_) | PlannerError::InvalidInput(_)
        )
    }

    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::Geometry(_) => "geometry",
            PlannerError::UnknownPlace(_) => "unknown_place",
            PlannerError::InvalidInput(_) => "invalid_input",
            PlannerError::InvalidCatalog(_) => "invalid_catalog",
            PlannerError::Render(_) => "render",
            PlannerError::Pdf(_) => "pdf",
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
