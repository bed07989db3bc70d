use crate::types::{PlannerError, Result};

/// Plan area of a quadrilateral from its four sides (Brahmagupta's formula).
///
/// Exact for cyclic quadrilaterals and used as an approximation otherwise.
/// Sides that cannot close a quadrilateral, or that collapse it to zero area,
/// are rejected rather than producing NaN.
pub fn cyclic_quadrilateral_area(a: f64, b: f64, c: f64, d: f64) -> Result<f64> {
    let s = (a + b + c + d) / 2.0;
    let factors = [s - a, s - b, s - c, s - d];

    if factors.iter().any(|f| *f <= 0.0) {
        return Err(PlannerError::Geometry(format!(
            "sides ({}, {}, {}, {}) do not form a quadrilateral: each side must be shorter than the other three combined",
            a, b, c, d
        )));
    }

    Ok(factors.iter().product::<f64>().sqrt())
}

/// Room footprint described by its four sides, A-B-C-D in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomShape {
    pub sides: [f64; 4],
    pub area: f64,
    /// `max(A, C)`
    pub length: f64,
    /// `max(B, D)`
    pub width: f64,
}

impl RoomShape {
    pub fn new(sides: [f64; 4]) -> Result<Self> {
        if let Some(side) = sides.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(PlannerError::InvalidInput(format!(
                "side lengths must be positive, got {}",
                side
            )));
        }

        let [a, b, c, d] = sides;
        let area = cyclic_quadrilateral_area(a, b, c, d)?;

        Ok(Self {
            sides,
            area,
            length: a.max(c),
            width: b.max(d),
        })
    }
}
