use crate::catalog::Catalog;
use crate::types::*;

mod geometry;
mod layout;

pub use geometry::{cyclic_quadrilateral_area, RoomShape};
pub use layout::best_grid;

/// Light loss factor applied to rated output.
pub const MAINTENANCE_FACTOR: f64 = 0.60;
/// Clearance kept between the walls and the outer fixtures, in meters.
pub const LAYOUT_MARGIN: f64 = 3.0;
pub const BEAM_ANGLE: f64 = 120.0;

/// Enumerates luminaire combinations and lays out fixtures for a room.
pub struct Planner {
    catalog: Catalog,
}

impl Planner {
    /// Validates the catalog and builds a new planner instance.
    pub fn new(catalog: Catalog) -> Result<Self> {
        catalog.validate()?;
        Ok(Self { catalog })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs the full planning flow for one room.
    ///
    /// Every returned result reaches the place's required illuminance. Results
    /// follow catalog order (luminaire, power, efficacy) and are not ranked.
    pub fn plan(&self, place: &str, sides: [f64; 4], height: f64) -> Result<LightingPlan> {
        if !height.is_finite() || height <= 0.0 {
            return Err(PlannerError::InvalidInput(format!(
                "height must be positive, got {}",
                height
            )));
        }

        let room = RoomShape::new(sides)?;
        let zone = Zone::from_height(height);
        let profile = self.catalog.profile_for(place)?;
        let spacing = self.catalog.spacing_constraint_for(zone);

        let mut results = Vec::new();
        for option in self.catalog.luminaire_options_for(zone, height) {
            for &power in &option.powers {
                for &efficacy in self.catalog.efficacy_for(zone) {
                    if let Some(result) =
                        self.evaluate(&option.name, power, efficacy, &room, &profile, &spacing)
                    {
                        results.push(result);
                    }
                }
            }
        }

        Ok(LightingPlan {
            zone,
            area: room.area,
            length: room.length,
            width: room.width,
            results,
        })
    }

    /// Sizes and lays out one combination; `None` when it misses the target
    /// or has no light output.
    fn evaluate(
        &self,
        luminaire: &str,
        power: f64,
        efficacy: f64,
        room: &RoomShape,
        profile: &SpaceProfile,
        spacing: &SpacingConstraint,
    ) -> Option<LightingResult> {
        let lumens = power * efficacy;
        if !(lumens > 0.0) {
            return None;
        }

        let total_lumens_needed = profile.required_lux * room.area / MAINTENANCE_FACTOR;
        let fixtures = fixture_count(total_lumens_needed, lumens)?;

        let (columns, rows) = best_grid(room.length, room.width, fixtures, LAYOUT_MARGIN);
        let spacing_x = (room.length - 2.0 * LAYOUT_MARGIN) / columns as f64;
        let spacing_y = (room.width - 2.0 * LAYOUT_MARGIN) / rows as f64;

        let average_lux = fixtures as f64 * lumens * MAINTENANCE_FACTOR / room.area;
        if average_lux < profile.required_lux {
            return None;
        }

        Some(LightingResult {
            luminaire: luminaire.to_string(),
            power,
            efficacy,
            fixtures,
            spacing_x: round2(spacing.clamp_x(spacing_x)),
            spacing_y: round2(spacing.clamp_y(spacing_y)),
            average_lux,
            uniformity: profile.required_uniformity,
            total_power: fixtures as f64 * power,
            beam_angle: BEAM_ANGLE,
            columns,
            rows,
        })
    }
}

/// `floor(needed / per_fixture) + 1`, so a layout always carries at least one
/// fixture beyond the bare lumen balance.
fn fixture_count(total_lumens_needed: f64, lumens_per_fixture: f64) -> Option<u32> {
    let count = (total_lumens_needed / lumens_per_fixture).floor() + 1.0;
    if count.is_finite() && count <= u32::MAX as f64 {
        Some(count as u32)
    } else {
        None
    }
}

/// Two decimals, ties to even (2.125 -> 2.12).
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
