use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Exterior option set used up to (and including) `up_to` meters.
/// A band without `up_to` covers every greater height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightBand {
    #[serde(default)]
    pub up_to: Option<f64>,
    pub option: LuminaireOption,
}

/// Read-only lookup tables the planner works from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub places: HashMap<String, SpaceProfile>,
    #[serde(default)]
    pub luminaire_shapes: HashMap<String, LuminaireShape>,
    pub interior_luminaires: Vec<LuminaireOption>,
    /// Listed for reference; exterior planning goes through `exterior_bands`
    #[serde(default)]
    pub exterior_luminaires: Vec<LuminaireOption>,
    pub exterior_bands: Vec<HeightBand>,
    pub interior_efficacy: Vec<f64>,
    pub exterior_efficacy: Vec<f64>,
    pub interior_spacing: SpacingConstraint,
    pub exterior_spacing: SpacingConstraint,
}

impl Default for Catalog {
    fn default() -> Self {
        let place = |lux: f64| SpaceProfile {
            required_lux: lux,
            required_uniformity: 0.5,
        };

        let places = [
            ("Room", 450.0),
            ("Office", 450.0),
            ("Cafe", 450.0),
            ("Factory production line", 350.0),
            ("Factory warehouse", 150.0),
        ]
        .into_iter()
        .map(|(name, lux)| (name.to_string(), place(lux)))
        .collect();

        let luminaire_shapes = HashMap::from([
            (
                "SC highbay".to_string(),
                LuminaireShape::Circle { diameter: 0.464 },
            ),
            (
                "SC backlight".to_string(),
                LuminaireShape::Square { size: 0.6 },
            ),
            (
                "SC triproof".to_string(),
                LuminaireShape::Rectangle {
                    width: 1.2,
                    height: 0.1,
                },
            ),
        ]);

        Self {
            places,
            luminaire_shapes,
            interior_luminaires: vec![
                LuminaireOption::new("SC downlight", &[9.0]),
                LuminaireOption::new("SC triproof", &[36.0]),
                LuminaireOption::new("SC backlight", &[36.0, 48.0]),
            ],
            exterior_luminaires: vec![
                LuminaireOption::new("SC highbay", &[100.0, 150.0, 200.0]),
                LuminaireOption::new("SC flood light exterior", &[100.0, 150.0, 200.0]),
            ],
            exterior_bands: vec![
                HeightBand {
                    up_to: Some(12.0),
                    option: LuminaireOption::new("SC highbay", &[100.0, 150.0]),
                },
                HeightBand {
                    up_to: None,
                    option: LuminaireOption::new("SC highbay", &[200.0]),
                },
            ],
            interior_efficacy: vec![110.0],
            exterior_efficacy: vec![145.0, 160.0, 200.0],
            interior_spacing: SpacingConstraint {
                min_x: 2.0,
                max_x: 4.0,
                min_y: 2.0,
                max_y: 4.0,
            },
            exterior_spacing: SpacingConstraint {
                min_x: 4.0,
                max_x: 7.0,
                min_y: 7.0,
                max_y: 12.0,
            },
        }
    }
}

impl Catalog {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(content)
            .map_err(|e| PlannerError::InvalidCatalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(content)
            .map_err(|e| PlannerError::InvalidCatalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Rejects tables the planner cannot work from.
    pub fn validate(&self) -> Result<()> {
        if self.places.is_empty() {
            return Err(PlannerError::InvalidCatalog(
                "At least one place must be defined".to_string(),
            ));
        }

        for (name, profile) in &self.places {
            if !(profile.required_lux > 0.0) {
                return Err(PlannerError::InvalidCatalog(format!(
                    "Place '{}' has non-positive required lux",
                    name
                )));
            }
        }

        let zones = [
            (Zone::Interior, &self.interior_efficacy, &self.interior_spacing),
            (Zone::Exterior, &self.exterior_efficacy, &self.exterior_spacing),
        ];
        for (zone, efficacy, spacing) in zones {
            if efficacy.is_empty() {
                return Err(PlannerError::InvalidCatalog(format!(
                    "No {} efficacy values",
                    zone
                )));
            }
            if efficacy.iter().any(|e| !(*e > 0.0)) {
                return Err(PlannerError::InvalidCatalog(format!(
                    "{} efficacy values must be positive",
                    zone
                )));
            }
            if spacing.min_x > spacing.max_x || spacing.min_y > spacing.max_y {
                return Err(PlannerError::InvalidCatalog(format!(
                    "{} spacing bounds are inverted",
                    zone
                )));
            }
        }

        if self.interior_luminaires.is_empty() {
            return Err(PlannerError::InvalidCatalog(
                "No interior luminaires".to_string(),
            ));
        }

        if !self.exterior_bands.iter().any(|band| band.up_to.is_none()) {
            return Err(PlannerError::InvalidCatalog(
                "Exterior bands must end with an open band".to_string(),
            ));
        }

        let options = self
            .interior_luminaires
            .iter()
            .chain(self.exterior_bands.iter().map(|band| &band.option));
        for option in options {
            if option.powers.is_empty() || option.powers.iter().any(|p| !(*p > 0.0)) {
                return Err(PlannerError::InvalidCatalog(format!(
                    "Luminaire '{}' needs at least one positive power",
                    option.name
                )));
            }
        }

        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn profile_for(&self, place: &str) -> Result<SpaceProfile> {
        self.places
            .get(place)
            .copied()
            .ok_or_else(|| PlannerError::UnknownPlace(place.to_string()))
    }

    pub fn luminaire_options_for(&self, zone: Zone, height: f64) -> Vec<LuminaireOption> {
        match zone {
            Zone::Interior => self.interior_luminaires.clone(),
            Zone::Exterior => self
                .exterior_bands
                .iter()
                .find(|band| band.up_to.map_or(true, |limit| height <= limit))
                .map(|band| vec![band.option.clone()])
                .unwrap_or_default(),
        }
    }

    pub fn efficacy_for(&self, zone: Zone) -> &[f64] {
        match zone {
            Zone::Interior => &self.interior_efficacy,
            Zone::Exterior => &self.exterior_efficacy,
        }
    }

    pub fn spacing_constraint_for(&self, zone: Zone) -> SpacingConstraint {
        match zone {
            Zone::Interior => self.interior_spacing,
            Zone::Exterior => self.exterior_spacing,
        }
    }

    /// Footprint used when drawing a luminaire; unlisted names get the default square.
    pub fn shape_for(&self, luminaire: &str) -> LuminaireShape {
        self.luminaire_shapes
            .get(luminaire)
            .copied()
            .unwrap_or_default()
    }

    /// Place names in display order.
    pub fn places(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.places.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
