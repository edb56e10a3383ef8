//! Material configuration, validation, and the material factory.
//!
//! [`MaterialConfig`] is the builder-input for a material. It is parsed
//! from an ordered parameter map, [`validate()`](MaterialConfig::validate)
//! checks every value, and [`build()`](MaterialConfig::build) selects the
//! concrete law.

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use peri_material::{DamageModel, MaterialModel};

use crate::damage::CriticalStretchDamage;
use crate::elastic::ElasticMaterial;
use crate::elastic_plastic::ElasticPlasticMaterial;

/// Parameter key: bulk modulus `K`.
pub const BULK_MODULUS: &str = "bulk_modulus";
/// Parameter key: shear modulus `μ`.
pub const SHEAR_MODULUS: &str = "shear_modulus";
/// Parameter key: horizon `δ`.
pub const HORIZON: &str = "horizon";
/// Parameter key: mass density `ρ`.
pub const DENSITY: &str = "density";
/// Parameter key: yield stress `σy`.
pub const YIELD_STRESS: &str = "yield_stress";
/// Parameter key: critical stretch of the optional damage model.
pub const CRITICAL_STRETCH: &str = "critical_stretch";

const KNOWN_PARAMETERS: [&str; 6] = [
    BULK_MODULUS,
    SHEAR_MODULUS,
    HORIZON,
    DENSITY,
    YIELD_STRESS,
    CRITICAL_STRETCH,
];

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while parsing or validating a material configuration.
///
/// All are setup mistakes: they surface before any model exists.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The material type name is not recognised.
    UnknownMaterial {
        /// The name as given.
        name: String,
    },
    /// A parameter key no material understands.
    UnknownParameter {
        /// The key as given.
        name: String,
    },
    /// A required parameter was not supplied.
    MissingParameter {
        /// The parameter key.
        name: &'static str,
        /// Material that requires it.
        material: &'static str,
    },
    /// A parameter value is NaN, infinite, zero, or negative.
    InvalidParameter {
        /// The parameter key.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMaterial { name } => write!(f, "unknown material type '{name}'"),
            Self::UnknownParameter { name } => write!(f, "unknown material parameter '{name}'"),
            Self::MissingParameter { name, material } => {
                write!(f, "material '{material}' requires parameter '{name}'")
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "parameter '{name}' must be finite and > 0, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── MaterialKind ───────────────────────────────────────────────────

/// The constitutive law a configuration selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// [`ElasticMaterial`].
    Elastic,
    /// [`ElasticPlasticMaterial`].
    ElasticPlastic,
}

impl MaterialKind {
    /// Display name, as reported by [`MaterialModel::name`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Elastic => "Elastic",
            Self::ElasticPlastic => "Elastic Plastic",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive; spaces, hyphens, and underscores are interchangeable,
/// so `"Elastic Plastic"` and `"elastic_plastic"` both parse.
impl FromStr for MaterialKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match key.as_str() {
            "elastic" => Ok(Self::Elastic),
            "elastic_plastic" => Ok(Self::ElasticPlastic),
            _ => Err(ConfigError::UnknownMaterial { name: s.to_string() }),
        }
    }
}

// ── MaterialParams ─────────────────────────────────────────────────

/// Scalar parameters shared by the reference materials.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialParams {
    /// Bulk modulus `K`.
    pub bulk_modulus: f64,
    /// Shear modulus `μ`.
    pub shear_modulus: f64,
    /// Horizon `δ`.
    pub horizon: f64,
    /// Mass density `ρ`.
    pub density: f64,
    /// Yield stress `σy`; required by elastic-plastic materials.
    pub yield_stress: Option<f64>,
    /// Attach a [`CriticalStretchDamage`] with this threshold.
    pub critical_stretch: Option<f64>,
}

impl MaterialParams {
    /// Elastic parameters with no yield stress and no damage.
    pub fn new(bulk_modulus: f64, shear_modulus: f64, horizon: f64, density: f64) -> Self {
        Self {
            bulk_modulus,
            shear_modulus,
            horizon,
            density,
            yield_stress: None,
            critical_stretch: None,
        }
    }

    /// Set the yield stress.
    pub fn with_yield_stress(mut self, yield_stress: f64) -> Self {
        self.yield_stress = Some(yield_stress);
        self
    }

    /// Set the critical stretch.
    pub fn with_critical_stretch(mut self, critical_stretch: f64) -> Self {
        self.critical_stretch = Some(critical_stretch);
        self
    }

    /// Parse from an ordered `name → value` map and validate for `kind`.
    pub fn from_map(kind: MaterialKind, map: &IndexMap<String, f64>) -> Result<Self, ConfigError> {
        if let Some(unknown) = map.keys().find(|k| !KNOWN_PARAMETERS.contains(&k.as_str())) {
            return Err(ConfigError::UnknownParameter {
                name: unknown.clone(),
            });
        }
        let required = |name: &'static str| {
            map.get(name).copied().ok_or(ConfigError::MissingParameter {
                name,
                material: kind.name(),
            })
        };
        let params = Self {
            bulk_modulus: required(BULK_MODULUS)?,
            shear_modulus: required(SHEAR_MODULUS)?,
            horizon: required(HORIZON)?,
            density: required(DENSITY)?,
            yield_stress: map.get(YIELD_STRESS).copied(),
            critical_stretch: map.get(CRITICAL_STRETCH).copied(),
        };
        params.validate(kind)?;
        Ok(params)
    }

    /// Check every present value is finite and positive, and that `kind`'s
    /// required parameters are present.
    pub fn validate(&self, kind: MaterialKind) -> Result<(), ConfigError> {
        positive(BULK_MODULUS, self.bulk_modulus)?;
        positive(SHEAR_MODULUS, self.shear_modulus)?;
        positive(HORIZON, self.horizon)?;
        positive(DENSITY, self.density)?;
        match (kind, self.yield_stress) {
            (_, Some(y)) => positive(YIELD_STRESS, y)?,
            (MaterialKind::ElasticPlastic, None) => {
                return Err(ConfigError::MissingParameter {
                    name: YIELD_STRESS,
                    material: kind.name(),
                })
            }
            (MaterialKind::Elastic, None) => {}
        }
        if let Some(s) = self.critical_stretch {
            positive(CRITICAL_STRETCH, s)?;
        }
        Ok(())
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

// ── MaterialConfig ─────────────────────────────────────────────────

/// A material type plus its parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialConfig {
    /// Constitutive law to build.
    pub kind: MaterialKind,
    /// Its parameters.
    pub params: MaterialParams,
}

impl MaterialConfig {
    /// Pair a kind with parameters. Nothing is checked until
    /// [`validate`](Self::validate) or [`build`](Self::build).
    pub fn new(kind: MaterialKind, params: MaterialParams) -> Self {
        Self { kind, params }
    }

    /// Parse a material type name and its parameter map.
    ///
    /// ```
    /// use indexmap::IndexMap;
    /// use peri_materials::MaterialConfig;
    ///
    /// let mut map = IndexMap::new();
    /// map.insert("bulk_modulus".to_string(), 100.0e9);
    /// map.insert("shear_modulus".to_string(), 60.0e9);
    /// map.insert("horizon".to_string(), 0.003);
    /// map.insert("density".to_string(), 7800.0);
    /// map.insert("yield_stress".to_string(), 3.0e8);
    ///
    /// let material = MaterialConfig::from_map("Elastic Plastic", &map)
    ///     .and_then(|cfg| cfg.build())
    ///     .unwrap();
    /// assert_eq!(material.name(), "Elastic Plastic");
    /// assert_eq!(material.num_bond_constitutive_variables(), 1);
    /// ```
    pub fn from_map(material: &str, map: &IndexMap<String, f64>) -> Result<Self, ConfigError> {
        let kind = material.parse()?;
        let params = MaterialParams::from_map(kind, map)?;
        Ok(Self { kind, params })
    }

    /// Check the parameters against the selected law.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate(self.kind)
    }

    /// Validate and construct the selected material, attaching a
    /// critical-stretch damage model when one is configured.
    pub fn build(&self) -> Result<Box<dyn MaterialModel>, ConfigError> {
        self.validate()?;
        let damage = self
            .params
            .critical_stretch
            .map(CriticalStretchDamage::new)
            .transpose()?
            .map(|d| Arc::new(d) as Arc<dyn DamageModel>);
        let material: Box<dyn MaterialModel> = match self.kind {
            MaterialKind::Elastic => {
                let m = ElasticMaterial::new(&self.params)?;
                match damage {
                    Some(d) => Box::new(m.with_damage_model(d)),
                    None => Box::new(m),
                }
            }
            MaterialKind::ElasticPlastic => {
                let m = ElasticPlasticMaterial::new(&self.params)?;
                match damage {
                    Some(d) => Box::new(m.with_damage_model(d)),
                    None => Box::new(m),
                }
            }
        };
        Ok(material)
    }
}
