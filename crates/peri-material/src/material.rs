//! The [`MaterialModel`] trait.
//!
//! A material is a constitutive law plus the bookkeeping for its internal
//! variables. It owns parameters and a [`ConstitutiveVariables`] registry
//! but no storage: every call borrows buffers through a
//! [`MaterialContext`].

use peri_core::FieldSpec;

use crate::context::MaterialContext;
use crate::damage::DamageModel;
use crate::error::MaterialError;
use crate::variables::{ConstitutiveVariables, VariableKind};

/// A constitutive law evaluated over owned nodes and their bonds.
///
/// # Contract
///
/// - `&self`: materials keep no per-step state; internal variables live in
///   the context's variable views.
/// - Stateful variables are read at `N` and written at `N+1`. Promoting
///   `N+1` to `N` is the driver's job (`DataManager::update_state`) once a
///   step is accepted, so a rejected step is retried from unchanged `N`.
/// - Only `ctx.buffers` is written. Kinematics and topology are read-only.
/// - `compute_force` adds to `ctx.buffers.force`, never overwrites it.
/// - Within a step, `update_constitutive_data` runs before `compute_force`.
/// - Each operation iterates the owned nodes of `ctx.topology` in order,
///   then each node's bonds in neighbour-list order.
///
/// # Object safety
///
/// This trait is object-safe; drivers store materials as
/// `Box<dyn MaterialModel>`.
///
/// # Examples
///
/// A material that applies a uniform body force to every owned node:
///
/// ```
/// use peri_material::{ConstitutiveVariables, MaterialContext, MaterialError, MaterialModel};
///
/// struct Gravity {
///     vars: ConstitutiveVariables,
///     g: f64,
/// }
///
/// impl MaterialModel for Gravity {
///     fn name(&self) -> &str { "gravity" }
///     fn density(&self) -> f64 { 1.0 }
///     fn horizon(&self) -> f64 { 0.0 }
///     fn variables(&self) -> &ConstitutiveVariables { &self.vars }
///
///     fn initialize(&self, _ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
///         Ok(())
///     }
///
///     fn update_constitutive_data(
///         &self,
///         _ctx: &mut MaterialContext<'_>,
///     ) -> Result<(), MaterialError> {
///         Ok(())
///     }
///
///     fn compute_force(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
///         for &i in ctx.topology.owned_ids {
///             ctx.buffers.force[3 * i + 2] -= self.g;
///         }
///         Ok(())
///     }
/// }
///
/// let m = Gravity { vars: ConstitutiveVariables::new(), g: 9.81 };
/// assert_eq!(m.name(), "gravity");
/// assert_eq!(m.num_scalar_constitutive_variables(), 0);
/// assert!(m.scalar_variable_name(0).is_err());
/// ```
pub trait MaterialModel: Send + Sync {
    /// Human-readable name for logs and output labels.
    fn name(&self) -> &str;

    /// Mass density.
    fn density(&self) -> f64;

    /// Interaction radius.
    fn horizon(&self) -> f64;

    /// Registry of this material's internal variables.
    fn variables(&self) -> &ConstitutiveVariables;

    /// Damage model attenuating bond forces, if any.
    fn damage_model(&self) -> Option<&dyn DamageModel> {
        None
    }

    /// Number of scalar constitutive variables.
    fn num_scalar_constitutive_variables(&self) -> usize {
        self.variables().count(VariableKind::Scalar)
    }

    /// Number of vector constitutive variables.
    fn num_vector_constitutive_variables(&self) -> usize {
        self.variables().count(VariableKind::Vector)
    }

    /// Number of bond constitutive variables.
    fn num_bond_constitutive_variables(&self) -> usize {
        self.variables().count(VariableKind::Bond)
    }

    /// Name of scalar variable `pos`; errors unless `pos < count`.
    fn scalar_variable_name(&self, pos: usize) -> Result<&str, MaterialError> {
        self.variables().name(VariableKind::Scalar, pos)
    }

    /// Name of vector variable `pos`; errors unless `pos < count`.
    fn vector_variable_name(&self, pos: usize) -> Result<&str, MaterialError> {
        self.variables().name(VariableKind::Vector, pos)
    }

    /// Name of bond variable `pos`; errors unless `pos < count`.
    fn bond_variable_name(&self, pos: usize) -> Result<&str, MaterialError> {
        self.variables().name(VariableKind::Bond, pos)
    }

    /// Field specs a driver registers with its data manager to hold this
    /// material's internal variables, each with its temporal class.
    fn field_specs(&self) -> Vec<FieldSpec> {
        self.variables().field_specs()
    }

    /// Establish reference-configuration quantities before the first
    /// force evaluation.
    fn initialize(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError>;

    /// Recompute internal variables from the current kinematics.
    fn update_constitutive_data(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError>;

    /// Add this material's bond forces into `ctx.buffers.force`.
    fn compute_force(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError>;
}
