//! Group-level random intercepts.
//!
//! Draws one normal intercept per group, optionally centres them on their
//! sample mean, assigns every observation uniformly to a group, and adds the
//! group's intercept to the observation's linear predictor exactly once.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::design::DesignMatrix;
use crate::error::GenerationError;
use crate::validation::{require_non_negative, require_positive_count};

/// Settings for the random-intercept stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomIntercept {
    /// Number of groups; must be positive.
    pub n_groups: usize,
    /// Standard deviation of the group intercepts; must be non-negative.
    pub group_sd: f64,
    /// Subtract the sample mean so the realized intercepts average zero.
    pub center_sample: bool,
}

impl RandomIntercept {
    /// Checks the group count and standard deviation.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidParameter`] for a zero group count
    /// or a negative or non-finite standard deviation.
    pub fn validate(&self) -> Result<(), GenerationError> {
        require_positive_count("n_groups", self.n_groups)?;
        require_non_negative("group_sd", self.group_sd)?;
        Ok(())
    }
}

/// Mapping from group index to its random intercept.
///
/// Serializes as a JSON object keyed by group index.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEffects {
    intercepts: Vec<f64>,
}

impl GroupEffects {
    /// Returns the number of groups.
    #[must_use]
    pub fn n_groups(&self) -> usize {
        self.intercepts.len()
    }

    /// Returns the intercept of `group`, if it exists.
    #[must_use]
    pub fn get(&self, group: usize) -> Option<f64> {
        self.intercepts.get(group).copied()
    }

    /// Returns the intercepts ordered by group index.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.intercepts
    }

    /// Iterates over `(group, intercept)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.intercepts.iter().copied().enumerate()
    }

    /// Returns the arithmetic mean of the intercepts.
    #[must_use]
    pub fn mean(&self) -> f64 {
        mean(&self.intercepts)
    }
}

impl Serialize for GroupEffects {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.intercepts.len()))?;
        for (group, intercept) in self.iter() {
            map.serialize_entry(&group, &intercept)?;
        }
        map.end()
    }
}

/// Outcome of the random-intercept stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAssignment {
    /// Group of each observation, in `[0, n_groups)`.
    pub group_index: Vec<usize>,
    /// Intercept drawn for each group.
    pub effects: GroupEffects,
}

/// Adds a random intercept per group to the design's linear predictor.
///
/// Intercepts are drawn from `intercept_rng` and memberships from
/// `assignment_rng`; passing independent streams keeps the two
/// uncorrelated.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidParameter`] if `settings` fails
/// [`RandomIntercept::validate`]. The design is left untouched on error.
///
/// # Example
///
/// ```
/// use glmm_data::{RandomIntercept, add_random_intercept, generate_design, parse_formula};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let formula = parse_formula("y ~ 1").expect("valid formula");
/// let mut design = generate_design(&formula, 20, &mut ChaCha8Rng::seed_from_u64(1))
///     .expect("design");
/// let settings = RandomIntercept { n_groups: 4, group_sd: 2.0, center_sample: true };
/// let assignment = add_random_intercept(
///     &mut design,
///     &settings,
///     &mut ChaCha8Rng::seed_from_u64(2),
///     &mut ChaCha8Rng::seed_from_u64(3),
/// )
/// .expect("random intercept");
///
/// assert_eq!(assignment.effects.n_groups(), 4);
/// assert!(assignment.effects.mean().abs() < 1e-9);
/// ```
pub fn add_random_intercept<R1, R2>(
    design: &mut DesignMatrix,
    settings: &RandomIntercept,
    intercept_rng: &mut R1,
    assignment_rng: &mut R2,
) -> Result<GroupAssignment, GenerationError>
where
    R1: Rng + ?Sized,
    R2: Rng + ?Sized,
{
    settings.validate()?;

    let effects = draw_group_effects(settings, intercept_rng);
    let group_index: Vec<usize> = (0..design.n_obs())
        .map(|_| assignment_rng.random_range(0..settings.n_groups))
        .collect();

    for (eta, &group) in design.eta_mut().iter_mut().zip(&group_index) {
        // Memberships are drawn from 0..n_groups, so the lookup always hits.
        *eta += effects.get(group).unwrap_or_default();
    }

    debug!(
        n_groups = settings.n_groups,
        group_sd = settings.group_sd,
        center_sample = settings.center_sample,
        "random intercepts added"
    );

    Ok(GroupAssignment {
        group_index,
        effects,
    })
}

fn draw_group_effects<R>(settings: &RandomIntercept, rng: &mut R) -> GroupEffects
where
    R: Rng + ?Sized,
{
    let mut intercepts: Vec<f64> = (0..settings.n_groups)
        .map(|_| {
            let z: f64 = rng.sample(StandardNormal);
            z * settings.group_sd
        })
        .collect();

    if settings.center_sample {
        // Sample-mean centring: the realized mean is zero, the draws are not
        // from a zero-sum constrained distribution.
        let offset = mean(&intercepts);
        for intercept in &mut intercepts {
            *intercept -= offset;
        }
    }

    GroupEffects { intercepts }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
