//! Response draws from the exponential-family mean/variance relationship.
//!
//! For each observation `mu = g^-1(eta)`, `var = phi * V(mu)` and
//! `sd = sqrt(var)`; the family's sampler then draws `y` with that mean and
//! standard deviation.

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use tracing::debug;

use crate::error::GenerationError;
use crate::registry::ResponseModel;
use crate::validation::require_positive;

/// Draws the response vector for a linear predictor.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidParameter`] if `phi` is not finite and
/// strictly positive, and [`GenerationError::Domain`] if a mean leaves the
/// family's domain or a variance is negative or `NaN`. All checks run before
/// the first response is drawn.
///
/// # Example
///
/// ```
/// use glmm_data::{Family, Link, ResponseModel, generate_response};
/// use ndarray::array;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let model = ResponseModel::new(Family::Gamma, Link::Log);
/// let eta = array![0.0, 1.0, -1.0];
/// let y = generate_response(eta.view(), model, 0.6, &mut ChaCha8Rng::seed_from_u64(4))
///     .expect("response drawn");
///
/// assert!(y.iter().all(|&v| v > 0.0));
/// ```
pub fn generate_response<R>(
    eta: ArrayView1<'_, f64>,
    model: ResponseModel,
    phi: f64,
    rng: &mut R,
) -> Result<Array1<f64>, GenerationError>
where
    R: Rng + ?Sized,
{
    let dispersion = require_positive("phi", phi)?;
    let mu = model.mean(eta);
    let variance = model.variance(mu.view()) * dispersion;
    let sd = standard_deviation(model, &variance)?;

    let y = model.sample(mu.view(), sd.view(), rng)?;

    debug!(
        family = %model.family(),
        link = %model.link(),
        phi = dispersion,
        n_obs = y.len(),
        "responses drawn"
    );

    Ok(y)
}

fn standard_deviation(
    model: ResponseModel,
    variance: &Array1<f64>,
) -> Result<Array1<f64>, GenerationError> {
    if let Some((index, &value)) = variance
        .iter()
        .enumerate()
        .find(|&(_, &v)| v.is_nan() || v < 0.0)
    {
        return Err(GenerationError::Domain {
            family: model.family(),
            quantity: "variance",
            index,
            value,
            reason: "must be non-negative".to_owned(),
        });
    }
    Ok(variance.mapv(f64::sqrt))
}
