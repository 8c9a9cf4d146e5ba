//! Design-matrix synthesis.
//!
//! Builds the fixed-effect part of the dataset: a constant intercept column,
//! one i.i.d. standard-normal column per formula variable, and the linear
//! predictor `eta = X beta`.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::debug;

use crate::error::GenerationError;
use crate::formula::ParsedFormula;
use crate::validation::require_positive_count;

/// Covariates and the fixed-effect linear predictor for `n_obs` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    names: Vec<String>,
    x: Array2<f64>,
    eta: Array1<f64>,
}

impl DesignMatrix {
    /// Returns the column names, intercept first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the covariate matrix.
    #[must_use]
    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    /// Returns the linear predictor.
    #[must_use]
    pub fn eta(&self) -> ArrayView1<'_, f64> {
        self.eta.view()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.x.nrows()
    }

    pub(crate) fn eta_mut(&mut self) -> &mut Array1<f64> {
        &mut self.eta
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Array2<f64>, Array1<f64>) {
        (self.names, self.x, self.eta)
    }
}

/// Synthesizes the design matrix for a parsed formula.
///
/// Columns are filled in formula order; each non-intercept column takes `n_obs`
/// consecutive standard-normal draws from `rng`.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidParameter`] if `n_obs` is zero.
///
/// # Example
///
/// ```
/// use glmm_data::{generate_design, parse_formula};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let formula = parse_formula("y ~ 2 + 0.5*x1").expect("valid formula");
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let design = generate_design(&formula, 4, &mut rng).expect("generated");
///
/// assert_eq!(design.x().dim(), (4, 2));
/// assert!(design.x().column(0).iter().all(|&v| v == 1.0));
/// ```
pub fn generate_design<R>(
    formula: &ParsedFormula,
    n_obs: usize,
    rng: &mut R,
) -> Result<DesignMatrix, GenerationError>
where
    R: Rng + ?Sized,
{
    let rows = require_positive_count("n_obs", n_obs)?;
    let names = formula.variable_names().to_vec();
    let mut x = Array2::<f64>::ones((rows, names.len()));

    // Column 0 is the intercept and keeps its ones.
    for mut column in x.columns_mut().into_iter().skip(1) {
        for value in &mut column {
            *value = rng.sample(StandardNormal);
        }
    }

    let beta = Array1::from(formula.coefficients().to_vec());
    let eta = x.dot(&beta);

    debug!(
        n_obs = rows,
        n_columns = names.len(),
        "design matrix generated"
    );

    Ok(DesignMatrix { names, x, eta })
}
