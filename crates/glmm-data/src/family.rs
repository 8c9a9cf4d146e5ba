//! Exponential-family distributions and link functions.
//!
//! A response family contributes a variance function `V(mu)` and a sampler
//! that draws one observation per `(mu, sd)` pair; a link contributes the
//! inverse mapping from the linear predictor to the mean. Both are closed
//! enums, so adding a family is a compile-checked change to the `match`
//! arms below.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand_distr::{Distribution, Gamma, StandardNormal};

use crate::error::GenerationError;

/// An exponential-family response distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Normal responses with constant variance function.
    Gaussian,
    /// Gamma responses with constant coefficient of variation.
    Gamma,
}

impl Family {
    /// Every supported family, in registration order.
    pub const ALL: [Self; 2] = [Self::Gaussian, Self::Gamma];

    /// Returns the registered name of the family.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gaussian => "Gaussian",
            Self::Gamma => "Gamma",
        }
    }

    /// Returns the link used when a request does not name one.
    #[must_use]
    pub const fn default_link(self) -> Link {
        match self {
            Self::Gaussian => Link::Identity,
            Self::Gamma => Link::Log,
        }
    }

    /// Returns `true` when `mu` lies in the family's mean domain.
    ///
    /// ```
    /// use glmm_data::Family;
    ///
    /// assert!(Family::Gaussian.admits_mean(-3.0));
    /// assert!(!Family::Gamma.admits_mean(0.0));
    /// ```
    #[must_use]
    pub fn admits_mean(self, mu: f64) -> bool {
        match self {
            Self::Gaussian => mu.is_finite(),
            Self::Gamma => mu.is_finite() && mu > 0.0,
        }
    }

    /// Evaluates the variance function `V(mu)` elementwise.
    ///
    /// The response variance is `phi * V(mu)` for dispersion `phi`.
    ///
    /// ```
    /// use glmm_data::Family;
    /// use ndarray::array;
    ///
    /// let mu = array![0.5, 2.0];
    /// assert_eq!(Family::Gaussian.variance(mu.view()), array![1.0, 1.0]);
    /// assert_eq!(Family::Gamma.variance(mu.view()), array![0.25, 4.0]);
    /// ```
    #[must_use]
    pub fn variance(self, mu: ArrayView1<'_, f64>) -> Array1<f64> {
        match self {
            Self::Gaussian => Array1::ones(mu.len()),
            Self::Gamma => mu.mapv(|m| m * m),
        }
    }

    /// Draws one response per observation with the given means and standard
    /// deviations.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Domain`] if a mean lies outside the
    /// family's domain or, for `Gamma`, a standard deviation is not strictly
    /// positive. The check covers every observation before any value is
    /// drawn.
    pub fn sample<R>(
        self,
        mu: ArrayView1<'_, f64>,
        sd: ArrayView1<'_, f64>,
        rng: &mut R,
    ) -> Result<Array1<f64>, GenerationError>
    where
        R: Rng + ?Sized,
    {
        self.check_means(mu)?;
        match self {
            Self::Gaussian => Ok(sample_gaussian(mu, sd, rng)),
            Self::Gamma => sample_gamma(mu, sd, rng),
        }
    }

    fn check_means(self, mu: ArrayView1<'_, f64>) -> Result<(), GenerationError> {
        match mu.iter().position(|&m| !self.admits_mean(m)) {
            None => Ok(()),
            Some(index) => Err(GenerationError::Domain {
                family: self,
                quantity: "mean",
                index,
                value: mu.get(index).copied().unwrap_or(f64::NAN),
                reason: self.mean_domain().to_owned(),
            }),
        }
    }

    const fn mean_domain(self) -> &'static str {
        match self {
            Self::Gaussian => "must be finite",
            Self::Gamma => "must be finite and strictly positive",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.name() == s)
            .ok_or_else(|| GenerationError::UnknownFamily { name: s.to_owned() })
    }
}

/// A link function relating the mean to the linear predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    /// `g(mu) = mu`.
    Identity,
    /// `g(mu) = ln(mu)`; its inverse is strictly positive.
    Log,
}

impl Link {
    /// Every supported link, in registration order.
    pub const ALL: [Self; 2] = [Self::Identity, Self::Log];

    /// Returns the registered name of the link.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Log => "log",
        }
    }

    /// Applies the link `g(mu)`.
    #[must_use]
    pub fn apply(self, mu: f64) -> f64 {
        match self {
            Self::Identity => mu,
            Self::Log => mu.ln(),
        }
    }

    /// Applies the inverse link `g^-1(eta)`.
    #[must_use]
    pub fn inverse(self, eta: f64) -> f64 {
        match self {
            Self::Identity => eta,
            Self::Log => eta.exp(),
        }
    }

    /// Applies the inverse link to every element of `eta`.
    #[must_use]
    pub fn inverse_array(self, eta: ArrayView1<'_, f64>) -> Array1<f64> {
        eta.mapv(|e| self.inverse(e))
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Link {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|link| link.name() == s)
            .ok_or_else(|| GenerationError::UnknownLink { name: s.to_owned() })
    }
}

/// Draws `y = mu + sd * z` with `z` standard normal.
fn sample_gaussian<R>(mu: ArrayView1<'_, f64>, sd: ArrayView1<'_, f64>, rng: &mut R) -> Array1<f64>
where
    R: Rng + ?Sized,
{
    mu.iter()
        .zip(sd.iter())
        .map(|(&m, &s)| {
            let z: f64 = rng.sample(StandardNormal);
            m + s * z
        })
        .collect()
}

/// Draws one gamma value per observation with `shape = mu^2 / sd^2` and
/// `scale = sd^2 / mu`, which gives mean `mu` and standard deviation `sd`.
fn sample_gamma<R>(
    mu: ArrayView1<'_, f64>,
    sd: ArrayView1<'_, f64>,
    rng: &mut R,
) -> Result<Array1<f64>, GenerationError>
where
    R: Rng + ?Sized,
{
    if let Some((index, &s)) = sd
        .iter()
        .enumerate()
        .find(|&(_, &s)| !(s.is_finite() && s > 0.0))
    {
        return Err(GenerationError::Domain {
            family: Family::Gamma,
            quantity: "sd",
            index,
            value: s,
            reason: "must be finite and strictly positive".to_owned(),
        });
    }

    mu.iter()
        .zip(sd.iter())
        .enumerate()
        .map(|(index, (&m, &s))| {
            let variance = s * s;
            let shape = m * m / variance;
            let scale = variance / m;
            Gamma::new(shape, scale)
                .map(|dist| dist.sample(rng))
                .map_err(|err| GenerationError::Domain {
                    family: Family::Gamma,
                    quantity: "mean",
                    index,
                    value: m,
                    reason: err.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Covers variance functions, samplers, links, and name lookups.

    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    use super::*;

    fn sample_moments(values: &Array1<f64>) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.sum() / n;
        let variance = values.mapv(|v| (v - mean).powi(2)).sum() / (n - 1.0);
        (mean, variance)
    }

    #[rstest]
    #[case(array![-2.0, 0.0, 3.5])]
    #[case(array![1e-9, 1e9])]
    fn gaussian_variance_is_one(#[case] mu: Array1<f64>) {
        let variance = Family::Gaussian.variance(mu.view());
        assert!(variance.iter().all(|&v| v == 1.0));
        assert_eq!(variance.len(), mu.len());
    }

    #[rstest]
    #[case(array![0.5, 1.0, 4.0])]
    #[case(array![-2.0, 3.0])]
    fn gamma_variance_is_mu_squared(#[case] mu: Array1<f64>) {
        let variance = Family::Gamma.variance(mu.view());
        for (&v, &m) in variance.iter().zip(mu.iter()) {
            assert_relative_eq!(v, m * m);
        }
    }

    #[rstest]
    #[case(Family::Gaussian)]
    #[case(Family::Gamma)]
    fn variance_is_non_negative(#[case] family: Family) {
        let mu = array![0.01, 0.5, 1.0, 7.0, 120.0];
        assert!(family.variance(mu.view()).iter().all(|&v| v >= 0.0));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.5)]
    #[case(f64::NAN)]
    fn gamma_sampler_rejects_non_positive_mean(#[case] bad_mu: f64) {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mu = array![1.0, bad_mu, 2.0];
        let sd = array![0.5, 0.5, 0.5];

        let err = Family::Gamma
            .sample(mu.view(), sd.view(), &mut rng)
            .expect_err("non-positive mean must fail");

        assert!(matches!(
            err,
            GenerationError::Domain {
                family: Family::Gamma,
                quantity: "mean",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn gamma_sampler_rejects_zero_sd() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mu = array![1.0, 2.0];
        let sd = array![0.5, 0.0];

        let err = Family::Gamma
            .sample(mu.view(), sd.view(), &mut rng)
            .expect_err("zero sd must fail");

        assert!(matches!(
            err,
            GenerationError::Domain {
                quantity: "sd",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn gaussian_sampler_matches_requested_moments() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 50_000;
        let mu = Array1::from_elem(n, 2.5);
        let sd = Array1::from_elem(n, 1.3);

        let y = Family::Gaussian
            .sample(mu.view(), sd.view(), &mut rng)
            .expect("gaussian sampling succeeds");
        let (mean, variance) = sample_moments(&y);

        assert_relative_eq!(mean, 2.5, epsilon = 0.03);
        assert_relative_eq!(variance, 1.69, epsilon = 0.05);
    }

    #[test]
    fn gamma_sampler_matches_requested_moments() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let n = 100_000;
        let mu = Array1::from_elem(n, 0.6);
        let sd = Array1::from_elem(n, 1.3);

        let y = Family::Gamma
            .sample(mu.view(), sd.view(), &mut rng)
            .expect("gamma sampling succeeds");
        let (mean, variance) = sample_moments(&y);

        assert!(y.iter().all(|&v| v >= 0.0));
        assert_relative_eq!(mean, 0.6, epsilon = 0.03);
        assert_relative_eq!(variance.sqrt(), 1.3, epsilon = 0.1);
    }

    #[test]
    fn sampling_is_reproducible_for_a_seed() {
        let mu = array![1.0, 2.0, 3.0];
        let sd = array![0.1, 0.2, 0.3];

        let first = Family::Gamma
            .sample(mu.view(), sd.view(), &mut ChaCha8Rng::seed_from_u64(5))
            .expect("sampling succeeds");
        let second = Family::Gamma
            .sample(mu.view(), sd.view(), &mut ChaCha8Rng::seed_from_u64(5))
            .expect("sampling succeeds");

        assert_eq!(first, second);
    }

    #[rstest]
    #[case(Link::Identity, -1.25, -1.25)]
    #[case(Link::Identity, 3.0, 3.0)]
    #[case(Link::Log, 0.0, 1.0)]
    #[case(Link::Log, 1.0, std::f64::consts::E)]
    fn inverse_link_values(#[case] link: Link, #[case] eta: f64, #[case] expected: f64) {
        assert_relative_eq!(link.inverse(eta), expected);
    }

    #[test]
    fn log_inverse_is_strictly_positive() {
        let eta = array![-30.0, -1.0, 0.0, 5.0];
        assert!(Link::Log.inverse_array(eta.view()).iter().all(|&m| m > 0.0));
    }

    #[rstest]
    #[case(Link::Identity, 0.7)]
    #[case(Link::Log, 0.7)]
    #[case(Link::Log, 42.0)]
    fn link_apply_inverts_inverse(#[case] link: Link, #[case] mu: f64) {
        assert_relative_eq!(link.inverse(link.apply(mu)), mu, max_relative = 1e-12);
    }

    #[rstest]
    #[case("Gaussian", Family::Gaussian)]
    #[case("Gamma", Family::Gamma)]
    fn family_parses_registered_names(#[case] name: &str, #[case] expected: Family) {
        assert_eq!(name.parse::<Family>(), Ok(expected));
        assert_eq!(expected.to_string(), name);
    }

    #[rstest]
    #[case("gaussian")]
    #[case("Poisson")]
    #[case("")]
    fn family_rejects_unknown_names(#[case] name: &str) {
        assert_eq!(
            name.parse::<Family>(),
            Err(GenerationError::UnknownFamily {
                name: name.to_owned()
            })
        );
    }

    #[rstest]
    #[case("identity", Link::Identity)]
    #[case("log", Link::Log)]
    fn link_parses_registered_names(#[case] name: &str, #[case] expected: Link) {
        assert_eq!(name.parse::<Link>(), Ok(expected));
        assert_eq!(expected.to_string(), name);
    }

    #[test]
    fn link_rejects_unknown_names() {
        assert_eq!(
            "logit".parse::<Link>(),
            Err(GenerationError::UnknownLink {
                name: "logit".to_owned()
            })
        );
    }

    #[test]
    fn default_links_keep_means_admissible() {
        for family in Family::ALL {
            let mu = family.default_link().inverse(-4.0);
            assert!(family.admits_mean(mu), "{family} rejects its default link");
        }
    }
}
