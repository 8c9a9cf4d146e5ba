//! Registry of response families and link functions.
//!
//! The registry is an explicit value built once at startup and passed by
//! reference into the pipeline. It is the only place where external family
//! and link names are turned into [`Family`] and [`Link`] variants, so an
//! unknown name is reported before any data is generated.

use ndarray::{Array1, ArrayView1};
use rand::Rng;

use crate::error::GenerationError;
use crate::family::{Family, Link};

/// The set of families and links available to the generator.
///
/// # Example
///
/// ```
/// use glmm_data::{Family, FamilyRegistry, Link};
///
/// let registry = FamilyRegistry::new();
/// let model = registry.resolve("Gamma", "log").expect("registered");
///
/// assert_eq!(model.family(), Family::Gamma);
/// assert_eq!(model.link(), Link::Log);
/// assert!(registry.resolve("Poisson", "log").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyRegistry {
    families: Vec<Family>,
    links: Vec<Link>,
}

impl FamilyRegistry {
    /// Builds a registry containing every built-in family and link.
    #[must_use]
    pub fn new() -> Self {
        Self::with_entries(&Family::ALL, &Link::ALL)
    }

    /// Builds a registry restricted to the given families and links.
    ///
    /// Duplicate entries are ignored.
    #[must_use]
    pub fn with_entries(families: &[Family], links: &[Link]) -> Self {
        let mut registry = Self {
            families: Vec::with_capacity(families.len()),
            links: Vec::with_capacity(links.len()),
        };
        for &family in families {
            if !registry.families.contains(&family) {
                registry.families.push(family);
            }
        }
        for &link in links {
            if !registry.links.contains(&link) {
                registry.links.push(link);
            }
        }
        registry
    }

    /// Returns the registered families.
    #[must_use]
    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// Returns the registered links.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Looks up a family by its registered name.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnknownFamily`] if the name does not denote
    /// a registered family.
    pub fn family(&self, name: &str) -> Result<Family, GenerationError> {
        name.parse::<Family>()
            .ok()
            .filter(|family| self.families.contains(family))
            .ok_or_else(|| GenerationError::UnknownFamily {
                name: name.to_owned(),
            })
    }

    /// Looks up a link by its registered name.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnknownLink`] if the name does not denote a
    /// registered link.
    pub fn link(&self, name: &str) -> Result<Link, GenerationError> {
        name.parse::<Link>()
            .ok()
            .filter(|link| self.links.contains(link))
            .ok_or_else(|| GenerationError::UnknownLink {
                name: name.to_owned(),
            })
    }

    /// Resolves a family and a link name into a response model.
    ///
    /// The family is checked first.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnknownFamily`] or
    /// [`GenerationError::UnknownLink`] for unregistered names.
    pub fn resolve(&self, family: &str, link: &str) -> Result<ResponseModel, GenerationError> {
        Ok(ResponseModel::new(self.family(family)?, self.link(link)?))
    }
}

impl Default for FamilyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A family paired with the link that maps the linear predictor to its mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseModel {
    family: Family,
    link: Link,
}

impl ResponseModel {
    /// Pairs a family with a link.
    #[must_use]
    pub const fn new(family: Family, link: Link) -> Self {
        Self { family, link }
    }

    /// Returns the response family.
    #[must_use]
    pub const fn family(self) -> Family {
        self.family
    }

    /// Returns the link function.
    #[must_use]
    pub const fn link(self) -> Link {
        self.link
    }

    /// Maps the linear predictor to the mean, `mu = g^-1(eta)`.
    #[must_use]
    pub fn mean(self, eta: ArrayView1<'_, f64>) -> Array1<f64> {
        self.link.inverse_array(eta)
    }

    /// Evaluates the family's variance function at `mu`.
    #[must_use]
    pub fn variance(self, mu: ArrayView1<'_, f64>) -> Array1<f64> {
        self.family.variance(mu)
    }

    /// Draws responses through the family's sampler.
    ///
    /// # Errors
    ///
    /// Propagates [`GenerationError::Domain`] from [`Family::sample`].
    pub fn sample<R>(
        self,
        mu: ArrayView1<'_, f64>,
        sd: ArrayView1<'_, f64>,
        rng: &mut R,
    ) -> Result<Array1<f64>, GenerationError>
    where
        R: Rng + ?Sized,
    {
        self.family.sample(mu, sd, rng)
    }
}
