//! Generated dataset and column naming.
//!
//! The column names defined here are the contract shared with downstream
//! model fitters: the intercept, one column per formula variable, the linear
//! predictor, the group index, and the response, in that order.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Name of the constant intercept column.
pub const INTERCEPT_COLUMN: &str = "Intercept";

/// Name of the linear-predictor column.
pub const ETA_COLUMN: &str = "eta";

/// Name of the group-index column.
pub const GROUP_INDEX_COLUMN: &str = "group_index";

/// Name of the response column.
pub const RESPONSE_COLUMN: &str = "y";

/// A borrowed dataset column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Column<'a> {
    /// A real-valued column.
    Real(ArrayView1<'a, f64>),
    /// The integer group-index column.
    Index(&'a [usize]),
}

/// A table of synthetic observations, one row per unit.
///
/// The design matrix holds the intercept and covariate columns in formula
/// order. The linear predictor includes each observation's group intercept.
/// A dataset is immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    design_names: Vec<String>,
    design: Array2<f64>,
    eta: Array1<f64>,
    group_index: Vec<usize>,
    response: Array1<f64>,
}

impl Dataset {
    /// Assembles a dataset from columns of equal length.
    pub(crate) fn from_parts(
        design_names: Vec<String>,
        design: Array2<f64>,
        eta: Array1<f64>,
        group_index: Vec<usize>,
        response: Array1<f64>,
    ) -> Self {
        debug_assert_eq!(design_names.len(), design.ncols());
        debug_assert_eq!(design.nrows(), eta.len());
        debug_assert_eq!(eta.len(), group_index.len());
        debug_assert_eq!(eta.len(), response.len());
        Self {
            design_names,
            design,
            eta,
            group_index,
            response,
        }
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.eta.len()
    }

    /// Returns the design column names, intercept first.
    #[must_use]
    pub fn design_names(&self) -> &[String] {
        &self.design_names
    }

    /// Returns the design matrix with one column per design name.
    #[must_use]
    pub fn design(&self) -> ArrayView2<'_, f64> {
        self.design.view()
    }

    /// Returns the linear predictor including group intercepts.
    #[must_use]
    pub fn eta(&self) -> ArrayView1<'_, f64> {
        self.eta.view()
    }

    /// Returns the group index of each observation.
    #[must_use]
    pub fn group_index(&self) -> &[usize] {
        &self.group_index
    }

    /// Returns the response column.
    #[must_use]
    pub fn response(&self) -> ArrayView1<'_, f64> {
        self.response.view()
    }

    /// Returns every column name in export order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.design_names
            .iter()
            .map(String::as_str)
            .chain([ETA_COLUMN, GROUP_INDEX_COLUMN, RESPONSE_COLUMN])
            .collect()
    }

    /// Looks up a column by name.
    ///
    /// ```
    /// use glmm_data::{Column, FamilyRegistry, GenerationParams, generate};
    ///
    /// let params = GenerationParams::new("y ~ 0 + 1*x1").with_n_obs(5);
    /// let data = generate(&FamilyRegistry::new(), &params, 7).expect("generated");
    ///
    /// assert!(matches!(data.dataset().column("x1"), Some(Column::Real(_))));
    /// assert!(matches!(data.dataset().column("group_index"), Some(Column::Index(_))));
    /// assert!(data.dataset().column("x9").is_none());
    /// ```
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Column<'_>> {
        match name {
            ETA_COLUMN => Some(Column::Real(self.eta.view())),
            GROUP_INDEX_COLUMN => Some(Column::Index(&self.group_index)),
            RESPONSE_COLUMN => Some(Column::Real(self.response.view())),
            _ => self
                .design_names
                .iter()
                .position(|design_name| design_name == name)
                .map(|j| Column::Real(self.design.column(j))),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn sample_dataset() -> Dataset {
        Dataset::from_parts(
            vec![INTERCEPT_COLUMN.to_owned(), "x1".to_owned()],
            array![[1.0, 0.5], [1.0, -1.0]],
            array![2.0, 0.5],
            vec![1, 0],
            array![2.1, 0.4],
        )
    }

    #[test]
    fn column_names_follow_export_order() {
        assert_eq!(
            sample_dataset().column_names(),
            vec!["Intercept", "x1", "eta", "group_index", "y"]
        );
    }

    #[test]
    fn column_lookup_returns_design_columns() {
        let dataset = sample_dataset();

        let Some(Column::Real(x1)) = dataset.column("x1") else {
            panic!("x1 should be a real column");
        };
        assert_eq!(x1, array![0.5, -1.0]);

        let Some(Column::Index(groups)) = dataset.column(GROUP_INDEX_COLUMN) else {
            panic!("group_index should be an index column");
        };
        assert_eq!(groups, &[1, 0]);
    }

    #[test]
    fn n_obs_counts_rows() {
        assert_eq!(sample_dataset().n_obs(), 2);
    }
}
