//! Bagged random forests for classification and regression.
//!
//! Each tree is grown on a bootstrap resample of the training rows. Tree seeds
//! are drawn in order from one base `StdRng`, so a forest is reproducible from
//! its options and the training data alone.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::FitError;
use super::tree::{DecisionTree, Gini, MaxFeatures, SplitCriterion, TreeOptions, Variance};

/// Default number of trees per forest.
pub const DEFAULT_TREES: usize = 250;

/// Forest hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestOptions {
    pub n_trees: usize,
    pub seed: u64,
    pub bootstrap: bool,
    pub tree: TreeOptions,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            seed: 42,
            bootstrap: true,
            tree: TreeOptions::default(),
        }
    }
}

impl ForestOptions {
    fn with_max_features(&self, max_features: MaxFeatures) -> Self {
        let mut options = *self;
        options.tree.max_features = max_features;
        options
    }
}

fn grow_trees<C: SplitCriterion>(
    criterion: &C,
    x: &[Vec<f64>],
    y: &[C::Target],
    options: &ForestOptions,
) -> Result<Vec<DecisionTree>, FitError> {
    if options.n_trees == 0 {
        return Err(FitError::NoTrees);
    }
    super::validate_matrix(x, y.len())?;
    let n = x.len();
    let mut seeds = StdRng::seed_from_u64(options.seed);
    let mut trees = Vec::with_capacity(options.n_trees);
    for _ in 0..options.n_trees {
        let mut rng = StdRng::seed_from_u64(seeds.random::<u64>());
        let indices: Vec<usize> = if options.bootstrap {
            (0..n).map(|_| rng.random_range(0..n)).collect()
        } else {
            (0..n).collect()
        };
        trees.push(DecisionTree::fit(
            criterion,
            x,
            y,
            &indices,
            &options.tree,
            &mut rng,
        )?);
    }
    Ok(trees)
}

/// Soft-voting forest of Gini trees over class indices `0..n_classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    n_classes: usize,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    /// Fit with `sqrt(n_features)` candidate features per split.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        options: &ForestOptions,
    ) -> Result<Self, FitError> {
        if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
            return Err(FitError::InvalidClass { label, n_classes });
        }
        let options = options.with_max_features(MaxFeatures::Sqrt);
        let trees = grow_trees(&Gini { n_classes }, x, y, &options)?;
        debug!(trees = trees.len(), rows = x.len(), "Fitted random forest classifier");
        Ok(Self {
            n_classes,
            n_features: x.first().map(Vec::len).unwrap_or(0),
            trees,
        })
    }

    /// Mean of the per-tree class probabilities.
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in out.iter_mut().zip(tree.predict(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        for p in &mut out {
            *p /= n;
        }
        out
    }

    /// Most probable class index; ties go to the lower index.
    pub fn predict(&self, row: &[f64]) -> usize {
        argmax(&self.predict_proba(row))
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("Classifier has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|err| format!("Tree {idx}: {err}"))?;
        }
        Ok(())
    }
}

/// Averaging forest of variance-reduction trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestRegressor {
    /// Fit with every feature considered at each split.
    pub fn fit(x: &[Vec<f64>], y: &[f64], options: &ForestOptions) -> Result<Self, FitError> {
        if let Some(row) = y.iter().position(|value| !value.is_finite()) {
            return Err(FitError::NonFinite { row });
        }
        let options = options.with_max_features(MaxFeatures::All);
        let trees = grow_trees(&Variance, x, y, &options)?;
        debug!(trees = trees.len(), rows = x.len(), "Fitted random forest regressor");
        Ok(Self {
            n_features: x.first().map(Vec::len).unwrap_or(0),
            trees,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict(row).first().copied().unwrap_or(0.0))
            .sum();
        sum / self.trees.len().max(1) as f64
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("Regressor has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, 1)
                .map_err(|err| format!("Tree {idx}: {err}"))?;
        }
        Ok(())
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f64::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}
