//! CART decision trees grown on bootstrap samples.
//!
//! Split search sorts the node's rows per candidate feature and sweeps the
//! sorted order once, moving rows from the right-hand statistics into the
//! left-hand ones. A [`SplitCriterion`] supplies the incremental statistics, so
//! one builder serves both Gini classification and variance regression.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::FitError;

const IMPURITY_EPS: f64 = 1e-12;

/// Incremental impurity statistics for one target kind.
pub trait SplitCriterion {
    type Target: Copy;
    type Stats: Clone;

    fn empty(&self) -> Self::Stats;
    fn add(&self, stats: &mut Self::Stats, target: Self::Target);
    fn remove(&self, stats: &mut Self::Stats, target: Self::Target);
    fn count(&self, stats: &Self::Stats) -> usize;
    /// Node impurity multiplied by the node's sample count.
    fn weighted_impurity(&self, stats: &Self::Stats) -> f64;
    /// Value stored in a leaf holding these statistics.
    fn leaf_value(&self, stats: &Self::Stats) -> Vec<f64>;
    /// Reject targets the statistics cannot hold.
    fn check_targets(&self, _targets: &[Self::Target]) -> Result<(), FitError> {
        Ok(())
    }
}

/// Gini impurity over class indices; leaves hold class probabilities.
#[derive(Debug, Clone, Copy)]
pub struct Gini {
    pub n_classes: usize,
}

#[derive(Debug, Clone)]
pub struct ClassCounts {
    counts: Vec<usize>,
    total: usize,
}

impl SplitCriterion for Gini {
    type Target = usize;
    type Stats = ClassCounts;

    fn empty(&self) -> ClassCounts {
        ClassCounts {
            counts: vec![0; self.n_classes],
            total: 0,
        }
    }

    fn add(&self, stats: &mut ClassCounts, target: usize) {
        stats.counts[target] += 1;
        stats.total += 1;
    }

    fn remove(&self, stats: &mut ClassCounts, target: usize) {
        stats.counts[target] -= 1;
        stats.total -= 1;
    }

    fn count(&self, stats: &ClassCounts) -> usize {
        stats.total
    }

    fn weighted_impurity(&self, stats: &ClassCounts) -> f64 {
        if stats.total == 0 {
            return 0.0;
        }
        let total = stats.total as f64;
        let sum_sq: f64 = stats.counts.iter().map(|&c| (c as f64) * (c as f64)).sum();
        (total - sum_sq / total).max(0.0)
    }

    fn leaf_value(&self, stats: &ClassCounts) -> Vec<f64> {
        let total = stats.total.max(1) as f64;
        stats.counts.iter().map(|&c| c as f64 / total).collect()
    }

    fn check_targets(&self, targets: &[usize]) -> Result<(), FitError> {
        match targets.iter().find(|&&label| label >= self.n_classes) {
            Some(&label) => Err(FitError::InvalidClass {
                label,
                n_classes: self.n_classes,
            }),
            None => Ok(()),
        }
    }
}

/// Sum of squared errors around the mean; leaves hold the mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Variance;

#[derive(Debug, Clone, Default)]
pub struct Moments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl SplitCriterion for Variance {
    type Target = f64;
    type Stats = Moments;

    fn empty(&self) -> Moments {
        Moments::default()
    }

    fn add(&self, stats: &mut Moments, target: f64) {
        stats.count += 1;
        stats.sum += target;
        stats.sum_sq += target * target;
    }

    fn remove(&self, stats: &mut Moments, target: f64) {
        stats.count -= 1;
        stats.sum -= target;
        stats.sum_sq -= target * target;
    }

    fn count(&self, stats: &Moments) -> usize {
        stats.count
    }

    fn weighted_impurity(&self, stats: &Moments) -> f64 {
        if stats.count == 0 {
            return 0.0;
        }
        (stats.sum_sq - stats.sum * stats.sum / stats.count as f64).max(0.0)
    }

    fn leaf_value(&self, stats: &Moments) -> Vec<f64> {
        if stats.count == 0 {
            return vec![0.0];
        }
        vec![stats.sum / stats.count as f64]
    }
}

/// Number of features examined per split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    All,
    Sqrt,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Count(count) => count,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeOptions {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
        }
    }
}

/// Flat node storage; the root is node 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
        samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows listed in `indices` (duplicates allowed).
    pub fn fit<C: SplitCriterion>(
        criterion: &C,
        x: &[Vec<f64>],
        y: &[C::Target],
        indices: &[usize],
        options: &TreeOptions,
        rng: &mut StdRng,
    ) -> Result<Self, FitError> {
        let n_features = super::validate_matrix(x, y.len())?;
        criterion.check_targets(y)?;
        if indices.is_empty() {
            return Err(FitError::Empty);
        }
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= x.len()) {
            return Err(FitError::RowOutOfRange {
                index: bad,
                rows: x.len(),
            });
        }
        let mut builder = Builder {
            criterion,
            x,
            y,
            options,
            n_features,
            max_features: options.max_features.resolve(n_features),
            rng,
            nodes: Vec::new(),
        };
        let mut indices = indices.to_vec();
        builder.build(&mut indices, 0);
        Ok(Self {
            nodes: builder.nodes,
        })
    }

    /// Leaf value reached by `row`.
    pub fn predict(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Structural check for trees loaded from disk.
    pub fn validate(&self, n_features: usize, leaf_len: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!("Node {idx} splits on unknown feature {feature}"));
                    }
                    // Children are always pushed after their parent.
                    if *left <= idx || *right <= idx || *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("Node {idx} has invalid children"));
                    }
                }
                Node::Leaf { value, .. } => {
                    if value.len() != leaf_len {
                        return Err(format!(
                            "Leaf {idx} holds {} values but expected {leaf_len}",
                            value.len()
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

struct Builder<'a, C: SplitCriterion> {
    criterion: &'a C,
    x: &'a [Vec<f64>],
    y: &'a [C::Target],
    options: &'a TreeOptions,
    n_features: usize,
    max_features: usize,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    score: f64,
    feature: usize,
    threshold: f64,
}

impl<C: SplitCriterion> Builder<'_, C> {
    fn build(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let stats = self.stats_for(indices);
        if self.should_split(indices.len(), depth, &stats)
            && let Some(split) = self.best_split(indices, &stats)
        {
            let node_idx = self.nodes.len();
            self.nodes.push(Node::Leaf {
                value: Vec::new(),
                samples: 0,
            });
            let mid = self.partition(indices, split.feature, split.threshold);
            let (left_rows, right_rows) = indices.split_at_mut(mid);
            let left = self.build(left_rows, depth + 1);
            let right = self.build(right_rows, depth + 1);
            self.nodes[node_idx] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            return node_idx;
        }
        self.nodes.push(Node::Leaf {
            value: self.criterion.leaf_value(&stats),
            samples: indices.len(),
        });
        self.nodes.len() - 1
    }

    fn should_split(&self, n: usize, depth: usize, stats: &C::Stats) -> bool {
        let depth_ok = self.options.max_depth.is_none_or(|max| depth < max);
        depth_ok
            && n >= self.options.min_samples_split.max(2)
            && n >= 2 * self.options.min_samples_leaf.max(1)
            && self.criterion.weighted_impurity(stats) > IMPURITY_EPS
    }

    fn stats_for(&self, indices: &[usize]) -> C::Stats {
        let mut stats = self.criterion.empty();
        for &idx in indices {
            self.criterion.add(&mut stats, self.y[idx]);
        }
        stats
    }

    /// Examine shuffled features until `max_features` non-constant ones were tried.
    fn best_split(&mut self, indices: &[usize], parent: &C::Stats) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<BestSplit> = None;
        let mut tried = 0usize;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(indices.len());
        for feature in features {
            if tried >= self.max_features && best.is_some() {
                break;
            }
            sorted.clear();
            sorted.extend(indices.iter().map(|&idx| (self.x[idx][feature], idx)));
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
            let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
                continue;
            };
            if first.0 == last.0 {
                continue;
            }
            tried += 1;
            if let Some(candidate) = self.sweep_feature(feature, &sorted, parent)
                && best.is_none_or(|current| candidate.score < current.score)
            {
                best = Some(candidate);
            }
        }
        best
    }

    fn sweep_feature(
        &self,
        feature: usize,
        sorted: &[(f64, usize)],
        parent: &C::Stats,
    ) -> Option<BestSplit> {
        let min_leaf = self.options.min_samples_leaf.max(1);
        let mut left = self.criterion.empty();
        let mut right = parent.clone();
        let mut best: Option<BestSplit> = None;
        for k in 0..sorted.len() - 1 {
            let (value, idx) = sorted[k];
            self.criterion.add(&mut left, self.y[idx]);
            self.criterion.remove(&mut right, self.y[idx]);
            let next = sorted[k + 1].0;
            if value == next {
                continue;
            }
            if self.criterion.count(&left) < min_leaf || self.criterion.count(&right) < min_leaf {
                continue;
            }
            let score =
                self.criterion.weighted_impurity(&left) + self.criterion.weighted_impurity(&right);
            if best.is_none_or(|current| score < current.score) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(BestSplit {
                    score,
                    feature,
                    threshold,
                });
            }
        }
        best
    }

    /// Reorder `indices` so rows going left come first; returns the boundary.
    fn partition(&self, indices: &mut [usize], feature: usize, threshold: f64) -> usize {
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&idx| self.x[idx][feature] <= threshold);
        let mid = left.len();
        for (slot, idx) in indices.iter_mut().zip(left.into_iter().chain(right)) {
            *slot = idx;
        }
        mid
    }
}
