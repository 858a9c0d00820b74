use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::str::FromStr;

/// Gradient-boosted decision tree ensemble loaded from the LightGBM text
/// model format. Only the binary objective is supported; the model scores
/// one feature row into a bull-class probability.
#[derive(Debug)]
pub struct GbdtModel {
    trees: Vec<Tree>,
    num_features: usize,
    sigmoid: f64,
}

#[derive(Debug)]
struct Tree {
    split_feature: Vec<usize>,
    threshold: Vec<f64>,
    left_child: Vec<i32>,
    right_child: Vec<i32>,
    leaf_value: Vec<f64>,
    shrinkage: f64,
}

impl Tree {
    fn from_lines(lines: &mut std::iter::Peekable<std::str::Lines<'_>>) -> Result<Self> {
        let mut num_leaves: Option<usize> = None;
        let mut split_feature = Vec::new();
        let mut threshold = Vec::new();
        let mut left_child = Vec::new();
        let mut right_child = Vec::new();
        let mut leaf_value = Vec::new();
        let mut shrinkage = 1.0;

        while let Some(peeked) = lines.peek() {
            if peeked.starts_with("Tree=") {
                break;
            }
            let line = lines.next().unwrap().trim();
            if line.starts_with("num_leaves=") {
                num_leaves = Some(parse_scalar(line, "num_leaves=")?);
            } else if line.starts_with("split_feature=") {
                split_feature = parse_list(line, "split_feature=")?;
            } else if line.starts_with("threshold=") {
                threshold = parse_list(line, "threshold=")?;
            } else if line.starts_with("left_child=") {
                left_child = parse_list(line, "left_child=")?;
            } else if line.starts_with("right_child=") {
                right_child = parse_list(line, "right_child=")?;
            } else if line.starts_with("leaf_value=") {
                leaf_value = parse_list(line, "leaf_value=")?;
            } else if line.starts_with("shrinkage=") {
                shrinkage = parse_scalar(line, "shrinkage=")?;
            }
        }

        let internal_nodes = split_feature.len();
        if threshold.len() != internal_nodes
            || left_child.len() != internal_nodes
            || right_child.len() != internal_nodes
        {
            return Err(anyhow!(
                "tree definition invalid: split/threshold/child lengths disagree"
            ));
        }
        if leaf_value.is_empty() {
            return Err(anyhow!("tree definition has no leaves"));
        }
        if let Some(declared) = num_leaves {
            if declared != leaf_value.len() {
                return Err(anyhow!(
                    "tree leaf count mismatch: declared {declared}, found {}",
                    leaf_value.len()
                ));
            }
        }

        Ok(Self {
            split_feature,
            threshold,
            left_child,
            right_child,
            leaf_value,
            shrinkage,
        })
    }

    fn score(&self, features: &[f64]) -> f64 {
        // A stump emitted without splits is a single constant leaf.
        if self.split_feature.is_empty() {
            return self.leaf_value[0] * self.shrinkage;
        }
        let mut node = 0usize;
        loop {
            let feature_idx = self.split_feature[node];
            let value = features.get(feature_idx).copied().unwrap_or(0.0);
            let child = if value <= self.threshold[node] {
                self.left_child[node]
            } else {
                self.right_child[node]
            };
            if child < 0 {
                let leaf = (-child - 1) as usize;
                return self.leaf_value.get(leaf).copied().unwrap_or(0.0) * self.shrinkage;
            }
            node = child as usize;
        }
    }
}

impl GbdtModel {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_text(&text)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let mut lines = text.lines().peekable();
        let mut trees = Vec::new();
        let mut max_feature_idx: Option<usize> = None;
        let mut sigmoid = 1.0;
        let mut objective_seen = false;

        while let Some(line) = lines.next() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with("objective=") {
                objective_seen = true;
                if !trimmed.contains("binary") {
                    return Err(anyhow!(
                        "unsupported objective in model file: {trimmed} (binary expected)"
                    ));
                }
                sigmoid = extract_sigmoid(trimmed);
            } else if trimmed.starts_with("max_feature_idx=") {
                max_feature_idx = Some(parse_scalar(trimmed, "max_feature_idx=")?);
            } else if trimmed.starts_with("Tree=") {
                trees.push(Tree::from_lines(&mut lines)?);
            }
        }

        if !objective_seen {
            return Err(anyhow!("model file declares no objective"));
        }
        if trees.is_empty() {
            return Err(anyhow!("model file contains no trees"));
        }

        let inferred = trees
            .iter()
            .flat_map(|t| t.split_feature.iter())
            .copied()
            .max()
            .unwrap_or(0);
        let num_features = max_feature_idx.map(|idx| idx + 1).unwrap_or(inferred + 1);

        Ok(Self {
            trees,
            num_features,
            sigmoid,
        })
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Probability of the bull class for one feature row.
    pub fn predict_bull_prob(&self, features: &[f64]) -> Result<f64> {
        if features.len() < self.num_features {
            return Err(anyhow!(
                "classifier expects {} features, got {}",
                self.num_features,
                features.len()
            ));
        }
        let raw: f64 = self.trees.iter().map(|t| t.score(features)).sum();
        let logit = raw * self.sigmoid;
        Ok((1.0 / (1.0 + (-logit).exp())).clamp(0.0, 1.0))
    }
}

fn parse_scalar<T>(line: &str, prefix: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let raw = line
        .strip_prefix(prefix)
        .ok_or_else(|| anyhow!("expected prefix {prefix}"))?;
    raw.trim()
        .parse::<T>()
        .map_err(|err| anyhow!("failed to parse {prefix} from {line:?}: {err}"))
}

fn parse_list<T>(line: &str, prefix: &str) -> Result<Vec<T>>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let raw = line
        .strip_prefix(prefix)
        .ok_or_else(|| anyhow!("expected prefix {prefix}"))?;
    raw.split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|err| anyhow!("failed to parse {token:?} in {prefix}: {err}"))
        })
        .collect()
}

fn extract_sigmoid(objective_line: &str) -> f64 {
    objective_line
        .split_whitespace()
        .find_map(|token| token.strip_prefix("sigmoid:"))
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(1.0)
}
