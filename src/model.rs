// 🤖 Model Boundary - opaque binary classifier loaded from a JSON artifact
// predict / predict_proba over the encoded feature vector

use crate::encoder::{FEATURE_COUNT, FEATURE_NAMES};
use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

fn default_threshold() -> f64 {
    0.5
}

// ============================================================================
// CLASSIFIER CAPABILITY
// ============================================================================

/// Anything that can score an encoded profile
pub trait ChurnModel: Send + Sync {
    /// Short name for logs and health output
    fn kind(&self) -> &'static str;

    /// Probability at or above which churn is predicted
    fn threshold(&self) -> f64 {
        default_threshold()
    }

    /// `[p(stay), p(churn)]`
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]>;

    fn predict(&self, features: &[f64]) -> Result<bool> {
        let [_, churn] = self.predict_proba(features)?;
        Ok(churn >= self.threshold())
    }
}

fn check_len(features: &[f64]) -> Result<()> {
    if features.len() != FEATURE_COUNT {
        return Err(ChurnError::inference(format!(
            "expected {} features, got {}",
            FEATURE_COUNT,
            features.len()
        )));
    }
    Ok(())
}

fn check_proba(churn: f64) -> Result<[f64; 2]> {
    if !churn.is_finite() || !(0.0..=1.0).contains(&churn) {
        return Err(ChurnError::inference(format!("model produced invalid probability {}", churn)));
    }
    Ok([1.0 - churn, churn])
}

fn check_feature_names(names: &Option<Vec<String>>) -> Result<()> {
    if let Some(names) = names {
        if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(ChurnError::config(format!(
                "artifact feature_names {:?} do not match expected {:?}",
                names, FEATURE_NAMES
            )));
        }
    }
    Ok(())
}

fn check_threshold(threshold: f64) -> Result<()> {
    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(ChurnError::config(format!("threshold must be in (0, 1), got {}", threshold)));
    }
    Ok(())
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

/// Standardization applied before the linear term: (x - mean) / scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<Scaler>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    pub fn validate(&self) -> Result<()> {
        check_feature_names(&self.feature_names)?;
        check_threshold(self.threshold)?;

        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ChurnError::config(format!(
                "expected {} coefficients, got {}",
                FEATURE_COUNT,
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ChurnError::config("coefficients and intercept must be finite"));
        }

        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
                return Err(ChurnError::config(format!(
                    "scaler must have {} mean and scale entries",
                    FEATURE_COUNT
                )));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(ChurnError::config("scaler scale entries must be finite and non-zero"));
            }
        }
        Ok(())
    }

    fn decision(&self, features: &[f64]) -> Result<f64> {
        if self.coefficients.len() != features.len() {
            return Err(ChurnError::inference(format!(
                "model has {} coefficients for {} features",
                self.coefficients.len(),
                features.len()
            )));
        }

        let mut z = self.intercept;
        for (i, (x, c)) in features.iter().zip(&self.coefficients).enumerate() {
            let x = match &self.scaler {
                Some(s) => match (s.mean.get(i), s.scale.get(i)) {
                    (Some(mean), Some(scale)) => (x - mean) / scale,
                    _ => return Err(ChurnError::inference(format!("scaler has no entry for feature {}", i))),
                },
                None => *x,
            };
            z += c * x;
        }
        Ok(z)
    }
}

impl ChurnModel for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        check_len(features)?;
        let z = self.decision(features)?;
        check_proba(1.0 / (1.0 + (-z).exp()))
    }
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

/// One decision tree in flat array form. A node is a leaf when its left child is -1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-class weights, `[stay, churn]`; only read at leaves
    pub value: Vec<[f64; 2]>,
}

const LEAF: i64 = -1;

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, index: usize) -> Result<()> {
        let n = self.node_count();
        let bad = |msg: String| Err(ChurnError::config(format!("tree {}: {}", index, msg)));

        if n == 0 {
            return bad("has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return bad("node arrays differ in length".to_string());
        }

        for node in 0..n {
            if self.children_left[node] == LEAF {
                let [stay, churn] = self.value[node];
                if stay < 0.0 || churn < 0.0 || !(stay + churn).is_finite() || stay + churn <= 0.0 {
                    return bad(format!("leaf {} has invalid class weights", node));
                }
                continue;
            }
            for child in [self.children_left[node], self.children_right[node]] {
                if child < 0 || child as usize >= n {
                    return bad(format!("node {} points to missing child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= FEATURE_COUNT {
                return bad(format!("node {} splits on unknown feature {}", node, feature));
            }
            if !self.threshold[node].is_finite() {
                return bad(format!("node {} has a non-finite threshold", node));
            }
        }
        Ok(())
    }

    /// Normalized `[stay, churn]` at the leaf reached by `features`
    fn leaf_distribution(&self, features: &[f64]) -> Result<[f64; 2]> {
        let malformed = |node: usize| ChurnError::inference(format!("decision tree node {} is malformed", node));

        let mut node = 0usize;
        // A valid tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.node_count() {
            let left = *self.children_left.get(node).ok_or_else(|| malformed(node))?;
            if left == LEAF {
                let [stay, churn] = *self.value.get(node).ok_or_else(|| malformed(node))?;
                let total = stay + churn;
                return Ok([stay / total, churn / total]);
            }

            let x = usize::try_from(*self.feature.get(node).ok_or_else(|| malformed(node))?)
                .ok()
                .and_then(|f| features.get(f))
                .ok_or_else(|| malformed(node))?;
            let threshold = *self.threshold.get(node).ok_or_else(|| malformed(node))?;
            let next = if *x <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or_else(|| malformed(node))?
            };
            node = usize::try_from(next).map_err(|_| malformed(node))?;
        }
        Err(ChurnError::inference("decision tree walk did not reach a leaf"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<DecisionTree>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl ForestModel {
    pub fn validate(&self) -> Result<()> {
        check_feature_names(&self.feature_names)?;
        check_threshold(self.threshold)?;

        if self.trees.is_empty() {
            return Err(ChurnError::config("forest has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }
}

impl ChurnModel for ForestModel {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        check_len(features)?;
        if self.trees.is_empty() {
            return Err(ChurnError::inference("forest has no trees"));
        }
        let mut churn = 0.0;
        for tree in &self.trees {
            churn += tree.leaf_distribution(features)?[1];
        }
        check_proba(churn / self.trees.len() as f64)
    }
}

// ============================================================================
// ARTIFACT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticModel),
    RandomForest(ForestModel),
}

impl ModelArtifact {
    pub fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::LogisticRegression(m) => m.validate(),
            ModelArtifact::RandomForest(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn ChurnModel {
        match self {
            ModelArtifact::LogisticRegression(m) => m as &dyn ChurnModel,
            ModelArtifact::RandomForest(m) => m,
        }
    }
}

/// A validated artifact plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub path: PathBuf,
    /// Hex SHA-256 of the artifact bytes
    pub fingerprint: String,
    pub artifact: ModelArtifact,
}

impl ChurnModel for LoadedModel {
    fn kind(&self) -> &'static str {
        self.artifact.inner().kind()
    }

    fn threshold(&self) -> f64 {
        self.artifact.inner().threshold()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        self.artifact.inner().predict_proba(features)
    }
}

pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Read, parse and validate a model artifact. Every failure here is fatal.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<LoadedModel> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ChurnError::config(format!("model artifact not found at {:?}", path)));
    }

    let bytes = fs::read(path)
        .map_err(|e| ChurnError::config(format!("failed to read model artifact {:?}: {}", path, e)))?;

    let artifact: ModelArtifact = serde_json::from_slice(&bytes)
        .map_err(|e| ChurnError::config(format!("failed to parse model artifact {:?}: {}", path, e)))?;
    artifact.validate()?;

    let model = LoadedModel {
        path: path.to_path_buf(),
        fingerprint: fingerprint(&bytes),
        artifact,
    };

    tracing::info!(
        path = %path.display(),
        kind = model.kind(),
        fingerprint = %model.fingerprint,
        "model loaded"
    );

    Ok(model)
}

// ============================================================================
// PROCESS-WIDE HANDLE
// ============================================================================

static GLOBAL_MODEL: OnceLock<Arc<LoadedModel>> = OnceLock::new();

/// Install the process-wide model. Only the first call succeeds.
pub fn init_global(model: LoadedModel) -> Result<Arc<LoadedModel>> {
    let model = Arc::new(model);
    GLOBAL_MODEL
        .set(Arc::clone(&model))
        .map_err(|_| ChurnError::config("model handle is already initialized"))?;
    Ok(model)
}

pub fn global() -> Option<Arc<LoadedModel>> {
    GLOBAL_MODEL.get().cloned()
}

// ============================================================================
// TESTS
// ============================================================================
