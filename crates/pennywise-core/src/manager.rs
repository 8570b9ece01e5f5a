//! Budget manager
//!
//! Owns the trained models and answers every prediction and insight query.
//! A manager starts untrained; `train` or `load` gives it a model. Queries that
//! need the spending forest fail with [`Error::NotTrained`] until then, while
//! anomaly detection quietly returns nothing.
//!
//! The trained state is persisted as gzip-compressed JSON. The SHA-256 of the
//! file identifies which model a running service is using.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::{ModelConfig, PennywiseConfig};
use crate::error::{Error, Result};
use crate::features::{
    expense_features, prepare_features, profile_features, FeatureSchema, StandardScaler,
};
use crate::insights::{
    self, anomaly_reason, generate_alerts, generate_optimization_tips, recommend, Anomaly,
    BudgetOptimization, Recommendation, SmartInsights, SpendingPrediction,
};
use crate::ml::metrics::variance;
use crate::ml::{
    mean_absolute_error, r2_score, root_mean_squared_error, train_test_split, ForestParams,
    IsolationForest, RandomForestRegressor, TrendModel,
};
use crate::models::{today, Category, Expense, TrainingRecord, UserProfile};
use crate::seasonal::seasonal_multipliers;
use crate::synthetic::generate_sample_data;
use crate::trends::{analyze_spending_trends, SpendingTrends};

/// Smallest training set accepted
pub const MIN_TRAINING_RECORDS: usize = 10;

/// Bumped whenever the persisted layout changes
const MODEL_FORMAT_VERSION: u32 = 1;

/// Columns the linear trend model is fitted on
const TREND_COLUMNS: [&str; 3] = ["month", "user_income", "user_age"];

/// Divisor turning per-tree variance into a confidence penalty
const CONFIDENCE_VARIANCE_SCALE: f64 = 10.0;

/// Held-out evaluation of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    /// R² of the linear trend model; absent when it could not be fitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_r2: Option<f64>,
    pub feature_importance: BTreeMap<String, f64>,
    pub n_train: usize,
    pub n_test: usize,
}

impl TrainingReport {
    /// Features ordered by importance, highest first
    pub fn top_features(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .feature_importance
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }
}

/// Model statistics for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub is_trained: bool,
    pub model_type: String,
    pub categories: Vec<String>,
    pub seasonal_multipliers: BTreeMap<u32, f64>,
    pub features: Vec<String>,
    pub n_estimators: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training: Option<TrainingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Everything a trained manager persists
#[derive(Debug, Serialize, Deserialize)]
struct TrainedModel {
    format_version: u32,
    schema: FeatureSchema,
    categories: Vec<String>,
    scaler: StandardScaler,
    forest: RandomForestRegressor,
    anomaly: IsolationForest,
    trend: Option<TrendModel>,
    model_config: ModelConfig,
    report: TrainingReport,
    trained_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct BudgetManager {
    config: PennywiseConfig,
    state: Option<TrainedModel>,
    fingerprint: Option<String>,
}

impl BudgetManager {
    pub fn new(config: PennywiseConfig) -> Self {
        Self {
            config,
            state: None,
            fingerprint: None,
        }
    }

    pub fn config(&self) -> &PennywiseConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    fn trained(&self) -> Result<&TrainedModel> {
        self.state.as_ref().ok_or(Error::NotTrained)
    }

    /// Train all models, on synthetic data when `records` is `None`
    ///
    /// Replaces any previous model. The report is evaluated on the held-out
    /// split.
    pub fn train(&mut self, records: Option<Vec<TrainingRecord>>) -> Result<TrainingReport> {
        let records = match records {
            Some(r) => r,
            None => generate_sample_data(&self.config.synthetic, self.config.model.seed)?,
        };
        if records.len() < MIN_TRAINING_RECORDS {
            return Err(Error::Training(format!(
                "Need at least {} training records, got {}",
                MIN_TRAINING_RECORDS,
                records.len()
            )));
        }
        for (i, record) in records.iter().enumerate() {
            record.validate().map_err(|e| match e {
                Error::InvalidData(msg) => {
                    Error::InvalidData(format!("Training record {}: {}", i + 1, msg))
                }
                other => other,
            })?;
        }

        let params = &self.config.model;
        let schema = FeatureSchema::standard();
        let (x, y) = prepare_features(&records)?;

        let (train_idx, test_idx) = train_test_split(x.nrows(), params.test_size, params.seed);
        let x_train = x.select(Axis(0), &train_idx);
        let x_test = x.select(Axis(0), &test_idx);
        let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
        let y_test: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

        debug!(
            n_train = train_idx.len(),
            n_test = test_idx.len(),
            n_features = schema.len(),
            "Prepared training split"
        );

        let scaler = StandardScaler::fit(&x_train)?;
        let x_train_scaled = scaler.transform(&x_train)?;
        let x_test_scaled = scaler.transform(&x_test)?;

        let forest = RandomForestRegressor::fit(
            &x_train_scaled,
            &y_train,
            ForestParams {
                n_estimators: params.n_estimators,
                max_depth: params.max_depth,
                seed: params.seed,
            },
        )?;

        let anomaly = IsolationForest::fit(
            &x_train_scaled,
            params.n_estimators,
            params.contamination,
            params.seed,
        )?;

        let trend_cols = trend_columns(&schema)?;
        let trend = match TrendModel::fit(&x_train.select(Axis(1), &trend_cols), &y_train) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!(error = %e, "Trend model not fitted");
                None
            }
        };

        let (mae, rmse, r2, feature_importance) = if test_idx.is_empty() {
            (0.0, 0.0, 0.0, BTreeMap::new())
        } else {
            let pred = forest.predict(&x_test_scaled)?;
            let importance = forest.permutation_importance(&x_test_scaled, &y_test, params.seed)?;
            (
                mean_absolute_error(&y_test, &pred),
                root_mean_squared_error(&y_test, &pred),
                r2_score(&y_test, &pred),
                schema.names.iter().cloned().zip(importance).collect(),
            )
        };

        let trend_r2 = match (&trend, test_idx.is_empty()) {
            (Some(model), false) => {
                let pred = model.predict(&x_test.select(Axis(1), &trend_cols))?;
                Some(r2_score(&y_test, &pred))
            }
            _ => None,
        };

        let report = TrainingReport {
            mae,
            rmse,
            r2,
            trend_r2,
            feature_importance,
            n_train: train_idx.len(),
            n_test: test_idx.len(),
        };

        info!(
            records = records.len(),
            trees = forest.n_trees(),
            mae = report.mae,
            rmse = report.rmse,
            r2 = report.r2,
            "Model trained"
        );

        self.state = Some(TrainedModel {
            format_version: MODEL_FORMAT_VERSION,
            schema,
            categories: Category::names(),
            scaler,
            forest,
            anomaly,
            trend,
            model_config: params.clone(),
            report: report.clone(),
            trained_at: Utc::now(),
        });
        self.fingerprint = None;

        Ok(report)
    }

    /// Predict next-period spending for the profile's category
    pub fn predict_spending(&self, profile: &UserProfile) -> Result<SpendingPrediction> {
        let model = self.trained()?;
        profile.validate()?;

        let row = model
            .scaler
            .transform_row(&profile_features(profile, today()))?;
        let per_tree = model.forest.predict_per_tree(&row)?;
        if per_tree.is_empty() {
            return Err(Error::Model("forest has no trees".into()));
        }

        let mean = per_tree.iter().sum::<f64>() / per_tree.len() as f64;
        let confidence =
            (100.0 - variance(&per_tree) / CONFIDENCE_VARIANCE_SCALE).clamp(0.0, 100.0);

        Ok(SpendingPrediction {
            predicted_amount: mean.max(0.0),
            confidence,
            category: profile.category_or_default().to_string(),
        })
    }

    /// Flag expenses the isolation forest considers outliers
    ///
    /// Untrained managers flag nothing. User fields come from `profile`, or
    /// defaults when absent.
    pub fn detect_anomalies(
        &self,
        expenses: &[Expense],
        profile: Option<&UserProfile>,
    ) -> Result<Vec<Anomaly>> {
        let Some(model) = &self.state else {
            return Ok(Vec::new());
        };
        let default_profile = UserProfile::default();
        let profile = profile.unwrap_or(&default_profile);

        let mut anomalies = Vec::new();
        for expense in expenses {
            let row = model
                .scaler
                .transform_row(&expense_features(expense, profile))?;
            let score = model.anomaly.decision_function(&row)?;
            if score < 0.0 {
                anomalies.push(Anomaly {
                    expense: expense.clone(),
                    anomaly_score: score,
                    reason: anomaly_reason(score).to_string(),
                });
            }
        }

        debug!(
            checked = expenses.len(),
            flagged = anomalies.len(),
            "Anomaly detection complete"
        );
        Ok(anomalies)
    }

    /// Compare predictions with history for every category that has history
    pub fn generate_budget_recommendations(
        &self,
        profile: &UserProfile,
        history: &[Expense],
    ) -> Result<Vec<Recommendation>> {
        self.trained()?;

        let mut recommendations = Vec::new();
        for category in Category::ALL {
            let amounts: Vec<f64> = history
                .iter()
                .filter(|e| e.category == category.as_str())
                .map(|e| e.amount)
                .collect();
            if amounts.is_empty() {
                continue;
            }

            let historical_avg = amounts.iter().sum::<f64>() / amounts.len() as f64;
            let prediction = self.predict_spending(&profile.with_category(category.as_str()))?;
            recommendations.push(recommend(category.as_str(), &prediction, historical_avg));
        }

        Ok(recommendations)
    }

    /// Overall, per-category and seasonal trends; needs no model
    pub fn analyze_spending_trends(&self, expenses: &[Expense]) -> Result<SpendingTrends> {
        analyze_spending_trends(expenses)
    }

    /// Predictions for every canonical category
    pub fn category_predictions(
        &self,
        profile: &UserProfile,
    ) -> Result<BTreeMap<String, SpendingPrediction>> {
        self.trained()?;
        Category::ALL
            .iter()
            .map(|c| {
                let prediction = self.predict_spending(&profile.with_category(c.as_str()))?;
                Ok((c.as_str().to_string(), prediction))
            })
            .collect()
    }

    /// Everything the dashboard shows, in one call
    pub fn get_smart_insights(
        &self,
        profile: &UserProfile,
        expenses: &[Expense],
        budget_goals: &BTreeMap<String, f64>,
    ) -> Result<SmartInsights> {
        let predictions = self.category_predictions(profile)?;
        let anomalies = self.detect_anomalies(expenses, Some(profile))?;
        let recommendations = self.generate_budget_recommendations(profile, expenses)?;

        let trends = if expenses.is_empty() {
            SpendingTrends::default()
        } else {
            analyze_spending_trends(expenses)?
        };

        let alerts = generate_alerts(expenses, budget_goals, today());
        let optimization_tips = generate_optimization_tips(expenses, &trends);

        Ok(SmartInsights {
            predictions,
            anomalies,
            recommendations,
            trends,
            alerts,
            optimization_tips,
        })
    }

    /// Allocate `total_budget` by predicted spend and find oversized budgets
    pub fn optimize_budget(
        &self,
        profile: &UserProfile,
        current_budget: &BTreeMap<String, f64>,
        total_budget: f64,
    ) -> Result<BudgetOptimization> {
        let predictions = self
            .category_predictions(profile)?
            .into_iter()
            .map(|(category, p)| (category, p.predicted_amount))
            .collect();

        Ok(insights::optimize_budget(
            predictions,
            current_budget,
            total_budget,
        ))
    }

    /// Write the trained model to `path` and return its SHA-256 fingerprint
    ///
    /// The file is written to a sibling temp file and renamed into place.
    pub fn save(&mut self, path: &Path) -> Result<String> {
        let model = self.trained()?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut encoder =
                GzEncoder::new(BufWriter::new(tmp.as_file()), Compression::default());
            serde_json::to_writer(&mut encoder, model)?;
            encoder.finish()?.flush()?;
        }
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        let fingerprint = fingerprint_file(path)?;
        info!(path = %path.display(), fingerprint = %fingerprint, "Saved model");
        self.fingerprint = Some(fingerprint.clone());
        Ok(fingerprint)
    }

    /// Replace the current model with the one stored at `path`
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::NotFound(format!("Model file not found: {}", path.display()))
            }
            _ => Error::Io(e),
        })?;

        let mut json = Vec::new();
        GzDecoder::new(bytes.as_slice()).read_to_end(&mut json)?;
        let model: TrainedModel = serde_json::from_slice(&json)?;

        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::Model(format!(
                "Unsupported model format version {} (expected {})",
                model.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if model.schema != FeatureSchema::standard() {
            return Err(Error::Model("Model was trained on a different feature schema".into()));
        }

        let fingerprint = hex::encode(Sha256::digest(&bytes));
        info!(
            path = %path.display(),
            fingerprint = %fingerprint,
            trained_at = %model.trained_at,
            "Loaded model"
        );

        self.state = Some(model);
        self.fingerprint = Some(fingerprint);
        Ok(())
    }

    pub fn info(&self) -> ModelInfo {
        let state = self.state.as_ref();
        ModelInfo {
            is_trained: state.is_some(),
            model_type: "RandomForestRegressor".to_string(),
            categories: state
                .map(|m| m.categories.clone())
                .unwrap_or_else(Category::names),
            seasonal_multipliers: seasonal_multipliers(),
            features: state
                .map(|m| m.schema.names.clone())
                .unwrap_or_else(|| FeatureSchema::standard().names),
            n_estimators: state
                .map(|m| m.forest.n_trees())
                .unwrap_or(self.config.model.n_estimators),
            training: state.map(|m| m.report.clone()),
            trained_at: state.map(|m| m.trained_at),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

fn trend_columns(schema: &FeatureSchema) -> Result<Vec<usize>> {
    TREND_COLUMNS
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .ok_or_else(|| Error::Model(format!("feature schema has no column {}", name)))
        })
        .collect()
}

fn fingerprint_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyntheticConfig;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn small_config() -> PennywiseConfig {
        PennywiseConfig {
            model: ModelConfig {
                n_estimators: 10,
                ..ModelConfig::default()
            },
            synthetic: SyntheticConfig {
                num_users: 4,
                num_months: 12,
            },
            ..PennywiseConfig::default()
        }
    }

    fn trained_manager() -> BudgetManager {
        let mut manager = BudgetManager::new(small_config());
        manager.train(None).unwrap();
        manager
    }

    fn profile(category: &str) -> UserProfile {
        UserProfile {
            user_income: Some(5200.0),
            user_age: Some(34.0),
            user_risk_tolerance: Some("medium".into()),
            month: Some(6),
            day_of_week: Some(2),
            category: Some(category.into()),
            ..UserProfile::default()
        }
    }

    fn e(date: &str, category: &str, amount: f64) -> Expense {
        Expense::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category,
            amount,
        )
    }

    #[test]
    fn test_untrained_manager() {
        let mut manager = BudgetManager::new(small_config());
        assert!(!manager.is_trained());
        assert!(matches!(
            manager.predict_spending(&profile("food")),
            Err(Error::NotTrained)
        ));
        assert!(manager
            .detect_anomalies(&[e("2025-01-01", "food", 9999.0)], None)
            .unwrap()
            .is_empty());
        assert!(matches!(
            manager.category_predictions(&profile("food")),
            Err(Error::NotTrained)
        ));

        let dir = TempDir::new().unwrap();
        assert!(matches!(
            manager.save(&dir.path().join("m.json.gz")),
            Err(Error::NotTrained)
        ));

        let info = manager.info();
        assert!(!info.is_trained);
        assert_eq!(info.categories.len(), 10);
        assert_eq!(info.features.len(), 21);
        assert!(info.training.is_none());
    }

    #[test]
    fn test_too_few_records() {
        let records = crate::synthetic::generate_sample_data_from(
            &SyntheticConfig {
                num_users: 1,
                num_months: 1,
            },
            1,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        let short: Vec<TrainingRecord> = records.into_iter().take(9).collect();

        let mut manager = BudgetManager::new(small_config());
        assert!(matches!(manager.train(Some(short)), Err(Error::Training(_))));
        assert!(!manager.is_trained());
    }

    #[test]
    fn test_train_report() {
        let mut manager = BudgetManager::new(small_config());
        let report = manager.train(None).unwrap();

        // 4 users x 12 months x 10 categories
        assert_eq!(report.n_train + report.n_test, 480);
        assert_eq!(report.n_test, 96);
        assert_eq!(report.feature_importance.len(), 21);
        assert!(report.mae >= 0.0);
        assert!(report.rmse >= report.mae);
        assert!(report.trend_r2.is_some());
        assert_eq!(report.top_features(3).len(), 3);
    }

    #[test]
    fn test_predict_spending() {
        let manager = trained_manager();
        let pred = manager.predict_spending(&profile("food")).unwrap();

        assert!(pred.predicted_amount >= 0.0);
        assert!((0.0..=100.0).contains(&pred.confidence));
        assert_eq!(pred.category, "food");

        let default_cat = manager.predict_spending(&UserProfile::default()).unwrap();
        assert_eq!(default_cat.category, "other");
    }

    #[test]
    fn test_predict_rejects_bad_profile() {
        let manager = trained_manager();
        let bad = UserProfile {
            month: Some(13),
            ..profile("food")
        };
        assert!(matches!(
            manager.predict_spending(&bad),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_category_predictions_cover_all_categories() {
        let manager = trained_manager();
        let preds = manager.category_predictions(&profile("food")).unwrap();
        assert_eq!(preds.len(), 10);
        for (category, p) in &preds {
            assert_eq!(&p.category, category);
        }
    }

    #[test]
    fn test_recommendations_only_for_history() {
        let manager = trained_manager();
        let history = vec![
            e("2025-01-10", "food", 400.0),
            e("2025-02-10", "food", 500.0),
            e("2025-02-11", "travel", 50.0),
            e("2025-02-12", "crypto", 50.0),
        ];
        let recs = manager
            .generate_budget_recommendations(&profile("food"), &history)
            .unwrap();

        let cats: Vec<&str> = recs.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(cats, vec!["food", "travel"]);
        assert_eq!(recs[0].historical_average, 450.0);
    }

    #[test]
    fn test_detect_anomalies_flags_share_of_training_like_data() {
        let manager = trained_manager();
        let expenses: Vec<Expense> = (1..=12)
            .map(|m| e(&format!("2025-{:02}-03", m), "food", 400.0))
            .collect();
        let anomalies = manager
            .detect_anomalies(&expenses, Some(&profile("food")))
            .unwrap();

        assert!(anomalies.len() <= expenses.len());
        for a in &anomalies {
            assert!(a.anomaly_score < 0.0);
            assert_eq!(a.reason, anomaly_reason(a.anomaly_score));
        }
    }

    #[test]
    fn test_smart_insights_without_expenses() {
        let manager = trained_manager();
        let insights = manager
            .get_smart_insights(&profile("food"), &[], &BTreeMap::new())
            .unwrap();

        assert_eq!(insights.predictions.len(), 10);
        assert!(insights.anomalies.is_empty());
        assert!(insights.recommendations.is_empty());
        assert_eq!(insights.trends, SpendingTrends::default());
        assert!(insights.alerts.is_empty());
        assert!(insights.optimization_tips.is_empty());
    }

    #[test]
    fn test_optimize_budget_allocates_total() {
        let manager = trained_manager();
        let current: BTreeMap<String, f64> =
            [("food".to_string(), 100_000.0)].into_iter().collect();
        let result = manager
            .optimize_budget(&profile("food"), &current, 3000.0)
            .unwrap();

        assert_eq!(result.predictions.len(), 10);
        let allocated: f64 = result.optimized_budget.values().sum();
        assert!((allocated - 3000.0).abs() < 0.1);
        assert_eq!(result.savings_opportunities.len(), 1);
        assert!(result.total_savings > 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("model.json.gz");

        let mut manager = trained_manager();
        let fingerprint = manager.save(&path).unwrap();
        assert_eq!(fingerprint.len(), 64);
        assert_eq!(manager.info().fingerprint.as_deref(), Some(fingerprint.as_str()));

        let mut loaded = BudgetManager::new(small_config());
        loaded.load(&path).unwrap();
        assert!(loaded.is_trained());
        assert_eq!(loaded.info().fingerprint, Some(fingerprint));
        assert_eq!(loaded.info().training, manager.info().training);

        let (original, restored) = (manager.trained().unwrap(), loaded.trained().unwrap());
        assert_eq!(restored.scaler, original.scaler);
        assert_eq!(restored.report, original.report);
        assert_eq!(restored.anomaly.offset(), original.anomaly.offset());

        let p = profile("travel");
        assert_eq!(
            loaded.predict_spending(&p).unwrap(),
            manager.predict_spending(&p).unwrap()
        );
    }

    #[test]
    fn test_train_rejects_non_finite_records() {
        let mut records = generate_sample_data(&small_config().synthetic, 7).unwrap();
        records[4].amount = f64::NAN;

        let mut manager = BudgetManager::new(small_config());
        match manager.train(Some(records.clone())) {
            Err(Error::InvalidData(msg)) => {
                assert!(msg.contains("Training record 5"), "{}", msg);
                assert!(msg.contains("amount"), "{}", msg);
            }
            other => panic!("expected InvalidData, got {:?}", other),
        }
        assert!(!manager.is_trained());

        records[4].amount = 120.0;
        records[9].user_income = f64::INFINITY;
        assert!(matches!(
            manager.train(Some(records)),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut manager = BudgetManager::new(small_config());
        assert!(matches!(
            manager.load(&dir.path().join("nope.json.gz")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json.gz");
        fs::write(&path, b"not gzip").unwrap();

        let mut manager = BudgetManager::new(small_config());
        assert!(manager.load(&path).is_err());
        assert!(!manager.is_trained());
    }
}
