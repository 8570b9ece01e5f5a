//! Prediction command implementation

use std::path::Path;

use anyhow::{Context, Result};

use pennywise_core::{Category, PennywiseConfig, RiskTolerance, UserProfile};

use super::{model_path, open_model, title_case};

/// Profile fields accepted on the command line
#[derive(Debug, Clone)]
pub struct PredictArgs {
    pub income: f64,
    pub age: f64,
    pub category: String,
    pub risk: String,
    pub month: Option<u32>,
}

impl PredictArgs {
    /// Validate names and build the profile the model expects
    pub fn to_profile(&self) -> Result<UserProfile> {
        let category: Category = self
            .category
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("Valid categories: {}", Category::names().join(", ")))?;
        let risk: RiskTolerance = self.risk.parse().map_err(|e: String| anyhow::anyhow!(e))?;

        Ok(UserProfile {
            user_income: Some(self.income),
            user_age: Some(self.age),
            user_risk_tolerance: Some(risk.as_str().to_string()),
            month: self.month,
            category: Some(category.as_str().to_string()),
            ..UserProfile::default()
        })
    }
}

pub fn cmd_predict(config: PennywiseConfig, args: PredictArgs, model: Option<&Path>) -> Result<()> {
    let profile = args.to_profile()?;
    let path = model_path(&config, model);
    let manager = open_model(config, &path)?;

    let prediction = manager
        .predict_spending(&profile)
        .context("Prediction failed")?;

    println!();
    println!("🔮 Spending Prediction");
    println!("   Category:   {}", title_case(&prediction.category));
    println!("   Predicted:  ${:.2}", prediction.predicted_amount);
    println!("   Confidence: {:.1}%", prediction.confidence);
    println!();
    Ok(())
}
