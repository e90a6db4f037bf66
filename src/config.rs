//! Agent configuration shared by the binaries.
//!
//! Defaults reproduce the standard player; a JSON file may override any
//! subset of fields, e.g. `{"policy": "montecarlo", "monte_carlo": {"trials": 200}}`.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expectimax::{Expectimax, ExpectimaxConfig};
use crate::heuristic::EvaluatorKind;
use crate::monte_carlo::{MonteCarlo, MonteCarloConfig};
use crate::Policy;

/// Which decision policy drives the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Expectimax,
    MonteCarlo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub policy: PolicyKind,
    pub expectimax: ExpectimaxConfig,
    pub monte_carlo: MonteCarloConfig,
}

impl AgentConfig {
    pub fn from_json_str(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Use `kind` for whichever policy is built.
    pub fn with_evaluator(mut self, kind: EvaluatorKind) -> Self {
        self.expectimax.evaluator = kind;
        self.monte_carlo.evaluator = kind;
        self
    }

    /// Build a fresh policy instance; every game gets its own.
    pub fn build_policy(&self) -> Box<dyn Policy + Send> {
        match self.policy {
            PolicyKind::Expectimax => Box::new(Expectimax::with_config(self.expectimax.clone())),
            PolicyKind::MonteCarlo => Box::new(MonteCarlo::with_config(self.monte_carlo.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectimax::ChanceWeighting;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(AgentConfig::from_json_str("{}").unwrap(), AgentConfig::default());
    }

    #[test]
    fn partial_overrides() {
        let cfg = AgentConfig::from_json_str(
            r#"{"policy": "montecarlo", "monte_carlo": {"trials": 200, "seed": 7},
                "expectimax": {"max_depth": 4, "chance_weighting": "weighted"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.policy, PolicyKind::MonteCarlo);
        assert_eq!(cfg.monte_carlo.trials, 200);
        assert_eq!(cfg.monte_carlo.seed, Some(7));
        assert_eq!(cfg.monte_carlo.rollout_depth, 3);
        assert_eq!(cfg.expectimax.max_depth, 4);
        assert_eq!(cfg.expectimax.shallow_depth, 3);
        assert_eq!(cfg.expectimax.chance_weighting, ChanceWeighting::Weighted);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(AgentConfig::from_json_str(r#"{"policy": "minimax"}"#).is_err());
    }

    #[test]
    fn evaluator_override_applies_to_both_policies() {
        let cfg = AgentConfig::default().with_evaluator(EvaluatorKind::Squares);
        assert_eq!(cfg.expectimax.evaluator, EvaluatorKind::Squares);
        assert_eq!(cfg.monte_carlo.evaluator, EvaluatorKind::Squares);
    }
}
