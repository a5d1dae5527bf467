//! Per-category Slotted-Aloha configuration, parsed from TOML.

use serde::Deserialize;

use crate::error::InitError;
use crate::saloha::{Category, CollisionAlgorithm, SimuRule, SlotTable};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmConfig {
    Dsa,
    Crdsa,
}

impl From<AlgorithmConfig> for CollisionAlgorithm {
    fn from(c: AlgorithmConfig) -> Self {
        match c {
            AlgorithmConfig::Dsa => CollisionAlgorithm::Dsa,
            AlgorithmConfig::Crdsa => CollisionAlgorithm::Crdsa,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimuRuleConfig {
    pub category: String,
    pub nb_max_packets: u32,
    pub nb_replicas: u32,
    pub ratio: f64,
}

impl From<SimuRuleConfig> for SimuRule {
    fn from(c: SimuRuleConfig) -> Self {
        SimuRule { category: c.category, nb_max_packets: c.nb_max_packets, nb_replicas: c.nb_replicas, ratio: c.ratio }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub label: String,
    pub algorithm: AlgorithmConfig,
    pub total_slots: u32,
    pub carriers: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlohaConfig {
    pub aloha_period_frames: u64,
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub simu_rules: Vec<SimuRuleConfig>,
}

impl AlohaConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, InitError> {
        toml::from_str(text).map_err(|e| InitError::Parse(e.to_string()))
    }

    pub fn build_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .map(|c| Category {
                label: c.label.clone(),
                algorithm: c.algorithm.clone().into(),
                table: SlotTable::new(c.total_slots, c.carriers),
            })
            .collect()
    }

    pub fn build_simu_rules(&self) -> Vec<SimuRule> {
        self.simu_rules.iter().cloned().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        aloha_period_frames = 8

        [[categories]]
        label = "std"
        algorithm = "crdsa"
        total_slots = 100
        carriers = 4

        [[simu_rules]]
        category = "std"
        nb_max_packets = 5
        nb_replicas = 2
        ratio = 0.1
    "#;

    #[test]
    fn parses_categories_and_simu_rules() {
        let config = AlohaConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.aloha_period_frames, 8);
        let categories = config.build_categories();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].table.slots_per_carrier, 25);
        assert_eq!(config.simu_rules.len(), 1);
    }
}
