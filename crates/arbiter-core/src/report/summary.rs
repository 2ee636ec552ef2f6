use crate::model::FinalResult;
use serde::{Deserialize, Serialize};

/// Descriptive statistics over one series. Quartiles use linear
/// interpolation between closest ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        Some(Self {
            mean,
            median: quantile(&sorted, 0.5),
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub config_id: String,
    pub total: usize,
    pub scored: usize,
    pub failed: usize,
    pub score: Option<Stats>,
    pub latency_ms: Option<Stats>,
}

/// One summary per prompt variant, in order of first appearance.
pub fn summarize(results: &[FinalResult]) -> Vec<VariantSummary> {
    let mut order: Vec<&str> = Vec::new();
    for r in results {
        if !order.contains(&r.config_id.as_str()) {
            order.push(&r.config_id);
        }
    }

    order
        .into_iter()
        .map(|config_id| {
            let rows: Vec<&FinalResult> =
                results.iter().filter(|r| r.config_id == config_id).collect();
            let scores: Vec<f64> = rows.iter().filter_map(|r| r.score).collect();
            let latencies: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.latency_ms)
                .map(|ms| ms as f64)
                .collect();
            VariantSummary {
                config_id: config_id.to_string(),
                total: rows.len(),
                scored: scores.len(),
                failed: rows.iter().filter(|r| r.error.is_some()).count(),
                score: Stats::from_values(&scores),
                latency_ms: Stats::from_values(&latencies),
            }
        })
        .collect()
}
