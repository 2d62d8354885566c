use crate::pipeline::stage::Stage;
use crate::types::ids::GridId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageOutcome {
    /// The stage wrote its values. For the region stage, the number of zones aggregated.
    Completed { zones_updated: usize },
    /// The provider call failed; nothing was written.
    Failed { reason: String },
    /// The stage had nothing it could do yet.
    Skipped { reason: String },
}

impl StageOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
    pub finished_at: DateTime<Utc>,
}

/// What a pipeline run did, stage by stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub grid: GridId,
    pub started_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
}

impl PipelineReport {
    pub fn new(grid: GridId) -> Self {
        Self {
            grid,
            started_at: Utc::now(),
            stages: Vec::new(),
        }
    }

    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        self.stages.push(StageReport {
            stage,
            outcome,
            finished_at: Utc::now(),
        });
    }

    /// Latest outcome recorded for `stage`.
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .rev()
            .find(|report| report.stage == stage)
            .map(|report| &report.outcome)
    }

    /// Stages whose provider call failed, in execution order.
    pub fn failed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|report| report.outcome.is_failed())
            .map(|report| report.stage)
            .collect()
    }

    /// The failed stages plus everything downstream of them, in execution order. Rerun these
    /// to retry: a failed zone layer also reruns `Potential` and `RegionMetrics`.
    pub fn stages_to_retry(&self) -> Vec<Stage> {
        let mut stages = self.failed_stages();
        if stages.iter().any(|stage| stage.layer().is_some()) {
            stages.extend([Stage::Potential, Stage::RegionMetrics]);
        }
        stages.sort();
        stages.dedup();
        stages
    }

    pub fn is_complete(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(|report| report.outcome.is_completed())
    }
}
