use crate::analysis::aggregate;
use crate::data::ImageSource;
use crate::logging::{clear_correlation_id, set_correlation_id, BatchSpan};
use crate::orientation::OrientationSample;
use crate::pipeline::{FailureKind, TiltEstimate, TiltPipeline};
use anyhow::Context;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// One photograph plus the device attitude captured with it
#[derive(Debug, Clone)]
pub struct CaptureInput {
    pub image: ImageSource,
    pub orientation: Option<OrientationSample>,
}

impl CaptureInput {
    pub fn new(image: impl Into<ImageSource>, orientation: Option<OrientationSample>) -> Self {
        Self {
            image: image.into(),
            orientation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFailure {
    pub index: usize,
    pub kind: FailureKind,
    pub message: String,
}

/// Per-image estimates in input order next to their aggregate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub estimates: Vec<TiltEstimate>,
    pub failures: Vec<ImageFailure>,
    pub reliable_count: usize,
    pub aggregate: TiltEstimate,
}

/// Runs independent per-image pipelines on a bounded pool, then folds them
pub struct BatchAnalyzer {
    pipeline: Arc<TiltPipeline>,
    pool: ThreadPool,
}

impl BatchAnalyzer {
    pub fn new(pipeline: TiltPipeline) -> crate::Result<Self> {
        let workers = pipeline.config().aggregation.max_workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tilt-worker-{}", i))
            .build()
            .context("failed to build analysis worker pool")?;

        Ok(Self {
            pipeline: Arc::new(pipeline),
            pool,
        })
    }

    pub fn pipeline(&self) -> &TiltPipeline {
        &self.pipeline
    }

    /// Analyze every capture and aggregate the reliable ones.
    ///
    /// A failing image contributes a degraded estimate and never aborts the
    /// batch.
    pub fn analyze(&self, inputs: &[CaptureInput]) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let batch_span = BatchSpan::new(batch_id, inputs.len());
        let _enter = batch_span.enter();

        let pipeline = &self.pipeline;
        let results: Vec<_> = self.pool.install(|| {
            inputs
                .par_iter()
                .enumerate()
                .map(|(index, input)| {
                    set_correlation_id(batch_id);
                    let result =
                        pipeline.run_source(&input.image, input.orientation.as_ref(), Some(index));
                    clear_correlation_id();
                    result
                })
                .collect()
        });

        let mut estimates = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(estimate) => estimates.push(estimate),
                Err(e) => {
                    batch_span.record_image_failure(index, &inputs[index].image.describe(), &e);
                    estimates.push(e.to_estimate());
                    failures.push(ImageFailure {
                        index,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let threshold = self.pipeline.config().aggregation.reliable_confidence;
        let reliable_count = estimates
            .iter()
            .filter(|estimate| estimate.is_reliable(threshold))
            .count();
        let aggregate = aggregate(&estimates, threshold);
        batch_span.record_aggregate(&aggregate, reliable_count, failures.len());

        BatchReport {
            batch_id,
            estimates,
            failures,
            reliable_count,
            aggregate,
        }
    }
}
