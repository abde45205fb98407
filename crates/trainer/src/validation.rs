//! K-fold cross-validation and regression metrics
//!
//! Purely diagnostic: the scores estimate generalization error, the
//! deployed model is refit on every row afterwards.

use pawtection_model::Pipeline;
use serde::Serialize;
use tracing::info;

use crate::dataset::Dataset;
use crate::deterministic::LcgRng;
use crate::errors::{Result, TrainerError};
use crate::trainer::PipelineTrainer;

/// R², mean squared error and mean absolute error of one prediction set
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub r2: f64,
    pub mse: f64,
    pub mae: f64,
}

/// Mean and population standard deviation across folds
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    pub std: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub r2: Spread,
    pub mse: Spread,
    pub mae: Spread,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FoldResult {
    pub fold: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub test: RegressionMetrics,
    pub train: Option<RegressionMetrics>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrossValidationReport {
    pub folds: Vec<FoldResult>,
    pub test: MetricsSummary,
    pub train: Option<MetricsSummary>,
}

pub fn regression_metrics(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
    let n = y_true.len() as f64;
    if y_true.is_empty() {
        return RegressionMetrics {
            r2: 0.0,
            mse: 0.0,
            mae: 0.0,
        };
    }

    let mean = y_true.iter().sum::<f64>() / n;
    let (ss_res, abs_err, ss_tot) = y_true.iter().zip(y_pred).fold(
        (0.0, 0.0, 0.0),
        |(ss_res, abs_err, ss_tot), (&t, &p)| {
            let residual = t - p;
            (
                ss_res + residual * residual,
                abs_err + residual.abs(),
                ss_tot + (t - mean) * (t - mean),
            )
        },
    );

    // Constant targets: perfect predictions score 1, anything else 0.
    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    RegressionMetrics {
        r2,
        mse: ss_res / n,
        mae: abs_err / n,
    }
}

/// Score a fitted pipeline against labelled rows
pub fn evaluate(pipeline: &Pipeline, dataset: &Dataset) -> RegressionMetrics {
    let predictions = pipeline.predict_batch(&dataset.features);
    regression_metrics(&dataset.targets, &predictions)
}

/// Shuffled k-fold splitter.
///
/// The first `n % k` folds hold one extra row. Test indices come in
/// shuffled order, train indices in ascending order.
#[derive(Clone, Debug)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed,
        }
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 || self.n_splits > n_samples {
            return Err(TrainerError::Training(format!(
                "cannot make {} folds from {} rows",
                self.n_splits, n_samples
            )));
        }

        let mut order: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            LcgRng::new(self.seed).shuffle(&mut order);
        }

        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;
        let mut splits = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < extra);
            let test = order[start..start + size].to_vec();

            let mut in_test = vec![false; n_samples];
            for &i in &test {
                in_test[i] = true;
            }
            let train = (0..n_samples).filter(|&i| !in_test[i]).collect();

            splits.push((train, test));
            start += size;
        }

        Ok(splits)
    }
}

fn spread(values: impl Iterator<Item = f64> + Clone) -> Spread {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let var = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Spread {
        mean,
        std: var.sqrt(),
    }
}

fn summarize(metrics: &[RegressionMetrics]) -> MetricsSummary {
    MetricsSummary {
        r2: spread(metrics.iter().map(|m| m.r2)),
        mse: spread(metrics.iter().map(|m| m.mse)),
        mae: spread(metrics.iter().map(|m| m.mae)),
    }
}

/// Fit a fresh pipeline per fold and score it on the held-out rows.
///
/// The scaler is refit inside every fold, so held-out rows never leak into
/// the preprocessing statistics.
pub fn cross_validate(trainer: &PipelineTrainer, dataset: &Dataset) -> Result<CrossValidationReport> {
    let params = trainer.params();
    let splits = KFold::new(params.folds, params.seed).split(dataset.len())?;

    let mut folds = Vec::with_capacity(splits.len());
    for (fold, (train_idx, test_idx)) in splits.iter().enumerate() {
        let train_set = dataset.subset(train_idx);
        let test_set = dataset.subset(test_idx);

        let pipeline = trainer.fit(&train_set)?;
        let test = evaluate(&pipeline, &test_set);
        let train = params
            .return_train_score
            .then(|| evaluate(&pipeline, &train_set));

        info!(
            "Fold {}/{}: R² {:.4}, MSE {:.4}, MAE {:.4}",
            fold + 1,
            splits.len(),
            test.r2,
            test.mse,
            test.mae
        );

        folds.push(FoldResult {
            fold,
            train_size: train_set.len(),
            test_size: test_set.len(),
            test,
            train,
        });
    }

    let test_metrics: Vec<RegressionMetrics> = folds.iter().map(|f| f.test).collect();
    let train_metrics: Option<Vec<RegressionMetrics>> = folds.iter().map(|f| f.train).collect();

    Ok(CrossValidationReport {
        test: summarize(&test_metrics),
        train: train_metrics.map(|m| summarize(&m)),
        folds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trainer::TrainingParams;
    use pawtection_model::FEATURE_COUNT;

    #[test]
    fn metrics_on_known_values() {
        let m = regression_metrics(&[3.0, -0.5, 2.0, 7.0], &[2.5, 0.0, 2.0, 8.0]);
        assert!((m.mse - 0.375).abs() < 1e-12);
        assert!((m.mae - 0.5).abs() < 1e-12);
        assert!((m.r2 - 0.948_608_137_044_968).abs() < 1e-9);
    }

    #[test]
    fn r2_on_constant_targets() {
        assert_eq!(regression_metrics(&[5.0, 5.0], &[5.0, 5.0]).r2, 1.0);
        assert_eq!(regression_metrics(&[5.0, 5.0], &[4.0, 6.0]).r2, 0.0);
    }

    #[test]
    fn kfold_partitions_every_row_once() {
        let splits = KFold::new(5, 42).split(23).unwrap();
        assert_eq!(splits.len(), 5);

        let sizes: Vec<usize> = splits.iter().map(|(_, test)| test.len()).collect();
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);

        let mut seen: Vec<usize> = splits.iter().flat_map(|(_, test)| test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());

        for (train, test) in &splits {
            assert_eq!(train.len() + test.len(), 23);
            assert!(test.iter().all(|i| !train.contains(i)));
        }
    }

    #[test]
    fn kfold_is_deterministic_and_shuffled() {
        let a = KFold::new(5, 42).split(40).unwrap();
        let b = KFold::new(5, 42).split(40).unwrap();
        assert_eq!(a, b);
        assert_ne!(a[0].1, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn kfold_rejects_too_many_folds() {
        assert!(KFold::new(5, 42).split(4).is_err());
        assert!(KFold::new(1, 42).split(10).is_err());
    }

    #[test]
    fn spread_uses_population_std() {
        let s = spread([1.0, 3.0].into_iter());
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.std, 1.0);
    }

    #[test]
    fn cross_validation_reports_every_fold() {
        let features: Vec<[f64; FEATURE_COUNT]> = (0..60)
            .map(|i| [(i % 7 + 1) as f64, (i % 12 + 1) as f64, 1.0, 0.0, 2.0, (i % 2) as f64])
            .collect();
        let targets: Vec<f64> = features.iter().map(|r| r[0] * 10.0 + r[5] * 20.0).collect();
        let dataset = Dataset::new(features, targets).unwrap();

        let trainer = PipelineTrainer::new(TrainingParams {
            n_trees: 10,
            ..TrainingParams::default()
        });
        let report = cross_validate(&trainer, &dataset).unwrap();

        assert_eq!(report.folds.len(), 5);
        assert!(report.folds.iter().all(|f| f.test_size == 12 && f.train_size == 48));
        assert!(report.train.is_some());
        assert!(report.test.r2.mean > 0.5);
        assert!(report.test.mse.mean >= 0.0);
    }

    #[test]
    fn train_scores_can_be_skipped() {
        let features: Vec<[f64; FEATURE_COUNT]> = (0..20).map(|i| [i as f64, 1.0, 1.0, 0.0, 1.0, 0.0]).collect();
        let targets: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let dataset = Dataset::new(features, targets).unwrap();

        let trainer = PipelineTrainer::new(TrainingParams {
            n_trees: 4,
            return_train_score: false,
            ..TrainingParams::default()
        });
        let report = cross_validate(&trainer, &dataset).unwrap();
        assert!(report.train.is_none());
        assert!(report.folds.iter().all(|f| f.train.is_none()));
    }
}
