//! Accuracy and loss series derived from the history window.
//!
//! Every poll rebuilds [`ChartData`] from scratch. A model's k-th entry in
//! the window sits at index k on a shared `1..=window` axis; indices a model
//! has no entry for are gaps (`None`), never zero.

use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::history::HistoryPoint;
use crate::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSeries {
    pub model: String,
    pub accuracy: Vec<Option<f64>>,
    pub loss: Vec<Option<f64>>,
}

impl ModelSeries {
    /// Accuracy at 1-based `index`; `None` is a gap.
    pub fn accuracy_at(&self, index: usize) -> Option<f64> {
        index
            .checked_sub(1)
            .and_then(|i| self.accuracy.get(i).copied().flatten())
    }

    pub fn loss_at(&self, index: usize) -> Option<f64> {
        index
            .checked_sub(1)
            .and_then(|i| self.loss.get(i).copied().flatten())
    }

    pub fn values(&self, kind: ChartKind) -> &[Option<f64>] {
        match kind {
            ChartKind::Accuracy => &self.accuracy,
            ChartKind::Loss => &self.loss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Accuracy,
    Loss,
}

impl ChartKind {
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Accuracy => "Accuracy",
            ChartKind::Loss => "Loss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    labels: Vec<usize>,
    series: Vec<ModelSeries>,
}

impl ChartData {
    /// Builds per-model series from the most recent `window` points.
    pub fn from_history(points: &[HistoryPoint], window: usize) -> Self {
        let window = window.max(1);
        let recent = &points[points.len().saturating_sub(window)..];

        let mut per_model: HashMap<&str, Vec<f64>> = HashMap::new();
        for p in recent {
            per_model.entry(p.model.as_str()).or_default().push(p.confidence);
        }

        let mut series: Vec<ModelSeries> = per_model
            .into_iter()
            .map(|(model, confidences)| {
                let mut accuracy = vec![None; window];
                let mut loss = vec![None; window];
                for (i, c) in confidences.into_iter().enumerate() {
                    accuracy[i] = Some(c);
                    loss[i] = Some(1.0 - c);
                }
                ModelSeries {
                    model: model.to_string(),
                    accuracy,
                    loss,
                }
            })
            .collect();
        series.sort_by(|a, b| a.model.cmp(&b.model));

        Self {
            labels: (1..=window).collect(),
            series,
        }
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn series(&self) -> &[ModelSeries] {
        &self.series
    }

    pub fn series_for(&self, model: &str) -> Option<&ModelSeries> {
        self.series.iter().find(|s| s.model == model)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Accuracy is fixed to `[0, 1]`; loss starts at zero and grows to fit.
    pub fn axis(&self, kind: ChartKind) -> AxisRange {
        match kind {
            ChartKind::Accuracy => AxisRange { min: 0.0, max: 1.0 },
            ChartKind::Loss => {
                let max_loss = self
                    .series
                    .iter()
                    .flat_map(|s| s.loss.iter().flatten().copied())
                    .filter(|v| v.is_finite())
                    .fold(1.0_f64, f64::max);
                AxisRange {
                    min: 0.0,
                    max: max_loss,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// New data replaced the previous charts.
    Redrawn,
    /// The fetch returned nothing; the previous charts stay as they were.
    KeptEmpty,
    /// The fetch failed; the previous charts stay as they were.
    KeptFailed(FetchError),
}

/// Holds the last successfully fetched window and the poll schedule.
///
/// The schedule runs at a fixed rate from the first poll. Poll outcomes never
/// move it.
#[derive(Debug)]
pub struct ChartFeed {
    window: usize,
    interval: Duration,
    data: Option<ChartData>,
    redraws: u64,
    next_due: Option<Instant>,
}

impl ChartFeed {
    pub fn new(window: usize, interval: Duration) -> Self {
        Self {
            window: window.max(1),
            interval,
            data: None,
            redraws: 0,
            next_due: None,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn data(&self) -> Option<&ChartData> {
        self.data.as_ref()
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// When the next poll is due; `None` until the first poll has started.
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Returns true when a poll should start at `now`, and books the next one.
    ///
    /// The first call is always due. After that a poll is due every
    /// `interval`, counted from the first. Missed slots (a throttled tab) are
    /// skipped so a late check starts one poll, not a backlog.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        let due = match self.next_due {
            None => now,
            Some(due) if now >= due => due,
            Some(_) => return false,
        };
        let mut next = due + self.interval;
        if !self.interval.is_zero() {
            while next <= now {
                next += self.interval;
            }
        }
        self.next_due = Some(next);
        true
    }

    /// Applies one poll result. Empty or failed fetches leave the current
    /// data untouched.
    pub fn apply(&mut self, fetched: Result<Vec<HistoryPoint>, FetchError>) -> PollOutcome {
        match fetched {
            Ok(points) if points.is_empty() => {
                debug!("history empty; keeping charts");
                PollOutcome::KeptEmpty
            }
            Ok(points) => {
                self.data = Some(ChartData::from_history(&points, self.window));
                self.redraws += 1;
                PollOutcome::Redrawn
            }
            Err(error) => {
                warn!(%error, "history poll failed; keeping charts");
                PollOutcome::KeptFailed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_model_series_share_the_index_axis() {
        let data = ChartData::from_history(
            &[HistoryPoint::new("MLP", 0.9), HistoryPoint::new("CNN", 0.4)],
            50,
        );
        assert_eq!(data.labels().len(), 50);
        assert_eq!(data.labels()[0], 1);

        let mlp = data.series_for("MLP").unwrap();
        let cnn = data.series_for("CNN").unwrap();
        assert_eq!(mlp.accuracy_at(1), Some(0.9));
        let loss = cnn.loss_at(1).unwrap();
        assert!((loss - 0.6).abs() < 1e-12);

        // Gaps elsewhere, never zero.
        assert_eq!(mlp.accuracy_at(2), None);
        assert_eq!(cnn.loss_at(50), None);
        assert_eq!(mlp.accuracy.len(), 50);
        assert!(mlp.accuracy[1..].iter().all(Option::is_none));
    }

    #[test]
    fn series_are_ordered_by_model() {
        let data = ChartData::from_history(
            &[
                HistoryPoint::new("MLP", 0.5),
                HistoryPoint::new("CNN", 0.5),
                HistoryPoint::new("KNN", 0.5),
            ],
            10,
        );
        let models: Vec<&str> = data.series().iter().map(|s| s.model.as_str()).collect();
        assert_eq!(models, vec!["CNN", "KNN", "MLP"]);
    }

    #[test]
    fn only_the_most_recent_window_is_kept() {
        let points: Vec<HistoryPoint> = (0..8)
            .map(|i| HistoryPoint::new("MLP", i as f64 / 10.0))
            .collect();
        let data = ChartData::from_history(&points, 5);
        let mlp = data.series_for("MLP").unwrap();
        assert_eq!(mlp.accuracy_at(1), Some(0.3));
        assert_eq!(mlp.accuracy_at(5), Some(0.7));
        assert_eq!(mlp.accuracy_at(6), None);
    }

    #[test]
    fn loss_axis_is_zero_based_and_grows() {
        let data = ChartData::from_history(&[HistoryPoint::new("MLP", -0.5)], 3);
        assert_eq!(data.axis(ChartKind::Accuracy), AxisRange { min: 0.0, max: 1.0 });
        assert_eq!(data.axis(ChartKind::Loss), AxisRange { min: 0.0, max: 1.5 });

        let data = ChartData::from_history(&[HistoryPoint::new("MLP", 0.8)], 3);
        assert_eq!(data.axis(ChartKind::Loss).max, 1.0);
    }

    #[test]
    fn failed_or_empty_poll_keeps_previous_data() {
        let mut feed = ChartFeed::new(50, Duration::from_secs(5));
        assert_eq!(
            feed.apply(Ok(vec![HistoryPoint::new("MLP", 0.9)])),
            PollOutcome::Redrawn
        );
        let before = feed.data().cloned();

        let outcome = feed.apply(Err(FetchError::server(Some(500), "HTTP 500")));
        assert!(matches!(outcome, PollOutcome::KeptFailed(_)));
        assert_eq!(feed.data().cloned(), before);

        assert_eq!(feed.apply(Ok(Vec::new())), PollOutcome::KeptEmpty);
        assert_eq!(feed.data().cloned(), before);
        assert_eq!(feed.redraws(), 1);
    }

    #[test]
    fn each_poll_replaces_data_wholesale() {
        let mut feed = ChartFeed::new(10, Duration::from_secs(5));
        feed.apply(Ok(vec![HistoryPoint::new("MLP", 0.9)]));
        feed.apply(Ok(vec![HistoryPoint::new("CNN", 0.2)]));

        let data = feed.data().unwrap();
        assert!(data.series_for("MLP").is_none());
        assert_eq!(data.series_for("CNN").unwrap().accuracy_at(1), Some(0.2));
    }

    #[test]
    fn polls_run_every_interval_regardless_of_outcome() {
        let t0 = Instant::now();
        let mut feed = ChartFeed::new(50, Duration::from_secs(5));

        assert!(feed.poll_due(t0));
        assert!(!feed.poll_due(t0));
        assert!(!feed.poll_due(t0 + Duration::from_millis(4_999)));
        feed.apply(Err(FetchError::server(Some(503), "HTTP 503")));

        assert!(feed.poll_due(t0 + Duration::from_secs(5)));
        assert_eq!(feed.next_due(), Some(t0 + Duration::from_secs(10)));
        feed.apply(Ok(Vec::new()));
        assert!(!feed.poll_due(t0 + Duration::from_millis(9_999)));

        // A late check starts from the original grid.
        assert!(feed.poll_due(t0 + Duration::from_millis(10_300)));
        assert_eq!(feed.next_due(), Some(t0 + Duration::from_secs(15)));
    }

    #[test]
    fn missed_slots_start_one_poll() {
        let t0 = Instant::now();
        let mut feed = ChartFeed::new(50, Duration::from_secs(5));
        assert!(feed.poll_due(t0));

        assert!(feed.poll_due(t0 + Duration::from_secs(23)));
        assert!(!feed.poll_due(t0 + Duration::from_secs(24)));
        assert_eq!(feed.next_due(), Some(t0 + Duration::from_secs(25)));
    }
}
