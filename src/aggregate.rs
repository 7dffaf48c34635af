//! Turns the results of one request into display state.
//!
//! Ordering is by model identifier so the same set of results always reads
//! the same way, whatever order the models answered in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::fmt::{display_confidence, fmt_percent};
use crate::inference::{Prediction, PredictionResult};

/// Shown before anything has been predicted, and after the canvas is cleared.
pub const IDLE_STATE: &str = "Prediction: -";

/// Shown when the service answered with no results at all.
pub const EMPTY_STATE: &str = "No prediction available";

/// Group label for batch results that carry no filename.
pub const UNNAMED_FILE: &str = "(unnamed)";

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackLine {
    Scored {
        model: String,
        pred: i64,
        percent: String,
    },
    Failed {
        filename: Option<String>,
        message: String,
    },
}

impl FeedbackLine {
    pub fn render(&self) -> String {
        match self {
            FeedbackLine::Scored {
                model,
                pred,
                percent,
            } => format!("{model}: {pred} ({percent})"),
            FeedbackLine::Failed {
                filename: Some(f),
                message,
            } => format!("Error ({f}): {message}"),
            FeedbackLine::Failed {
                filename: None,
                message,
            } => format!("Error: {message}"),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FeedbackLine::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Feedback {
    #[default]
    Idle,
    Empty,
    Lines(Vec<FeedbackLine>),
}

impl Feedback {
    /// Scored entries sorted by model, then failures sorted by filename and
    /// message. Failures never hide scored entries from other models.
    pub fn from_results(results: Vec<PredictionResult>) -> Self {
        if results.is_empty() {
            return Feedback::Empty;
        }

        let mut scored: Vec<Prediction> = Vec::new();
        let mut failed: Vec<(Option<String>, String)> = Vec::new();
        for r in results {
            match r {
                PredictionResult::Scored(p) => scored.push(p),
                PredictionResult::Failed { filename, error } => {
                    failed.push((filename, error.to_string()))
                }
            }
        }

        scored.sort_by(compare_predictions);
        failed.sort();

        let lines = scored
            .into_iter()
            .map(|p| FeedbackLine::Scored {
                percent: fmt_percent(p.confidence),
                model: p.model,
                pred: p.pred,
            })
            .chain(
                failed
                    .into_iter()
                    .map(|(filename, message)| FeedbackLine::Failed { filename, message }),
            )
            .collect();
        Feedback::Lines(lines)
    }

    pub fn lines(&self) -> &[FeedbackLine] {
        match self {
            Feedback::Lines(lines) => lines,
            _ => &[],
        }
    }

    pub fn has_failures(&self) -> bool {
        self.lines().iter().any(FeedbackLine::is_failure)
    }

    /// Never empty: idle and empty states have their own text.
    pub fn render(&self) -> String {
        match self {
            Feedback::Idle => IDLE_STATE.to_string(),
            Feedback::Empty => EMPTY_STATE.to_string(),
            Feedback::Lines(lines) => lines
                .iter()
                .map(FeedbackLine::render)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn compare_predictions(a: &Prediction, b: &Prediction) -> Ordering {
    a.model
        .cmp(&b.model)
        .then(a.pred.cmp(&b.pred))
        .then(display_confidence(a.confidence).total_cmp(&display_confidence(b.confidence)))
}

/// Results of a batch upload for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileGroup {
    pub filename: String,
    pub feedback: Feedback,
}

/// Groups batch results by filename, sorts each group per model, then sorts
/// the groups by filename.
pub fn group_by_file(results: Vec<PredictionResult>) -> Vec<FileGroup> {
    let mut groups: BTreeMap<String, Vec<PredictionResult>> = BTreeMap::new();
    for r in results {
        let key = r.filename().unwrap_or(UNNAMED_FILE).to_string();
        groups.entry(key).or_default().push(r);
    }
    groups
        .into_iter()
        .map(|(filename, results)| FileGroup {
            filename,
            feedback: Feedback::from_results(results),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn scored(model: &str, pred: i64, confidence: Option<f64>) -> PredictionResult {
        PredictionResult::Scored(Prediction {
            filename: None,
            model: model.to_string(),
            pred,
            confidence,
        })
    }

    fn in_file(file: &str, r: PredictionResult) -> PredictionResult {
        match r {
            PredictionResult::Scored(mut p) => {
                p.filename = Some(file.to_string());
                PredictionResult::Scored(p)
            }
            PredictionResult::Failed { error, .. } => PredictionResult::Failed {
                filename: Some(file.to_string()),
                error,
            },
        }
    }

    #[test]
    fn empty_results_render_explicit_state() {
        let fb = Feedback::from_results(Vec::new());
        assert_eq!(fb, Feedback::Empty);
        assert_eq!(fb.render(), EMPTY_STATE);
        assert!(!fb.render().trim().is_empty());
        assert_eq!(Feedback::Idle.render(), IDLE_STATE);
    }

    #[test]
    fn sorted_by_model_regardless_of_arrival_order() {
        let a = vec![
            scored("MLP", 7, Some(0.9)),
            scored("CNN", 7, Some(0.8)),
            scored("KNN", 1, Some(0.4)),
        ];
        let mut b = a.clone();
        b.reverse();

        let fa = Feedback::from_results(a);
        let fb = Feedback::from_results(b);
        assert_eq!(fa, fb);
        assert_eq!(
            fa.render(),
            "CNN: 7 (80.00%)\nKNN: 1 (40.00%)\nMLP: 7 (90.00%)"
        );
    }

    #[test]
    fn failures_do_not_suppress_valid_entries() {
        let fb = Feedback::from_results(vec![
            PredictionResult::failed(FetchError::server(None, "model offline")),
            scored("MLP", 3, Some(0.5)),
        ]);
        assert!(fb.has_failures());
        assert_eq!(
            fb.render(),
            "MLP: 3 (50.00%)\nError: server error: model offline"
        );
    }

    #[test]
    fn failures_follow_scores_in_a_fixed_order() {
        let arrivals = vec![
            PredictionResult::failed(FetchError::server(None, "model offline")),
            scored("MLP", 3, Some(0.5)),
            PredictionResult::failed(FetchError::Malformed("missing pred".into())),
            PredictionResult::failed(FetchError::server(None, "busy")),
        ];
        let mut reversed = arrivals.clone();
        reversed.reverse();

        let fa = Feedback::from_results(arrivals);
        assert_eq!(fa, Feedback::from_results(reversed));
        assert_eq!(
            fa.render(),
            "MLP: 3 (50.00%)\n\
             Error: prediction unavailable: missing pred\n\
             Error: server error: busy\n\
             Error: server error: model offline"
        );
    }

    #[test]
    fn bad_confidence_renders_as_zero_percent() {
        let fb = Feedback::from_results(vec![
            scored("A", 1, None),
            scored("B", 2, Some(f64::NAN)),
            scored("C", 3, Some(3.5)),
        ]);
        let text = fb.render();
        assert!(!text.contains("NaN"));
        assert_eq!(text, "A: 1 (0.00%)\nB: 2 (0.00%)\nC: 3 (0.00%)");
    }

    #[test]
    fn batch_results_group_by_file_then_model() {
        let groups = group_by_file(vec![
            in_file("two.png", scored("MLP", 2, Some(0.7))),
            in_file("one.png", scored("MLP", 1, Some(0.6))),
            in_file("two.png", scored("CNN", 2, Some(0.9))),
            in_file(
                "broken.png",
                PredictionResult::failed(FetchError::server(None, "cannot identify image file")),
            ),
            scored("CNN", 5, Some(0.2)),
        ]);

        let names: Vec<&str> = groups.iter().map(|g| g.filename.as_str()).collect();
        assert_eq!(names, vec![UNNAMED_FILE, "broken.png", "one.png", "two.png"]);

        let two = &groups[3].feedback;
        assert_eq!(two.render(), "CNN: 2 (90.00%)\nMLP: 2 (70.00%)");
        assert!(groups[1].feedback.has_failures());
        assert_eq!(
            groups[1].feedback.render(),
            "Error (broken.png): server error: cannot identify image file"
        );
    }
}
