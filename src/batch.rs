// 📦 Batch Scoring - CSV of profiles → CSV of assessments
// A bad row is reported in place; it never stops the batch

use crate::error::Result;
use crate::predictor::Predictor;
use crate::profile::ProfileInput;
use anyhow::Context as _;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct BatchRow {
    row: usize,
    will_churn: Option<bool>,
    probability: Option<f64>,
    risk_level: String,
    recommendations: String,
    error: String,
}

impl BatchRow {
    fn failed(row: usize, error: String) -> Self {
        BatchRow {
            row,
            will_churn: None,
            probability: None,
            risk_level: String::new(),
            recommendations: String::new(),
            error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub scored: usize,
    pub failed: usize,
    pub predicted_churn: usize,
}

impl BatchSummary {
    pub fn churn_rate(&self) -> f64 {
        if self.scored == 0 {
            0.0
        } else {
            self.predicted_churn as f64 / self.scored as f64
        }
    }
}

/// Score every row of `input`, writing one result row per input row to `output`
pub fn score_csv<R: Read, W: Write>(input: R, output: W, predictor: &Predictor) -> Result<BatchSummary> {
    let mut reader = csv::Reader::from_reader(input);
    let mut writer = csv::Writer::from_writer(output);
    let mut summary = BatchSummary::default();

    for (i, record) in reader.deserialize::<ProfileInput>().enumerate() {
        let row = i + 1;
        summary.total += 1;

        let input = match record {
            Ok(input) => input,
            // Type errors are row-level; anything else means the file itself is broken
            Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                summary.failed += 1;
                writer.serialize(BatchRow::failed(row, e.to_string()))?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let result = match predictor.assess(&input) {
            Ok(assessment) => {
                summary.scored += 1;
                if assessment.will_churn {
                    summary.predicted_churn += 1;
                }
                BatchRow {
                    row,
                    will_churn: Some(assessment.will_churn),
                    probability: Some(assessment.probability),
                    risk_level: assessment.risk_level.name().to_string(),
                    recommendations: assessment.recommendations.join(" | "),
                    error: String::new(),
                }
            }
            Err(e) if !e.is_fatal() => {
                summary.failed += 1;
                BatchRow::failed(row, e.to_string())
            }
            Err(e) => return Err(e),
        };
        writer.serialize(result)?;
    }

    writer.flush()?;

    tracing::info!(
        total = summary.total,
        scored = summary.scored,
        failed = summary.failed,
        predicted_churn = summary.predicted_churn,
        "batch scoring finished"
    );

    Ok(summary)
}

pub fn score_csv_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    predictor: &Predictor,
) -> anyhow::Result<BatchSummary> {
    let reader = File::open(input.as_ref())
        .with_context(|| format!("Failed to open batch input: {:?}", input.as_ref()))?;
    let writer = File::create(output.as_ref())
        .with_context(|| format!("Failed to create batch output: {:?}", output.as_ref()))?;

    Ok(score_csv(reader, writer, predictor)?)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::tests::fixed;

    const HEADER: &str = "customerID,gender,SeniorCitizen,Partner,Dependents,tenure,PhoneService,MultipleLines,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,StreamingTV,StreamingMovies,Contract,PaperlessBilling,PaymentMethod,MonthlyCharges,TotalCharges";

    fn run(rows: &[&str], p: f64) -> (BatchSummary, Vec<csv::StringRecord>) {
        let mut data = String::from(HEADER);
        for row in rows {
            data.push('\n');
            data.push_str(row);
        }

        let mut out = Vec::new();
        let summary = score_csv(data.as_bytes(), &mut out, &fixed(p)).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let records = reader.records().map(|r| r.unwrap()).collect();
        (summary, records)
    }

    #[test]
    fn test_scores_every_row() {
        let (summary, records) = run(
            &[
                "0001-A,Female,No,Yes,No,3,Yes,No,DSL,No,No,No,No,No,No,Month-to-month,Yes,Electronic check,90.0,270.0",
                "0002-B,Male,No,Yes,Yes,40,Yes,Yes,Fiber optic,Yes,Yes,No,Yes,Yes,Yes,Two year,No,Mailed check,105.5,4220.0",
            ],
            0.8,
        );

        assert_eq!(summary, BatchSummary { total: 2, scored: 2, failed: 0, predicted_churn: 2 });
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "1");
        assert_eq!(&records[0][1], "true");
        assert_eq!(&records[0][3], "High");
        assert_eq!(records[0][4].split(" | ").count(), 5);
        assert_eq!(&records[0][5], "");
        assert!((summary.churn_rate() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bad_rows_do_not_stop_batch() {
        let (summary, records) = run(
            &[
                "0001-A,Female,No,Yes,No,3,Yes,No,Cable,No,No,No,No,No,No,Month-to-month,Yes,Electronic check,90.0,270.0",
                "0002-B,Female,No,Yes,No,3,Yes,No,DSL,No,No,No,No,No,No,Month-to-month,Yes,Electronic check,90.0,",
                "0003-C,Female,No,Yes,No,3,Yes,No,DSL,No,No,No,No,No,No,Month-to-month,Yes,Electronic check,90.0,270.0",
            ],
            0.2,
        );

        assert_eq!(summary.total, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.predicted_churn, 0);

        assert!(records[0][5].contains("InternetService"));
        assert!(!records[1][5].is_empty());
        assert_eq!(&records[2][1], "false");
    }

    #[test]
    fn test_file_round() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(
            &input,
            format!(
                "{}\n0001-A,Male,Yes,No,No,60,Yes,Yes,No,No,No,No,No,No,No,Two year,No,Credit card,25.0,1500.0\n",
                HEADER
            ),
        )
        .unwrap();

        let summary = score_csv_file(&input, &output, &fixed(0.05)).unwrap();
        assert_eq!(summary.scored, 1);
        assert!(std::fs::read_to_string(&output).unwrap().contains("strong retention indicators"));
    }

    #[test]
    fn test_bundled_sample_data() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let model = crate::model::load_model(root.join("models/churn_model.json")).unwrap();
        let predictor = Predictor::from_loaded(std::sync::Arc::new(model));

        let input = std::fs::File::open(root.join("data/sample_customers.csv")).unwrap();
        let summary = score_csv(input, std::io::sink(), &predictor).unwrap();

        assert_eq!(summary.total, 10);
        assert_eq!(summary.failed, 0);
        assert!(summary.predicted_churn > 0);
        assert!(summary.predicted_churn < summary.total);
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = score_csv_file(dir.path().join("nope.csv"), dir.path().join("out.csv"), &fixed(0.5));
        assert!(result.is_err());
    }
}
