//! Pretty-printed JSON backtest report.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::FxlabError;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_REPORT_FILE: &str = "backtest_results.json";

pub struct JsonReportAdapter;

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), FxlabError> {
        let json = serde_json::to_string_pretty(result)?;
        fs::write(output_path, json)?;
        Ok(())
    }
}
