// src/sheet/export.rs
// =============================================================================
// This module writes finished check results to a CSV report.
//
// Columns: url, status, code, time, timestamp
// - `time` is rendered as "<n>ms"
// - opaque results always render the restricted-success marker in `code`,
//   never any internal value
// =============================================================================

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::checker::CheckResult;

// Writes the report to a file
pub fn write_report(path: &Path, results: &[CheckResult]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_report_to(file, results)
}

// Writes the report to any writer (split out so tests can render to memory)
pub fn write_report_to<W: Write>(writer: W, results: &[CheckResult]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["url", "status", "code", "time", "timestamp"])?;

    for result in results {
        let status = result.status.to_string();
        let time = format!("{}ms", result.elapsed_ms);
        csv_writer.write_record([
            result.url.as_str(),
            status.as_str(),
            result.display_code(),
            time.as_str(),
            result.timestamp.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{CheckStatus, RESTRICTED_SUCCESS_CODE};

    fn sample(url: &str, status: CheckStatus, code: &str, is_opaque: bool) -> CheckResult {
        CheckResult {
            url: url.to_string(),
            status,
            code: code.to_string(),
            elapsed_ms: 123,
            timestamp: "14:30:00".to_string(),
            is_opaque,
        }
    }

    fn render(results: &[CheckResult]) -> String {
        let mut buffer = Vec::new();
        write_report_to(&mut buffer, results).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_report_has_header_and_rows() {
        let output = render(&[
            sample("https://acme.com", CheckStatus::Online, "200", false),
            sample("https://globex.com", CheckStatus::Offline, "404", false),
        ]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "url,status,code,time,timestamp");
        assert_eq!(lines[1], "https://acme.com,Online,200,123ms,14:30:00");
        assert_eq!(lines[2], "https://globex.com,Offline,404,123ms,14:30:00");
    }

    #[test]
    fn test_opaque_rows_render_restricted_marker() {
        // Even if the stored code were something else, the export shows the
        // restricted marker for opaque results
        let output = render(&[sample(
            "https://walled.example",
            CheckStatus::Online,
            "raw-internal-value",
            true,
        )]);

        assert!(output.contains(RESTRICTED_SUCCESS_CODE));
        assert!(!output.contains("raw-internal-value"));
    }
}
