// Reporting and output for mailswap
// Exports detected email-change requests as CSV or Markdown

use crate::detection::Detection;
use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Escape CSV field to prevent formula injection attacks
/// Cells starting with =, +, -, @, or tab are prefixed with single quote
fn escape_csv_field(field: &str) -> String {
    let needs_escaping = matches!(field.chars().next(), Some('=' | '+' | '-' | '@' | '\t'));

    if needs_escaping {
        format!("\"'{}\"", field.replace('"', "\"\""))
    } else if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn report_name(dir: &Path, ext: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("mailswap_report_{}.{}", timestamp, ext))
        .to_string_lossy()
        .into_owned()
}

pub fn export_csv(detections: &[Detection], dir: &Path) -> Result<String, std::io::Error> {
    let filename = report_name(dir, "csv");
    let mut file = File::create(&filename)?;

    writeln!(file, "Method,URL,Parameters,Comment")?;
    for d in detections {
        writeln!(
            file,
            "{},{},{},{}",
            escape_csv_field(&d.method.to_string()),
            escape_csv_field(&d.url),
            escape_csv_field(&d.result.matched_params.join(" ")),
            escape_csv_field(&d.annotation.comment)
        )?;
    }

    Ok(filename)
}

pub fn export_markdown(detections: &[Detection], dir: &Path) -> Result<String, std::io::Error> {
    let filename = report_name(dir, "md");
    let mut file = File::create(&filename)?;

    writeln!(file, "# Email Change Requests\n")?;
    if detections.is_empty() {
        writeln!(file, "_No email-change requests detected._")?;
    }
    for d in detections {
        writeln!(file, "- **{}** {}: {}", d.method, d.url, d.annotation.comment)?;
    }

    Ok(filename)
}
