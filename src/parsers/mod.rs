pub mod capture;
pub mod har;
pub mod params;

pub use capture::CaptureFileParser;
pub use har::HarParser;
pub use params::{body_parameters, cookie_parameters, extract_parameters, query_parameters};

use crate::error::Result;
use crate::models::{CaptureParser, CapturedRequest};
use std::path::Path;
use walkdir::WalkDir;

/// Pick a parser by file extension: `.har` is an HTTP Archive, anything else a capture file
pub fn parser_for(path: &Path) -> Box<dyn CaptureParser> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("har") => Box::new(HarParser),
        _ => Box::new(CaptureFileParser),
    }
}

/// Load captures from a file, or from every `.json`/`.jsonl`/`.har` file
/// under a directory (in path order)
pub fn load_captures(input: &str) -> Result<Vec<CapturedRequest>> {
    let root = Path::new(input);
    if !root.is_dir() {
        return parser_for(root).parse(input);
    }

    let mut files: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| matches!(ext.to_ascii_lowercase().as_str(), "json" | "jsonl" | "har"))
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();

    let mut captures = Vec::new();
    for file in files {
        let path = file.to_string_lossy();
        log::debug!("loading captures from {}", path);
        captures.extend(parser_for(&file).parse(&path)?);
    }
    Ok(captures)
}
