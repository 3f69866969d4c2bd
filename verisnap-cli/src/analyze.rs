//! `verisnap analyze`: one Upload/Preview session driven from the terminal

use chrono::Utc;
use std::path::{Path, PathBuf};
use url::Url;
use verisnap_core::{AnalysisReport, AnalysisResult, AnalysisSession, ImageFile};

use crate::client::AnalysisClient;
use crate::error::{CliError, CliResult};

/// Where to write the downloaded report, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportTarget {
    None,
    File(PathBuf),
    /// Directory; the file gets the time-derived report name
    Directory(PathBuf),
}

impl ReportTarget {
    pub fn from_args(report: Option<PathBuf>, report_dir: Option<PathBuf>) -> Self {
        match (report, report_dir) {
            (Some(path), _) => Self::File(path),
            (None, Some(dir)) => Self::Directory(dir),
            (None, None) => Self::None,
        }
    }

    fn resolve(&self, report: &AnalysisReport) -> Option<PathBuf> {
        match self {
            Self::None => None,
            Self::File(path) => Some(path.clone()),
            Self::Directory(dir) => Some(dir.join(report.file_name())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub file: PathBuf,
    pub server: Url,
    pub demo: bool,
    pub report: ReportTarget,
    pub json: bool,
}

pub async fn run_analyze(options: AnalyzeOptions) -> CliResult<()> {
    let image = load_image(&options.file).await?;

    let mut session = AnalysisSession::new();
    session.set_demo_mode(options.demo);
    let mime_type = image.mime_type.clone();
    if !session.select_image(image) {
        return Err(CliError::NotAnImage {
            path: options.file.display().to_string(),
            mime_type,
        });
    }

    let client = AnalysisClient::new(options.server.clone());
    let request = session.begin_analysis()?;
    let outcome = client.analyze(&request).await.map_err(|e| e.to_string());
    session.complete_analysis(outcome);

    if let Some(message) = session.error() {
        return Err(CliError::AnalysisFailed(message.to_string()));
    }

    if let Some(result) = session.result() {
        if options.json {
            println!("{}", serde_json::to_string_pretty(result)?);
        } else {
            print!("{}", render_result(result));
        }
    }

    if let Some(report) = session.download_report(Utc::now()) {
        if let Some(path) = options.report.resolve(&report) {
            write_report(&report, &path).await?;
            eprintln!("Report written to {}", path.display());
        }
    }

    Ok(())
}

async fn load_image(path: &Path) -> CliResult<ImageFile> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(ImageFile::new(name, guess_mime_type(path), bytes))
}

async fn write_report(report: &AnalysisReport, path: &Path) -> CliResult<()> {
    let json = report.to_json_pretty()?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// MIME type from the file extension, the way a browser file picker declares it.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Prediction:         {}\n", result.prediction));
    out.push_str(&format!("Confidence:         {}%\n", result.confidence));
    out.push_str(&format!(
        "Authenticity score: {}/100\n",
        result.details.authenticity_score
    ));
    out.push_str(&format!("Reasoning:          {}\n", result.reasoning));
    if !result.details.visual_cues.is_empty() {
        out.push_str("Visual cues:\n");
        for cue in &result.details.visual_cues {
            out.push_str(&format!("  - {cue}\n"));
        }
    }
    if !result.details.risk_factors.is_empty() {
        out.push_str("Risk factors:\n");
        for risk in &result.details.risk_factors {
            out.push_str(&format!("  - {risk}\n"));
        }
    }
    out
}
