//! PDF conversion via external binaries, tried strictly in sequence.

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, bail, Result};
use tracing::debug;

use crate::errors::AppError;

/// Converts a rendered HTML document to PDF. The converters are tried in a
/// fixed preference order; the first to succeed wins.
pub fn convert(html_path: &Path, pdf_path: &Path) -> Result<(), AppError> {
    if let Some(parent) = pdf_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let converters: &[(&str, fn(&Path, &Path) -> Result<()>)] = &[
        ("wkhtmltopdf", convert_with_wkhtmltopdf),
        ("chromium", convert_with_chromium),
        ("weasyprint", convert_with_weasyprint),
    ];

    let mut last_error = anyhow!("no converter attempted");
    for (name, converter) in converters {
        match converter(html_path, pdf_path) {
            Ok(()) => {
                debug!(converter = name, "PDF generated");
                return Ok(());
            }
            Err(e) => {
                debug!(converter = name, "converter failed: {e:#}");
                last_error = e;
            }
        }
    }

    Err(AppError::NoConverterAvailable {
        last_error: format!("{last_error:#}"),
    })
}

fn convert_with_wkhtmltopdf(html_path: &Path, pdf_path: &Path) -> Result<()> {
    let output = Command::new("wkhtmltopdf")
        .arg("--enable-local-file-access")
        .args(["--page-size", "A4"])
        .args(["--margin-top", "0"])
        .args(["--margin-right", "0"])
        .args(["--margin-bottom", "0"])
        .args(["--margin-left", "0"])
        .args(["--encoding", "UTF-8"])
        .arg(html_path)
        .arg(pdf_path)
        .output()?;

    if !output.status.success() {
        bail!(
            "wkhtmltopdf: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

fn convert_with_chromium(html_path: &Path, pdf_path: &Path) -> Result<()> {
    let mut candidates = vec![
        "chromium",
        "chromium-browser",
        "google-chrome",
        "google-chrome-stable",
    ];
    if cfg!(target_os = "macos") {
        candidates.push("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        candidates.push("/Applications/Chromium.app/Contents/MacOS/Chromium");
    }

    let html_abs = html_path.canonicalize()?;
    let pdf_abs = std::path::absolute(pdf_path)?;

    let mut last_error = anyhow!("chrome/chromium not found");
    for candidate in candidates {
        let result = Command::new(candidate)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg(format!("--print-to-pdf={}", pdf_abs.display()))
            .arg("--print-to-pdf-no-header")
            .arg(format!("file://{}", html_abs.display()))
            .output();

        match result {
            Ok(output) if output.status.success() => return Ok(()),
            Ok(output) => {
                last_error = anyhow!(
                    "{candidate}: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => last_error = anyhow!("{candidate}: {e}"),
        }
    }

    Err(last_error)
}

fn convert_with_weasyprint(html_path: &Path, pdf_path: &Path) -> Result<()> {
    let output = Command::new("weasyprint")
        .arg(html_path)
        .arg(pdf_path)
        .output()?;

    if !output.status.success() {
        bail!(
            "weasyprint: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
