//! Render pipeline: resume model -> themed HTML -> optional PDF.

pub mod html;
pub mod pdf;
pub mod themes;

use std::path::Path;

use crate::errors::AppError;
use crate::models::Resume;
use crate::render::themes::{get_theme, theme_css_with_color, validate_hex_color, DEFAULT_THEME};

/// Loads a resume from a YAML file.
pub fn load_resume(path: &Path) -> Result<Resume, AppError> {
    if !path.exists() {
        return Err(AppError::FileNotFound(path.display().to_string()));
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&data)?)
}

/// Handles one resume's generation with a validated theme and color.
#[derive(Debug)]
pub struct Generator {
    resume: Resume,
    theme: String,
    custom_color: String,
}

impl Generator {
    /// Loads the resume and validates theme and color up front, so generation
    /// fails before any output is produced.
    pub fn from_file(data_path: &Path, theme: &str, custom_color: &str) -> Result<Self, AppError> {
        let resume = load_resume(data_path)?;

        let theme = if theme.is_empty() {
            DEFAULT_THEME
        } else {
            theme
        };
        get_theme(theme)?;

        if !validate_hex_color(custom_color) {
            return Err(AppError::InvalidColor(custom_color.to_string()));
        }

        Ok(Self {
            resume,
            theme: theme.to_string(),
            custom_color: custom_color.to_string(),
        })
    }

    pub fn resume(&self) -> &Resume {
        &self.resume
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Renders the HTML document to `output_path`.
    pub fn generate_html(&self, output_path: &Path) -> Result<(), AppError> {
        let css = theme_css_with_color(&self.theme, &self.custom_color)?;
        let document = html::render_document(&self.resume, &css);

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_path, document)?;
        Ok(())
    }

    /// Converts the rendered HTML to PDF via the external converter chain.
    pub fn generate_pdf(&self, html_path: &Path, pdf_path: &Path) -> Result<(), AppError> {
        pdf::convert(html_path, pdf_path)
    }
}
