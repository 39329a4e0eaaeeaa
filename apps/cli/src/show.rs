//! Terminal preview: renders the resume as Markdown and pipes it through
//! `glow` when installed, falling back to plain output.

use std::fmt::Write as _;
use std::io::Write as _;
use std::process::Command;

use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{format_date, Resume};

const GLOW_STYLES: &[&str] = &["auto", "dark", "light", "dracula", "tokyo-night", "notty"];

/// Options for the terminal preview.
pub struct ShowOptions {
    pub style: String,
    pub pager: bool,
    pub inline: bool,
}

/// Displays the resume in the terminal. Uses `glow` unless `inline` is set or
/// glow is unavailable; any glow failure falls back to plain Markdown.
pub fn show(resume: &Resume, opts: &ShowOptions) -> Result<(), AppError> {
    let markdown = generate_markdown(resume);

    if !opts.inline && glow_available() {
        debug!("rendering with glow");
        match render_with_glow(&markdown, opts) {
            Ok(()) => return Ok(()),
            Err(e) => warn!("glow failed, falling back to plain output: {e}"),
        }
    }

    print!("{markdown}");
    Ok(())
}

fn glow_available() -> bool {
    Command::new("glow")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

fn render_with_glow(markdown: &str, opts: &ShowOptions) -> Result<(), AppError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("cv-")
        .suffix(".md")
        .tempfile()?;
    tmp.write_all(markdown.as_bytes())?;
    tmp.flush()?;

    let mut cmd = Command::new("glow");
    if opts.pager {
        cmd.arg("--pager");
    }
    cmd.args(["--style", map_style(&opts.style)]);
    cmd.arg(tmp.path());

    let status = cmd.status()?;
    if !status.success() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "glow exited with {status}"
        )));
    }
    Ok(())
}

/// Unknown styles fall back to "auto" rather than erroring.
fn map_style(style: &str) -> &str {
    if GLOW_STYLES.contains(&style) {
        style
    } else {
        "auto"
    }
}

/// Builds the Markdown rendition of the resume, skipping empty sections.
pub fn generate_markdown(resume: &Resume) -> String {
    let mut out = String::with_capacity(4 * 1024);
    let p = &resume.personal;

    let _ = writeln!(out, "# {}\n", p.full_name());
    if !p.title.is_empty() {
        let _ = writeln!(out, "### {}\n", p.title);
    }
    out.push_str("---\n\n");

    let contacts: Vec<&str> = [
        p.email.as_str(),
        p.phone.as_str(),
        p.location.as_str(),
        p.linkedin.as_str(),
        p.github.as_str(),
        p.website.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();
    if !contacts.is_empty() {
        let _ = writeln!(out, "{}\n", contacts.join(" | "));
    }

    if !resume.summary.is_empty() {
        out.push_str("## Summary\n\n");
        let _ = writeln!(out, "{}\n", resume.summary.trim());
    }

    if !resume.experience.is_empty() {
        out.push_str("## Professional Experience\n\n");
        for exp in &resume.experience {
            let _ = writeln!(out, "### {} - *{}*", exp.position, exp.company);
            let _ = writeln!(
                out,
                "{} - {} | {}\n",
                format_date(&exp.start_date),
                format_date(&exp.end_date),
                exp.location
            );
            if !exp.description.is_empty() {
                let _ = writeln!(out, "{}\n", exp.description.trim());
            }
            if !exp.highlights.is_empty() {
                for highlight in &exp.highlights {
                    let _ = writeln!(out, "- {highlight}");
                }
                out.push('\n');
            }
        }
    }

    if !resume.education.is_empty() {
        out.push_str("## Education\n\n");
        for edu in &resume.education {
            let _ = writeln!(out, "### {} - {}", edu.degree, edu.field);
            let _ = writeln!(
                out,
                "{} | {} - {}\n",
                edu.institution,
                format_date(&edu.start_date),
                format_date(&edu.end_date)
            );
            if !edu.description.is_empty() {
                let _ = writeln!(out, "{}\n", edu.description.trim());
            }
        }
    }

    if !resume.skills.is_empty() {
        out.push_str("## Skills\n\n");
        for category in &resume.skills {
            let _ = writeln!(
                out,
                "**{}:** {}\n",
                category.category,
                category.items.join(" | ")
            );
        }
    }

    if !resume.languages.is_empty() {
        out.push_str("## Languages\n\n");
        for lang in &resume.languages {
            let _ = writeln!(out, "- **{}:** {}", lang.name, lang.level);
        }
        out.push('\n');
    }

    if !resume.certifications.is_empty() {
        out.push_str("## Certifications\n\n");
        for cert in &resume.certifications {
            let _ = writeln!(out, "- **{}** - {} ({})", cert.name, cert.issuer, cert.date);
        }
        out.push('\n');
    }

    if !resume.projects.is_empty() {
        out.push_str("## Projects\n\n");
        for project in &resume.projects {
            let _ = writeln!(out, "### {}", project.name);
            let _ = writeln!(out, "{}\n", project.description);
            if !project.technologies.is_empty() {
                let _ = writeln!(
                    out,
                    "*Technologies:* {}\n",
                    project.technologies.join(", ")
                );
            }
        }
    }

    if !resume.interests.is_empty() {
        out.push_str("## Interests\n\n");
        let _ = writeln!(out, "{}", resume.interests.join(" | "));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Experience, Language, Personal, SkillCategory};

    fn sample_resume() -> Resume {
        Resume {
            personal: Personal {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                title: "Programmer".into(),
                email: "ada@example.com".into(),
                location: "London".into(),
                ..Default::default()
            },
            summary: "First programmer.\n".into(),
            experience: vec![Experience {
                company: "Analytical Engines".into(),
                position: "Engineer".into(),
                start_date: "1842".into(),
                end_date: "present".into(),
                location: "London".into(),
                highlights: vec!["Wrote the notes".into()],
                ..Default::default()
            }],
            skills: vec![SkillCategory {
                category: "Mathematics".into(),
                items: vec!["Analysis".into(), "Number theory".into()],
            }],
            languages: vec![Language {
                name: "English".into(),
                level: "Native".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_markdown_header_and_contacts() {
        let md = generate_markdown(&sample_resume());
        assert!(md.starts_with("# Ada Lovelace\n"));
        assert!(md.contains("ada@example.com | London"));
    }

    #[test]
    fn test_markdown_sections() {
        let md = generate_markdown(&sample_resume());
        assert!(md.contains("## Professional Experience"));
        assert!(md.contains("### Engineer - *Analytical Engines*"));
        assert!(md.contains("1842 - Présent | London"));
        assert!(md.contains("- Wrote the notes"));
        assert!(md.contains("**Mathematics:** Analysis | Number theory"));
        assert!(md.contains("- **English:** Native"));
    }

    #[test]
    fn test_markdown_skips_empty_sections() {
        let md = generate_markdown(&sample_resume());
        assert!(!md.contains("## Projects"));
        assert!(!md.contains("## Certifications"));
        assert!(!md.contains("## Interests"));
    }

    #[test]
    fn test_map_style_falls_back_to_auto() {
        assert_eq!(map_style("dracula"), "dracula");
        assert_eq!(map_style("neon"), "auto");
    }
}
