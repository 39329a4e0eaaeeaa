//! Renders the resume data model into a standalone HTML document with the
//! selected theme's stylesheet inlined.

use crate::models::{format_date, PhotoShape, Resume};

/// Builds the complete HTML document for `resume` with `css` inlined.
pub fn render_document(resume: &Resume, css: &str) -> String {
    let mut out = String::with_capacity(16 * 1024);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!(
        "<title>{}</title>\n",
        escape(&resume.personal.full_name())
    ));
    out.push_str("<style>\n");
    out.push_str(css);
    out.push_str("\n</style>\n</head>\n<body>\n");

    render_header(resume, &mut out);
    render_summary(resume, &mut out);
    render_experience(resume, &mut out);
    render_education(resume, &mut out);
    render_skills(resume, &mut out);
    render_languages(resume, &mut out);
    render_certifications(resume, &mut out);
    render_projects(resume, &mut out);
    render_interests(resume, &mut out);

    out.push_str("</body>\n</html>\n");
    out
}

fn render_header(resume: &Resume, out: &mut String) {
    let p = &resume.personal;
    out.push_str("<header class=\"cv-header\">\n");

    if !p.photo.is_empty() {
        let shape = match p.photo_shape {
            PhotoShape::Round => "round",
            PhotoShape::Square => "square",
        };
        let grayscale = if p.photo_grayscale { " grayscale" } else { "" };
        out.push_str(&format!(
            "<img class=\"photo {shape}{grayscale}\" src=\"{}\" alt=\"photo\">\n",
            escape(&p.photo)
        ));
    }

    out.push_str("<div>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&p.full_name())));
    if !p.title.is_empty() {
        out.push_str(&format!(
            "<div class=\"headline\">{}</div>\n",
            escape(&p.title)
        ));
    }

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
        out.push_str("<div class=\"contact\">");
        for contact in contacts {
            out.push_str(&format!("<span>{}</span>", escape(contact)));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n</header>\n");
}

fn render_summary(resume: &Resume, out: &mut String) {
    if resume.summary.is_empty() {
        return;
    }
    out.push_str("<section>\n<h2>Summary</h2>\n");
    out.push_str(&format!("<p>{}</p>\n", escape_multiline(&resume.summary)));
    out.push_str("</section>\n");
}

fn render_experience(resume: &Resume, out: &mut String) {
    if resume.experience.is_empty() {
        return;
    }
    out.push_str("<section>\n<h2>Professional Experience</h2>\n");
    for exp in &resume.experience {
        out.push_str("<div class=\"entry\">\n");
        out.push_str(&format!(
            "<div class=\"entry-title\">{} — {}</div>\n",
            escape(&exp.position),
            escape(&exp.company)
        ));
        out.push_str(&format!(
            "<div class=\"entry-meta\">{} - {}{}</div>\n",
            escape(&format_date(&exp.start_date)),
            escape(&format_date(&exp.end_date)),
            if exp.location.is_empty() {
                String::new()
            } else {
                format!(" | {}", escape(&exp.location))
            }
        ));
        if !exp.description.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", escape_multiline(&exp.description)));
        }
        if !exp.highlights.is_empty() {
            out.push_str("<ul>\n");
            for highlight in &exp.highlights {
                out.push_str(&format!("<li>{}</li>\n", escape(highlight)));
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</div>\n");
    }
    out.push_str("</section>\n");
}

fn render_education(resume: &Resume, out: &mut String) {
    if resume.education.is_empty() {
        return;
    }
    out.push_str("<section>\n<h2>Education</h2>\n");
    for edu in &resume.education {
        out.push_str("<div class=\"entry\">\n");
        let title = if edu.field.is_empty() {
            escape(&edu.degree)
        } else {
            format!("{} — {}", escape(&edu.degree), escape(&edu.field))
        };
        out.push_str(&format!("<div class=\"entry-title\">{title}</div>\n"));
        out.push_str(&format!(
            "<div class=\"entry-meta\">{} | {} - {}</div>\n",
            escape(&edu.institution),
            escape(&format_date(&edu.start_date)),
            escape(&format_date(&edu.end_date))
        ));
        if !edu.description.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", escape_multiline(&edu.description)));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</section>\n");
}

fn render_skills(resume: &Resume, out: &mut String) {
    if resume.skills.is_empty() {
        return;
    }
    out.push_str("<section>\n<h2>Skills</h2>\n");
    for category in &resume.skills {
        out.push_str(&format!(
            "<div class=\"skill-category\"><span class=\"label\">{}:</span> {}</div>\n",
            escape(&category.category),
            escape(&category.items.join(", "))
        ));
    }
    out.push_str("</section>\n");
}

fn render_languages(resume: &Resume, out: &mut String) {
    if resume.languages.is_empty() {
        return;
    }
    out.push_str("<section class=\"languages\">\n<h2>Languages</h2>\n<ul>\n");
    for lang in &resume.languages {
        out.push_str(&format!(
            "<li><strong>{}:</strong> {}</li>\n",
            escape(&lang.name),
            escape(&lang.level)
        ));
    }
    out.push_str("</ul>\n</section>\n");
}

fn render_certifications(resume: &Resume, out: &mut String) {
    if resume.certifications.is_empty() {
        return;
    }
    out.push_str("<section>\n<h2>Certifications</h2>\n<ul>\n");
    for cert in &resume.certifications {
        out.push_str(&format!(
            "<li><strong>{}</strong> — {} ({})</li>\n",
            escape(&cert.name),
            escape(&cert.issuer),
            escape(&cert.date)
        ));
    }
    out.push_str("</ul>\n</section>\n");
}

fn render_projects(resume: &Resume, out: &mut String) {
    if resume.projects.is_empty() {
        return;
    }
    out.push_str("<section>\n<h2>Projects</h2>\n");
    for project in &resume.projects {
        out.push_str("<div class=\"entry\">\n");
        if project.url.is_empty() {
            out.push_str(&format!(
                "<div class=\"entry-title\">{}</div>\n",
                escape(&project.name)
            ));
        } else {
            out.push_str(&format!(
                "<div class=\"entry-title\"><a href=\"{}\">{}</a></div>\n",
                escape(&project.url),
                escape(&project.name)
            ));
        }
        if !project.description.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", escape(&project.description)));
        }
        for tech in &project.technologies {
            out.push_str(&format!("<span class=\"tag\">{}</span>", escape(tech)));
        }
        if !project.technologies.is_empty() {
            out.push('\n');
        }
        out.push_str("</div>\n");
    }
    out.push_str("</section>\n");
}

fn render_interests(resume: &Resume, out: &mut String) {
    if resume.interests.is_empty() {
        return;
    }
    out.push_str("<section class=\"interests\">\n<h2>Interests</h2>\n");
    out.push_str(&format!(
        "<p>{}</p>\n",
        escape(&resume.interests.join(" · "))
    ));
    out.push_str("</section>\n");
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_multiline(s: &str) -> String {
    escape(s).replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Experience, Personal};

    fn sample_resume() -> Resume {
        Resume {
            personal: Personal {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                title: "Programmer <1st>".into(),
                email: "ada@example.com".into(),
                ..Default::default()
            },
            summary: "Line one.\nLine two.".into(),
            experience: vec![Experience {
                company: "Analytical Engines".into(),
                position: "Engineer".into(),
                start_date: "1842".into(),
                end_date: "present".into(),
                highlights: vec!["Wrote the notes".into()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_escapes_user_text() {
        let html = render_document(&sample_resume(), "");
        assert!(html.contains("Programmer &lt;1st&gt;"));
        assert!(!html.contains("<1st>"));
    }

    #[test]
    fn test_render_present_sentinel_localized() {
        let html = render_document(&sample_resume(), "");
        assert!(html.contains("1842 - Présent"));
        assert!(!html.contains("- present"));
    }

    #[test]
    fn test_render_summary_line_breaks() {
        let html = render_document(&sample_resume(), "");
        assert!(html.contains("Line one.<br>Line two."));
    }

    #[test]
    fn test_render_skips_empty_sections() {
        let html = render_document(&sample_resume(), "");
        assert!(!html.contains("<h2>Projects</h2>"));
        assert!(!html.contains("<h2>Languages</h2>"));
    }

    #[test]
    fn test_render_inlines_css() {
        let html = render_document(&sample_resume(), ":root { --primary-color: #123456; }");
        assert!(html.contains("--primary-color: #123456;"));
    }

    #[test]
    fn test_render_photo_modifiers() {
        let mut resume = sample_resume();
        resume.personal.photo = "me.jpg".into();
        resume.personal.photo_grayscale = true;
        let html = render_document(&resume, "");
        assert!(html.contains("class=\"photo round grayscale\""));
    }
}
