//! Canonical resume data model, loaded from and saved to YAML.

use serde::{Deserialize, Serialize};

/// The complete structure of a resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resume {
    pub personal: Personal,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<SkillCategory>,
    pub languages: Vec<Language>,
    pub certifications: Vec<Certification>,
    pub projects: Vec<Project>,
    pub interests: Vec<String>,
}

/// Personal and contact information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Personal {
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
    pub photo: String,
    pub photo_grayscale: bool,
    pub photo_shape: PhotoShape,
}

/// Rendering shape for the optional photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoShape {
    #[default]
    Round,
    Square,
}

/// A work experience entry. Dates are opaque display strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub highlights: Vec<String>,
}

/// An education entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

/// A labeled group of skills. Uniqueness is not enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillCategory {
    pub category: String,
    pub items: Vec<String>,
}

/// A spoken language with a proficiency label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

/// A personal project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub url: String,
    pub technologies: Vec<String>,
}

impl Personal {
    /// Full name recomputed on demand; never stored redundantly.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Formats a date for display. The literal "present" (or French "présent",
/// any letter case) is an open-ended sentinel and renders as a localized token.
pub fn format_date(date: &str) -> String {
    let lower = date.to_lowercase();
    if lower == "present" || lower == "présent" {
        "Présent".to_string()
    } else {
        date.to_string()
    }
}

impl Resume {
    /// A filled-in starter template, used when `init` runs without a profile
    /// import or when the import fails entirely.
    pub fn starter() -> Self {
        Resume {
            personal: Personal {
                first_name: "John".into(),
                last_name: "Doe".into(),
                title: "Your Professional Title".into(),
                email: "your.email@example.com".into(),
                phone: "+1 000 000 0000".into(),
                location: "City, Country".into(),
                linkedin: "linkedin.com/in/yourprofile".into(),
                github: "github.com/yourusername".into(),
                website: "yourwebsite.com".into(),
                photo: String::new(),
                photo_grayscale: false,
                photo_shape: PhotoShape::Round,
            },
            summary: "Write a brief professional summary highlighting your key skills, \
                      experience, and career objectives. This section should give employers \
                      a quick overview of who you are and what you bring to the table."
                .into(),
            experience: vec![
                Experience {
                    company: "Company Name".into(),
                    position: "Senior Position".into(),
                    location: "City, Country".into(),
                    start_date: "2022-01".into(),
                    end_date: "present".into(),
                    description: "Brief description of your role and main responsibilities \
                                  in this position."
                        .into(),
                    highlights: vec![
                        "Key achievement or responsibility 1".into(),
                        "Key achievement or responsibility 2".into(),
                        "Key achievement or responsibility 3".into(),
                    ],
                },
                Experience {
                    company: "Previous Company".into(),
                    position: "Position Title".into(),
                    location: "City, Country".into(),
                    start_date: "2019-06".into(),
                    end_date: "2021-12".into(),
                    description: "Brief description of your role and main responsibilities \
                                  in this position."
                        .into(),
                    highlights: vec![
                        "Key achievement or responsibility 1".into(),
                        "Key achievement or responsibility 2".into(),
                    ],
                },
            ],
            education: vec![Education {
                institution: "University Name".into(),
                degree: "Master's Degree".into(),
                field: "Field of Study".into(),
                location: "City, Country".into(),
                start_date: "2015".into(),
                end_date: "2019".into(),
                description: "Relevant coursework, honors, or achievements".into(),
            }],
            skills: vec![
                SkillCategory {
                    category: "Programming Languages".into(),
                    items: vec!["Language 1".into(), "Language 2".into(), "Language 3".into()],
                },
                SkillCategory {
                    category: "Frameworks & Tools".into(),
                    items: vec!["Framework 1".into(), "Framework 2".into(), "Tool 1".into()],
                },
                SkillCategory {
                    category: "Soft Skills".into(),
                    items: vec![
                        "Communication".into(),
                        "Leadership".into(),
                        "Problem Solving".into(),
                    ],
                },
            ],
            languages: vec![
                Language {
                    name: "English".into(),
                    level: "Native".into(),
                },
                Language {
                    name: "French".into(),
                    level: "Fluent (C1)".into(),
                },
            ],
            certifications: vec![Certification {
                name: "Certification Name".into(),
                issuer: "Issuing Organization".into(),
                date: "2023".into(),
            }],
            projects: vec![Project {
                name: "Project Name".into(),
                description: "Brief description of the project and your role".into(),
                url: "github.com/username/project".into(),
                technologies: vec!["Tech 1".into(), "Tech 2".into(), "Tech 3".into()],
            }],
            interests: vec!["Interest 1".into(), "Interest 2".into(), "Interest 3".into()],
        }
    }
}
