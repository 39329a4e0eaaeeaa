//! The mutable scratch aggregate built during a profile import, prior to
//! conversion into the canonical `Resume` shape.

use crate::extract::normalize::map_proficiency;
use crate::models::{Education, Experience, Language, Personal, Resume, SkillCategory};

/// Partially-populated profile data recovered from one extraction attempt.
/// Every field is absent-by-default; strategies fill it through
/// [`ExtractedProfile::merge_missing`] so the first writer of a field wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedProfile {
    pub first_name: String,
    pub last_name: String,
    pub headline: String,
    pub location: String,
    pub summary: String,
    pub experience: Vec<ExtractedExperience>,
    pub education: Vec<ExtractedEducation>,
    pub skills: Vec<String>,
    pub languages: Vec<ExtractedLanguage>,
    pub certifications: Vec<ExtractedCertification>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedExperience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEducation {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedLanguage {
    pub name: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedCertification {
    pub name: String,
    pub organization: String,
    pub issue_date: String,
}

impl ExtractedProfile {
    /// Folds a later strategy's partial result into this one.
    /// Scalar fields are taken only if currently empty; list fields are taken
    /// only if the list is currently empty. Later strategies never override.
    pub fn merge_missing(&mut self, other: ExtractedProfile) {
        merge_scalar(&mut self.first_name, other.first_name);
        merge_scalar(&mut self.last_name, other.last_name);
        merge_scalar(&mut self.headline, other.headline);
        merge_scalar(&mut self.location, other.location);
        merge_scalar(&mut self.summary, other.summary);
        merge_list(&mut self.experience, other.experience);
        merge_list(&mut self.education, other.education);
        merge_list(&mut self.skills, other.skills);
        merge_list(&mut self.languages, other.languages);
        merge_list(&mut self.certifications, other.certifications);
    }

    pub fn has_name(&self) -> bool {
        !self.first_name.is_empty() || !self.last_name.is_empty()
    }

    /// Converts into the canonical resume shape. Contact fields the source
    /// never exposes are filled with placeholders for the user to complete.
    pub fn into_resume(self, source_url: &str) -> Resume {
        let mut resume = Resume {
            personal: Personal {
                first_name: self.first_name,
                last_name: self.last_name,
                title: self.headline,
                email: "your.email@example.com".into(),
                phone: "+33 6 00 00 00 00".into(),
                location: self.location,
                linkedin: format_profile_link(source_url),
                ..Default::default()
            },
            summary: self.summary,
            ..Default::default()
        };

        for exp in self.experience {
            resume.experience.push(Experience {
                company: exp.company,
                position: exp.title,
                location: exp.location,
                start_date: exp.start_date,
                end_date: exp.end_date,
                description: exp.description,
                highlights: Vec::new(),
            });
        }

        for edu in self.education {
            resume.education.push(Education {
                institution: edu.school,
                degree: edu.degree,
                field: edu.field,
                start_date: edu.start_date,
                end_date: edu.end_date,
                ..Default::default()
            });
        }

        if !self.skills.is_empty() {
            resume.skills.push(SkillCategory {
                category: "Skills".into(),
                items: self.skills,
            });
        }

        for lang in self.languages {
            resume.languages.push(Language {
                name: lang.name,
                level: map_proficiency(&lang.proficiency),
            });
        }

        for cert in self.certifications {
            resume.certifications.push(crate::models::Certification {
                name: cert.name,
                issuer: cert.organization,
                date: cert.issue_date,
            });
        }

        resume
    }
}

fn merge_scalar(dst: &mut String, src: String) {
    if dst.is_empty() && !src.is_empty() {
        *dst = src;
    }
}

fn merge_list<T>(dst: &mut Vec<T>, src: Vec<T>) {
    if dst.is_empty() && !src.is_empty() {
        *dst = src;
    }
}

/// Strips scheme and www prefix so the link reads cleanly on the resume.
fn format_profile_link(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_missing_first_writer_wins() {
        let mut acc = ExtractedProfile {
            first_name: "Ada".into(),
            ..Default::default()
        };
        acc.merge_missing(ExtractedProfile {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            ..Default::default()
        });
        assert_eq!(acc.first_name, "Ada");
        assert_eq!(acc.last_name, "Hopper");
    }

    #[test]
    fn test_merge_missing_list_taken_only_when_empty() {
        let mut acc = ExtractedProfile {
            skills: vec!["Rust".into()],
            ..Default::default()
        };
        acc.merge_missing(ExtractedProfile {
            skills: vec!["Go".into(), "Python".into()],
            languages: vec![ExtractedLanguage {
                name: "French".into(),
                proficiency: "Native or bilingual".into(),
            }],
            ..Default::default()
        });
        assert_eq!(acc.skills, vec!["Rust".to_string()]);
        assert_eq!(acc.languages.len(), 1);
    }

    #[test]
    fn test_into_resume_maps_languages_and_skills() {
        let profile = ExtractedProfile {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            headline: "Engineer".into(),
            skills: vec!["Rust".into(), "Go".into()],
            languages: vec![ExtractedLanguage {
                name: "English".into(),
                proficiency: "Native or bilingual proficiency".into(),
            }],
            ..Default::default()
        };
        let resume = profile.into_resume("https://www.linkedin.com/in/ada/");
        assert_eq!(resume.personal.full_name(), "Ada Lovelace");
        assert_eq!(resume.personal.linkedin, "linkedin.com/in/ada");
        assert_eq!(resume.skills.len(), 1);
        assert_eq!(resume.skills[0].items.len(), 2);
        assert_eq!(resume.languages[0].level, "Native");
        assert!(resume.projects.is_empty());
    }

    #[test]
    fn test_into_resume_keeps_placeholder_contacts() {
        let resume = ExtractedProfile::default().into_resume("linkedin.com/in/x");
        assert_eq!(resume.personal.email, "your.email@example.com");
        assert!(!resume.personal.phone.is_empty());
    }
}
