//! Authenticated extraction path.
//!
//! With a session cookie the profile's structured API becomes reachable: the
//! profile page is fetched first to harvest the short-lived anti-forgery token,
//! then the API endpoint returns a normalized payload whose `included` list
//! mixes profile, position, education, skill, language and certification
//! records. Entries are dispatched by a case-insensitive substring match on
//! their type discriminator; anything unrecognized is ignored.

use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use crate::errors::AppError;
use crate::extract::profile::{
    ExtractedCertification, ExtractedEducation, ExtractedExperience, ExtractedLanguage,
    ExtractedProfile,
};
use crate::extract::BROWSER_USER_AGENT;

const API_ACCEPT: &str = "application/vnd.linkedin.normalized+json+2.1";

// The endpoint rejects requests that don't look like the web client, so the
// client-tracking headers are sent with fixed plausible values.
const API_TRACK: &str = r#"{"clientVersion":"1.13.8677","mpVersion":"1.13.8677","osName":"web","timezoneOffset":1,"timezone":"Europe/Paris","deviceFormFactor":"DESKTOP","mpName":"voyager-web","displayDensity":1,"displayWidth":1920,"displayHeight":1080}"#;

/// Classification of one entry in the structured payload.
/// Discriminator values are compound, namespaced strings, so matching is by
/// substring rather than equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Profile,
    Position,
    Education,
    Skill,
    Language,
    Certification,
    Unknown,
}

pub fn classify(entry: &Value) -> EntryKind {
    let type_field = str_field(entry, "$type").to_lowercase();
    let urn = str_field(entry, "entityUrn").to_lowercase();

    // "profile" also appears in namespaced discriminators of position,
    // education, skill, language and certification records; those must not be
    // misclassified as the root profile record.
    let sub_record_markers = ["position", "education", "skill", "language", "certification"];
    if type_field.contains("profile")
        && !sub_record_markers.iter().any(|m| type_field.contains(m))
    {
        EntryKind::Profile
    } else if type_field.contains("position")
        || urn.contains("profileposition")
        || urn.contains("fs_position")
    {
        EntryKind::Position
    } else if type_field.contains("education")
        || urn.contains("profileeducation")
        || urn.contains("fs_education")
    {
        EntryKind::Education
    } else if type_field.contains("skill") || urn.contains("fs_skill") {
        EntryKind::Skill
    } else if type_field.contains("language") || urn.contains("fs_language") {
        EntryKind::Language
    } else if type_field.contains("certification") || urn.contains("fs_certification") {
        EntryKind::Certification
    } else {
        EntryKind::Unknown
    }
}

/// Fetches the structured profile payload for `handle` using the supplied
/// session cookie. A missing anti-forgery token or a non-success API status is
/// a failure of this strategy only; the caller falls back to the public page.
pub async fn fetch_via_api(
    client: &Client,
    handle: &str,
    session_cookie: &str,
) -> Result<ExtractedProfile, AppError> {
    let page_url = format!("https://www.linkedin.com/in/{handle}/");
    let resp = client
        .get(&page_url)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .header(reqwest::header::COOKIE, format!("li_at={session_cookie}"))
        .send()
        .await?;

    let mut token = resp
        .cookies()
        .find(|c| c.name() == "JSESSIONID")
        .map(|c| c.value().trim_matches('"').to_string());

    let body = resp.text().await.unwrap_or_default();

    // The token is usually a response cookie; failing that, scan the page body.
    if token.is_none() {
        static QUOTED: OnceLock<Regex> = OnceLock::new();
        let re = QUOTED.get_or_init(|| Regex::new(r#""JSESSIONID":"([^"]+)""#).unwrap());
        token = re
            .captures(&body)
            .map(|c| c[1].trim_matches('"').to_string());
    }
    if token.is_none() {
        static AJAX: OnceLock<Regex> = OnceLock::new();
        let re = AJAX.get_or_init(|| Regex::new(r"JSESSIONID=([^;]+)").unwrap());
        token = re
            .captures(&body)
            .map(|c| c[1].trim_matches('"').to_string());
    }
    let token = token.ok_or(AppError::AuthTokenMissing)?;
    debug!("anti-forgery token harvested");

    let api_url = format!(
        "https://www.linkedin.com/voyager/api/identity/dash/profiles\
         ?q=memberIdentity&memberIdentity={handle}\
         &decorationId=com.linkedin.voyager.dash.deco.identity.profile.FullProfileWithEntities-93"
    );

    let resp = client
        .get(&api_url)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .header(reqwest::header::ACCEPT, API_ACCEPT)
        .header(
            reqwest::header::COOKIE,
            format!("li_at={session_cookie}; JSESSIONID=\"{token}\""),
        )
        .header("csrf-token", &token)
        .header("x-li-lang", "fr_FR")
        .header("x-restli-protocol-version", "2.0.0")
        .header("x-li-track", API_TRACK)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::FetchFailed {
            status: status.as_u16(),
        });
    }

    let payload: Value = resp.json().await?;
    Ok(extract_payload(&payload))
}

/// Folds every recognizable entry of a structured payload into one profile.
pub fn extract_payload(payload: &Value) -> ExtractedProfile {
    let mut profile = ExtractedProfile::default();

    if let Some(included) = payload.get("included").and_then(Value::as_array) {
        debug!(count = included.len(), "structured payload entries");
        for entry in included {
            extract_entry(entry, &mut profile);
        }
    }

    // Some responses carry the root record under data.elements instead.
    if let Some(first) = payload
        .pointer("/data/elements")
        .and_then(Value::as_array)
        .and_then(|e| e.first())
    {
        extract_entry(first, &mut profile);
    }

    profile
}

/// Dispatches one payload entry to its type-tagged extractor.
pub fn extract_entry(entry: &Value, profile: &mut ExtractedProfile) {
    match classify(entry) {
        EntryKind::Profile => extract_profile_record(entry, profile),
        EntryKind::Position => {
            if let Some(exp) = extract_position(entry) {
                profile.experience.push(exp);
            }
        }
        EntryKind::Education => {
            if let Some(edu) = extract_education(entry) {
                profile.education.push(edu);
            }
        }
        EntryKind::Skill => {
            let name = str_field(entry, "name");
            if !name.is_empty() {
                profile.skills.push(name.to_string());
            }
        }
        EntryKind::Language => {
            let name = str_field(entry, "name");
            if !name.is_empty() {
                profile.languages.push(ExtractedLanguage {
                    name: name.to_string(),
                    proficiency: str_field(entry, "proficiency").to_string(),
                });
            }
        }
        EntryKind::Certification => {
            let name = str_field(entry, "name");
            if !name.is_empty() {
                profile.certifications.push(ExtractedCertification {
                    name: name.to_string(),
                    organization: str_field(entry, "authority").to_string(),
                    issue_date: entry
                        .pointer("/timePeriod/startDate")
                        .map(format_year_month)
                        .unwrap_or_default(),
                });
            }
        }
        EntryKind::Unknown => {}
    }
}

fn extract_profile_record(entry: &Value, profile: &mut ExtractedProfile) {
    set_if_present(&mut profile.first_name, str_field(entry, "firstName"));
    set_if_present(&mut profile.last_name, str_field(entry, "lastName"));
    set_if_present(&mut profile.headline, str_field(entry, "headline"));
    set_if_present(&mut profile.summary, str_field(entry, "summary"));
    set_if_present(&mut profile.location, str_field(entry, "locationName"));
    if profile.location.is_empty() {
        set_if_present(&mut profile.location, str_field(entry, "geoLocationName"));
    }
    if profile.location.is_empty() {
        if let Some(name) = entry
            .pointer("/geoLocation/geoLocationName")
            .and_then(Value::as_str)
        {
            set_if_present(&mut profile.location, name);
        }
    }
}

fn extract_position(entry: &Value) -> Option<ExtractedExperience> {
    let mut exp = ExtractedExperience {
        title: str_field(entry, "title").to_string(),
        company: name_field(entry, "companyName"),
        location: str_field(entry, "locationName").to_string(),
        description: str_field(entry, "description").to_string(),
        ..Default::default()
    };

    if exp.company.is_empty() {
        if let Some(name) = entry.pointer("/company/name").and_then(Value::as_str) {
            exp.company = name.to_string();
        }
    }

    let (start, end) = extract_date_range(entry);
    exp.start_date = start;
    exp.end_date = end;

    if exp.company.is_empty() && exp.title.is_empty() {
        None
    } else {
        Some(exp)
    }
}

fn extract_education(entry: &Value) -> Option<ExtractedEducation> {
    let mut edu = ExtractedEducation {
        school: name_field(entry, "schoolName"),
        degree: str_field(entry, "degreeName").to_string(),
        field: str_field(entry, "fieldOfStudy").to_string(),
        description: str_field(entry, "description").to_string(),
        ..Default::default()
    };

    if edu.school.is_empty() {
        if let Some(name) = entry.pointer("/school/name").and_then(Value::as_str) {
            edu.school = name.to_string();
        }
    }

    let (start, end) = extract_date_range(entry);
    edu.start_date = start;
    edu.end_date = end;

    if edu.school.is_empty() {
        None
    } else {
        Some(edu)
    }
}

/// Reads a date pair from either the `dateRange` or `timePeriod` shape.
fn extract_date_range(entry: &Value) -> (String, String) {
    let mut start = String::new();
    let mut end = String::new();

    for (range_key, start_key, end_key) in [
        ("dateRange", "start", "end"),
        ("timePeriod", "startDate", "endDate"),
    ] {
        if let Some(range) = entry.get(range_key) {
            if let Some(s) = range.get(start_key) {
                start = format_year_month(s);
            }
            if let Some(e) = range.get(end_key) {
                end = format_year_month(e);
            }
        }
    }

    (start, end)
}

/// Renders a `{year, month}` object as "MM/YYYY", "YYYY", or "".
fn format_year_month(date: &Value) -> String {
    let year = date.get("year").and_then(Value::as_i64).unwrap_or(0);
    let month = date.get("month").and_then(Value::as_i64).unwrap_or(0);

    if year > 0 {
        if month > 0 {
            format!("{month:02}/{year}")
        } else {
            format!("{year}")
        }
    } else {
        String::new()
    }
}

/// Reads a name that may be a plain string or a `{ "text": ... }` wrapper.
/// A non-empty top-level string is preferred over the nested form.
fn name_field(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Object(obj)) => obj
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn str_field<'a>(entry: &'a Value, key: &str) -> &'a str {
    entry.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn set_if_present(dst: &mut String, src: &str) {
    if !src.is_empty() {
        *dst = src.to_string();
    }
}
