//! Public-page extraction strategies.
//!
//! The page's data layout is inconsistent across rendering paths, so each
//! strategy here is a pure function from the raw HTML to a partial
//! [`ExtractedProfile`]. The caller folds the partials together with
//! first-writer-wins semantics; no strategy ever looks at another's output.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::extract::api;
use crate::extract::normalize::{decode_html_entities, decode_unicode_escapes};
use crate::extract::profile::{
    ExtractedEducation, ExtractedExperience, ExtractedLanguage, ExtractedProfile,
};

/// Placeholder the source site substitutes for fields hidden from
/// unauthenticated viewers. Values carrying it are never real content.
pub const MASKING_MARKER: &str = "***";

/// Extracts from embedded JSON-LD blocks. Handles both the `@graph` list
/// shape and the single-record shape; only person-like records (or records
/// with no type discriminator) are processed.
pub fn extract_json_ld(html: &str) -> ExtractedProfile {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?s)<script[^>]*type="application/ld\+json"[^>]*>(.*?)</script>"#).unwrap()
    });

    let mut profile = ExtractedProfile::default();

    for caps in re.captures_iter(html) {
        let Ok(data) = serde_json::from_str::<Value>(&caps[1]) else {
            continue;
        };

        if let Some(graph) = data.get("@graph").and_then(Value::as_array) {
            for record in graph {
                profile.merge_missing(extract_person_record(record));
            }
        } else {
            profile.merge_missing(extract_person_record(&data));
        }
    }

    profile
}

fn extract_person_record(record: &Value) -> ExtractedProfile {
    let mut profile = ExtractedProfile::default();

    // Only person-shaped records; an absent discriminator is tolerated.
    let schema_type = record.get("@type").and_then(Value::as_str).unwrap_or("");
    if !schema_type.is_empty() && schema_type != "Person" {
        return profile;
    }

    if let Some(name) = record.get("name").and_then(Value::as_str) {
        match name.split_once(' ') {
            Some((first, last)) => {
                profile.first_name = first.to_string();
                profile.last_name = last.to_string();
            }
            None => profile.first_name = name.to_string(),
        }
    }

    if let Some(description) = record.get("description").and_then(Value::as_str) {
        profile.summary = normalize_line_breaks(description);
    }

    if let Some(locality) = record
        .pointer("/address/addressLocality")
        .and_then(Value::as_str)
    {
        profile.location = locality.to_string();
    }

    if let Some(works_for) = record.get("worksFor").and_then(Value::as_array) {
        let mut seen = std::collections::HashSet::new();
        for work in works_for {
            if let Some(exp) = extract_affiliation(work) {
                if seen.insert((exp.company.clone(), exp.description.clone())) {
                    profile.experience.push(exp);
                }
            }
        }
    }

    if let Some(alumni_of) = record.get("alumniOf").and_then(Value::as_array) {
        let mut seen = std::collections::HashSet::new();
        for school in alumni_of {
            if let Some(edu) = extract_school_affiliation(school) {
                if seen.insert((edu.school.clone(), edu.degree.clone())) {
                    profile.education.push(edu);
                }
            }
        }
    }

    if let Some(languages) = record.get("knowsLanguage").and_then(Value::as_array) {
        for lang in languages {
            if let Some(name) = lang.get("name").and_then(Value::as_str) {
                if !name.is_empty() {
                    profile.languages.push(ExtractedLanguage {
                        name: name.to_string(),
                        ..Default::default()
                    });
                }
            }
        }
    }

    if let Some(skills) = record.get("knowsAbout").and_then(Value::as_array) {
        for skill in skills {
            if let Some(s) = skill.as_str() {
                if !s.is_empty() {
                    profile.skills.push(s.to_string());
                }
            }
        }
    }

    // jobTitle is a scalar or a list; the first non-masked entry wins.
    match record.get("jobTitle") {
        Some(Value::Array(titles)) => {
            for title in titles {
                if let Some(t) = title.as_str() {
                    if !t.contains(MASKING_MARKER) {
                        profile.headline = t.to_string();
                        break;
                    }
                }
            }
        }
        Some(Value::String(title)) if !title.contains(MASKING_MARKER) => {
            profile.headline = title.clone();
        }
        _ => {}
    }

    profile
}

/// A prior work affiliation. A masked organization name is treated as
/// inaccessible: the record's other fields still populate, but the name
/// stays empty. Records with nothing recoverable are dropped.
fn extract_affiliation(work: &Value) -> Option<ExtractedExperience> {
    let mut exp = ExtractedExperience::default();

    if let Some(name) = work.get("name").and_then(Value::as_str) {
        if !name.contains(MASKING_MARKER) {
            exp.company = name.to_string();
        }
    }
    if let Some(location) = work.get("location").and_then(Value::as_str) {
        exp.location = location.to_string();
    }
    if let Some(member) = work.get("member") {
        if let Some(desc) = member.get("description").and_then(Value::as_str) {
            if !desc.contains(MASKING_MARKER) {
                exp.description = desc.to_string();
            }
        }
        if let Some(start) = member.get("startDate") {
            exp.start_date = display_value(start);
        }
        if let Some(end) = member.get("endDate") {
            exp.end_date = display_value(end);
        }
    }

    if exp.company.is_empty() && exp.description.is_empty() {
        None
    } else {
        Some(exp)
    }
}

fn extract_school_affiliation(school: &Value) -> Option<ExtractedEducation> {
    let mut edu = ExtractedEducation::default();

    if let Some(name) = school.get("name").and_then(Value::as_str) {
        if !name.contains(MASKING_MARKER) {
            edu.school = name.to_string();
        }
    }
    if let Some(member) = school.get("member") {
        if let Some(desc) = member.get("description").and_then(Value::as_str) {
            if !desc.contains(MASKING_MARKER) {
                edu.degree = desc.to_string();
            }
        }
        if let Some(start) = member.get("startDate") {
            edu.start_date = display_value(start);
        }
        if let Some(end) = member.get("endDate") {
            edu.end_date = display_value(end);
        }
    }

    if edu.school.is_empty() && edu.degree.is_empty() {
        None
    } else {
        Some(edu)
    }
}

/// Extracts from the page-header metadata tags: og:title carries
/// "FirstName LastName - Title | SiteName", og:description the summary,
/// geo.placename the location.
pub fn extract_meta_tags(html: &str) -> ExtractedProfile {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    static DESC: OnceLock<Regex> = OnceLock::new();
    static GEO: OnceLock<Regex> = OnceLock::new();

    let title_re = TITLE.get_or_init(|| {
        Regex::new(r#"<meta[^>]*property="og:title"[^>]*content="([^"]*)""#).unwrap()
    });
    let desc_re = DESC.get_or_init(|| {
        Regex::new(r#"<meta[^>]*property="og:description"[^>]*content="([^"]*)""#).unwrap()
    });
    let geo_re = GEO.get_or_init(|| {
        Regex::new(r#"<meta[^>]*name="geo\.placename"[^>]*content="([^"]*)""#).unwrap()
    });

    let mut profile = ExtractedProfile::default();

    if let Some(caps) = title_re.captures(html) {
        let title = &caps[1];
        if let Some(idx) = title.find(" - ") {
            let name_part = &title[..idx];
            match name_part.split_once(' ') {
                Some((first, last)) => {
                    profile.first_name = first.to_string();
                    profile.last_name = last.to_string();
                }
                None => profile.first_name = name_part.to_string(),
            }

            let rest = &title[idx + 3..];
            if let Some(pipe_idx) = rest.find(" | ") {
                profile.headline = rest[..pipe_idx].trim().to_string();
            }
        }
    }

    if let Some(caps) = desc_re.captures(html) {
        profile.summary = decode_html_entities(&caps[1]);
    }

    if let Some(caps) = geo_re.captures(html) {
        profile.location = caps[1].to_string();
    }

    profile
}

/// Last-resort scan of the visible page content. Only recovers a location
/// string, and rejects values that look like an email address.
pub fn extract_visible_content(html: &str) -> ExtractedProfile {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r#"class="top-card-subline-item[^"]*"[^>]*>([^<]+)</span>"#).unwrap(),
            Regex::new(r#"class="profile-info-subheader[^"]*"[^>]*>([^<]+)</span>"#).unwrap(),
        ]
    });

    let mut profile = ExtractedProfile::default();

    for re in patterns {
        if let Some(caps) = re.captures(html) {
            let location = caps[1].trim();
            if !location.is_empty() && !location.contains('@') {
                profile.location = location.to_string();
                break;
            }
        }
    }

    profile
}

/// Authenticated pages embed the same structured payloads the API serves,
/// inside HTML-commented `<code>` blocks. Both the block form and a bare
/// `"included": [...]` script form are scanned; entries feed the same
/// type-tagged dispatch as the API path.
pub fn extract_embedded_payloads(html: &str) -> ExtractedProfile {
    static CODE: OnceLock<Regex> = OnceLock::new();
    static BARE: OnceLock<Regex> = OnceLock::new();

    let code_re = CODE.get_or_init(|| {
        Regex::new(r#"(?s)<code[^>]*id="bpr-guid-\d+"[^>]*><!--(.+?)--></code>"#).unwrap()
    });
    let bare_re =
        BARE.get_or_init(|| Regex::new(r#"(?s)"included":\s*\[(.*?)\],"meta""#).unwrap());

    let mut profile = ExtractedProfile::default();

    for caps in code_re.captures_iter(html) {
        let json_data = decode_html_entities(&caps[1]);
        let Ok(data) = serde_json::from_str::<Value>(&json_data) else {
            continue;
        };
        if let Some(included) = data.get("included").and_then(Value::as_array) {
            for entry in included {
                api::extract_entry(entry, &mut profile);
            }
        }
    }

    for caps in bare_re.captures_iter(html) {
        let wrapped = format!("[{}]", &caps[1]);
        let Ok(included) = serde_json::from_str::<Vec<Value>>(&wrapped) else {
            continue;
        };
        for entry in &included {
            api::extract_entry(entry, &mut profile);
        }
    }

    profile
}

// Escaped payloads carry line breaks as <br>; decode first so a
// single replacement covers both forms.
fn normalize_line_breaks(s: &str) -> String {
    decode_unicode_escapes(s).replace("<br>", "\n")
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_LD_FIXTURE: &str = r#"
    <html><head>
    <script type="application/ld+json">
    {
      "@graph": [
        {
          "@type": "Person",
          "name": "Ada Lovelace",
          "description": "First programmer.<br>Wrote notes on the Analytical Engine.",
          "address": {"@type": "PostalAddress", "addressLocality": "London"},
          "jobTitle": ["***", "Analytical Engine Programmer"],
          "worksFor": [
            {"name": "Analytical Engines Ltd", "member": {"startDate": 1842, "endDate": 1843}},
            {"name": "Masked ***", "member": {"description": "Consulting work"}}
          ],
          "alumniOf": [
            {"name": "University of London", "member": {"description": "Mathematics"}}
          ],
          "knowsLanguage": [{"name": "English"}, {"name": "French"}],
          "knowsAbout": ["Mathematics", "Poetry"]
        },
        {"@type": "Organization", "name": "Should Be Ignored"}
      ]
    }
    </script>
    </head></html>
    "#;

    const META_FIXTURE: &str = r#"
    <html><head>
    <meta property="og:title" content="Grace Hopper - Rear Admiral | LinkedIn"/>
    <meta property="og:description" content="COBOL &amp; compilers"/>
    <meta name="geo.placename" content="Arlington"/>
    </head></html>
    "#;

    #[test]
    fn test_json_ld_person_fields() {
        let profile = extract_json_ld(JSON_LD_FIXTURE);
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name, "Lovelace");
        assert_eq!(profile.location, "London");
        assert!(profile.summary.contains("First programmer.\nWrote notes"));
        assert_eq!(profile.headline, "Analytical Engine Programmer");
        assert_eq!(profile.languages.len(), 2);
        assert_eq!(profile.skills, vec!["Mathematics".to_string(), "Poetry".to_string()]);
    }

    #[test]
    fn test_json_ld_masked_company_keeps_other_fields() {
        let profile = extract_json_ld(JSON_LD_FIXTURE);
        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.experience[0].company, "Analytical Engines Ltd");
        assert_eq!(profile.experience[0].start_date, "1842");
        // Masked name never copied; the record's description still populates.
        assert_eq!(profile.experience[1].company, "");
        assert_eq!(profile.experience[1].description, "Consulting work");
    }

    #[test]
    fn test_json_ld_idempotent() {
        let a = extract_json_ld(JSON_LD_FIXTURE);
        let b = extract_json_ld(JSON_LD_FIXTURE);
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_ld_single_record_shape() {
        let html = r#"<script type="application/ld+json">
            {"@type": "Person", "name": "Solo Record"}
        </script>"#;
        let profile = extract_json_ld(html);
        assert_eq!(profile.first_name, "Solo");
        assert_eq!(profile.last_name, "Record");
    }

    #[test]
    fn test_meta_tags_name_title_and_location() {
        let profile = extract_meta_tags(META_FIXTURE);
        assert_eq!(profile.first_name, "Grace");
        assert_eq!(profile.last_name, "Hopper");
        assert_eq!(profile.headline, "Rear Admiral");
        assert_eq!(profile.summary, "COBOL & compilers");
        assert_eq!(profile.location, "Arlington");
    }

    #[test]
    fn test_visible_content_location_rejects_email() {
        let html = r#"<span class="top-card-subline-item">ada@example.com</span>
                      <span class="profile-info-subheader">London, UK</span>"#;
        let profile = extract_visible_content(html);
        assert_eq!(profile.location, "London, UK");
    }

    #[test]
    fn test_visible_content_no_match() {
        let profile = extract_visible_content("<html><body>nothing here</body></html>");
        assert_eq!(profile.location, "");
    }

    #[test]
    fn test_embedded_payload_code_block() {
        let html = r#"<code id="bpr-guid-123"><!--{"included":[
            {"$type":"com.linkedin.voyager.dash.identity.profile.Profile",
             "firstName":"Ada","lastName":"Lovelace","headline":"Programmer"}
        ]}--></code>"#;
        let profile = extract_embedded_payloads(html);
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.headline, "Programmer");
    }
}
