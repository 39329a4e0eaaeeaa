//! Profile extraction pipeline.
//!
//! Given a profile identifier (raw URL or bare handle) and an optional session
//! cookie, recovers as much profile data as the source exposes. The page's
//! markup is undocumented and unstable, so extraction is an ordered cascade of
//! independent strategies merged under first-writer-wins semantics: the
//! authenticated structured API when a cookie is supplied, then JSON-LD blocks,
//! page-header meta tags, and a visible-content scan over the public HTML.
//! The pipeline never fails solely because some fields are unrecoverable.

pub mod api;
pub mod html;
pub mod normalize;
pub mod profile;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extract::normalize::capitalize_first;
use crate::extract::profile::ExtractedProfile;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Normalizes a profile reference into a bare handle.
///
/// Accepts either a bare handle or a profile URL (scheme optional, trailing
/// slash tolerated). In a URL the handle is the segment following `/in/`;
/// a single-segment path is treated as the handle directly.
pub fn normalize_handle(input: &str) -> Result<String, AppError> {
    let input = input.trim();

    if !input.contains("linkedin.com") {
        return Ok(input.trim_matches('/').to_string());
    }

    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);
    let path = rest.split_once('/').map(|(_, p)| p).unwrap_or("");
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    for (i, part) in parts.iter().enumerate() {
        if *part == "in" && i + 1 < parts.len() {
            return Ok(parts[i + 1].to_string());
        }
    }

    if parts.len() == 1 {
        return Ok(parts[0].to_string());
    }

    Err(AppError::InvalidIdentifier(input.to_string()))
}

/// Fetches and extracts a remote profile.
pub struct ProfileFetcher {
    client: Client,
}

impl ProfileFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(AppError::Http)?;
        Ok(Self { client })
    }

    /// Runs the full fetch cascade for `handle`.
    ///
    /// With a session cookie the structured API is tried first; its failures
    /// are non-fatal and fall through to the public page. A non-success status
    /// on the public page is fatal to the whole import.
    pub async fn fetch(
        &self,
        handle: &str,
        session_cookie: Option<&str>,
    ) -> Result<ExtractedProfile, AppError> {
        if let Some(cookie) = session_cookie {
            match api::fetch_via_api(&self.client, handle, cookie).await {
                Ok(profile) if profile.has_name() => {
                    info!("profile recovered via authenticated API");
                    return Ok(profile);
                }
                Ok(_) => debug!("authenticated API returned no usable profile"),
                Err(e) => warn!("authenticated fetch failed, falling back to public page: {e}"),
            }
        }

        let body = self.fetch_public_page(handle, session_cookie).await?;
        Ok(extract_from_html(&body, handle, session_cookie.is_some()))
    }

    async fn fetch_public_page(
        &self,
        handle: &str,
        session_cookie: Option<&str>,
    ) -> Result<String, AppError> {
        let url = format!("https://www.linkedin.com/in/{handle}/");

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5");

        if let Some(cookie) = session_cookie {
            request = request.header(reqwest::header::COOKIE, format!("li_at={cookie}"));
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::FetchFailed {
                status: status.as_u16(),
            });
        }

        Ok(resp.text().await?)
    }
}

/// Runs the ordered strategy cascade over one HTML body and folds the partial
/// results. If no strategy recovered a name, one is synthesized from the
/// handle so the import always yields something addressable.
pub fn extract_from_html(html: &str, handle: &str, authenticated: bool) -> ExtractedProfile {
    let mut profile = ExtractedProfile::default();

    if authenticated {
        profile.merge_missing(html::extract_embedded_payloads(html));
    }
    profile.merge_missing(html::extract_json_ld(html));
    profile.merge_missing(html::extract_meta_tags(html));
    profile.merge_missing(html::extract_visible_content(html));

    if !profile.has_name() {
        let parts: Vec<&str> = handle.split('-').filter(|s| !s.is_empty()).collect();
        if parts.len() >= 2 {
            profile.first_name = capitalize_first(parts[0]);
            profile.last_name = capitalize_first(parts[1]);
        } else {
            profile.first_name = capitalize_first(handle);
        }
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_handle_bare() {
        assert_eq!(normalize_handle("johndoe").unwrap(), "johndoe");
    }

    #[test]
    fn test_normalize_handle_full_url() {
        assert_eq!(
            normalize_handle("https://www.linkedin.com/in/johndoe/").unwrap(),
            "johndoe"
        );
    }

    #[test]
    fn test_normalize_handle_missing_scheme() {
        assert_eq!(normalize_handle("linkedin.com/in/johndoe").unwrap(), "johndoe");
    }

    #[test]
    fn test_normalize_handle_single_segment_path() {
        assert_eq!(normalize_handle("linkedin.com/johndoe").unwrap(), "johndoe");
    }

    #[test]
    fn test_normalize_handle_rejects_unrecognized_path() {
        let err = normalize_handle("https://linkedin.com/pub/dir/john").unwrap_err();
        assert!(matches!(err, AppError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_name_synthesis_from_hyphenated_handle() {
        let profile = extract_from_html("<html></html>", "john-doe-123", false);
        assert_eq!(profile.first_name, "John");
        assert_eq!(profile.last_name, "Doe");
    }

    #[test]
    fn test_name_synthesis_single_segment() {
        let profile = extract_from_html("<html></html>", "johndoe", false);
        assert_eq!(profile.first_name, "Johndoe");
        assert_eq!(profile.last_name, "");
    }

    #[test]
    fn test_cascade_meta_does_not_override_json_ld() {
        let html = r#"
        <script type="application/ld+json">{"@type":"Person","name":"Ada Lovelace"}</script>
        <meta property="og:title" content="Other Name - Programmer | LinkedIn"/>
        "#;
        let profile = extract_from_html(html, "ada", false);
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name, "Lovelace");
        // Unset fields are still filled by the later strategy.
        assert_eq!(profile.headline, "Programmer");
    }

    #[test]
    fn test_cascade_idempotent() {
        let html = r#"
        <script type="application/ld+json">{"@type":"Person","name":"Ada Lovelace",
          "worksFor":[{"name":"Acme","member":{"startDate":2020}}]}</script>
        <meta property="og:description" content="Summary text"/>
        "#;
        let a = extract_from_html(html, "ada", false);
        let b = extract_from_html(html, "ada", false);
        assert_eq!(a, b);
        assert_eq!(a.experience.len(), 1);
    }
}
