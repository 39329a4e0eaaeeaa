//! Project importer: fetches a user's public repositories, ranks them by
//! popularity and maps the best into resume project entries.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::Project;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("cvforge/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github.v3+json";

const PAGE_SIZE: u32 = 100;
/// Safety cap on pagination; nobody's top-five lives past page ten.
const MAX_PAGES: u32 = 10;
const DEFAULT_COUNT: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Basic public account summary, used to backfill contact fields.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
}

/// Strips a full URL down to the bare account handle; bare input passes through.
pub fn normalize_github_handle(input: &str) -> String {
    let input = input.trim().trim_end_matches('/');
    if let Some((_, after)) = input.split_once("github.com/") {
        after.split('/').next().unwrap_or(after).to_string()
    } else {
        input.to_string()
    }
}

/// Fetches up to `count` projects for `handle`, ranked by stars descending.
/// A non-positive count falls back to the default of 5.
pub async fn fetch_top_projects(
    client: &Client,
    handle: &str,
    count: isize,
) -> Result<Vec<Project>, AppError> {
    let count = if count <= 0 {
        DEFAULT_COUNT
    } else {
        count as usize
    };

    let repos = fetch_user_repos(client, handle).await?;
    debug!(total = repos.len(), "repositories fetched");

    Ok(rank_repositories(repos, count)
        .into_iter()
        .map(to_project)
        .collect())
}

/// Drops forks and archived repositories, ranks the rest by stars descending
/// and keeps the top `count`.
fn rank_repositories(repos: Vec<Repository>, count: usize) -> Vec<Repository> {
    let mut own: Vec<Repository> = repos
        .into_iter()
        .filter(|r| !r.fork && !r.archived)
        .collect();

    // Stable sort keeps encountered order among equal-star repos.
    own.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    own.truncate(count);
    own
}

/// Fetches the public account summary for `handle`.
pub async fn fetch_user(client: &Client, handle: &str) -> Result<User, AppError> {
    let url = format!("{API_BASE}/users/{handle}");
    let resp = client
        .get(&url)
        .header(reqwest::header::ACCEPT, ACCEPT)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?;

    match resp.status() {
        StatusCode::NOT_FOUND => Err(AppError::UserNotFound(handle.to_string())),
        status if !status.is_success() => Err(AppError::FetchFailed {
            status: status.as_u16(),
        }),
        _ => Ok(resp.json().await?),
    }
}

async fn fetch_user_repos(client: &Client, handle: &str) -> Result<Vec<Repository>, AppError> {
    let mut all = Vec::new();

    for page in 1..=MAX_PAGES {
        let url = format!(
            "{API_BASE}/users/{handle}/repos?per_page={PAGE_SIZE}&page={page}&sort=pushed"
        );
        let resp = client
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::UserNotFound(handle.to_string()));
        }
        if !status.is_success() {
            return Err(AppError::FetchFailed {
                status: status.as_u16(),
            });
        }

        let page_repos: Vec<Repository> = resp.json().await?;
        let page_len = page_repos.len();
        all.extend(page_repos);

        if page_len < PAGE_SIZE as usize {
            break;
        }
    }

    Ok(all)
}

/// Maps a repository to a project entry. Technology tags combine the primary
/// language with topic tags, de-duplicated case-insensitively while keeping
/// first-seen casing.
fn to_project(repo: Repository) -> Project {
    let mut technologies: Vec<String> = Vec::new();

    if let Some(language) = repo.language {
        if !language.is_empty() {
            technologies.push(language);
        }
    }
    for topic in repo.topics {
        if !technologies
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&topic))
        {
            technologies.push(topic);
        }
    }

    Project {
        name: repo.name,
        description: repo.description.unwrap_or_default(),
        url: repo.html_url,
        technologies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, stars: u32, fork: bool, archived: bool) -> Repository {
        Repository {
            name: name.into(),
            description: Some(format!("{name} description")),
            html_url: format!("https://github.com/u/{name}"),
            stargazers_count: stars,
            language: Some("Rust".into()),
            topics: vec![],
            fork,
            archived,
        }
    }

    fn ranked_names(repos: Vec<Repository>, count: usize) -> Vec<String> {
        rank_repositories(repos, count)
            .into_iter()
            .map(|r| r.name)
            .collect()
    }

    #[test]
    fn test_ranking_drops_forks_and_archived() {
        let repos = vec![
            repo("A", 10, true, false),
            repo("B", 50, false, false),
            repo("C", 5, false, true),
            repo("D", 30, false, false),
        ];
        assert_eq!(ranked_names(repos, 2), vec!["B".to_string(), "D".to_string()]);
    }

    #[test]
    fn test_ranking_ties_keep_encountered_order() {
        let repos = vec![
            repo("first", 10, false, false),
            repo("second", 10, false, false),
        ];
        assert_eq!(
            ranked_names(repos, 2),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_to_project_tags_deduplicated_case_insensitively() {
        let r = Repository {
            name: "proj".into(),
            description: None,
            html_url: "https://github.com/u/proj".into(),
            stargazers_count: 1,
            language: Some("Rust".into()),
            topics: vec!["rust".into(), "cli".into(), "CLI".into()],
            fork: false,
            archived: false,
        };
        let p = to_project(r);
        // "rust" duplicates the language tag; first-seen casing is preserved.
        assert_eq!(p.technologies, vec!["Rust".to_string(), "cli".to_string()]);
        assert_eq!(p.description, "");
    }

    #[test]
    fn test_normalize_github_handle() {
        assert_eq!(normalize_github_handle("octocat"), "octocat");
        assert_eq!(normalize_github_handle("https://github.com/octocat/"), "octocat");
        assert_eq!(
            normalize_github_handle("github.com/octocat/some-repo"),
            "octocat"
        );
    }

    #[test]
    fn test_repository_deserializes_api_shape() {
        let json = r#"{
            "name": "cvforge",
            "full_name": "u/cvforge",
            "description": null,
            "html_url": "https://github.com/u/cvforge",
            "stargazers_count": 12,
            "language": "Rust",
            "topics": ["resume", "cli"],
            "fork": false,
            "archived": false
        }"#;
        let r: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(r.name, "cvforge");
        assert_eq!(r.description, None);
        assert_eq!(r.topics.len(), 2);
    }

    #[test]
    fn test_user_deserializes_api_shape() {
        let json = r#"{"login": "octocat", "location": "San Francisco", "blog": ""}"#;
        let u: User = serde_json::from_str(json).unwrap();
        assert_eq!(u.login, "octocat");
        assert_eq!(u.location.as_deref(), Some("San Francisco"));
        assert_eq!(u.blog.as_deref(), Some(""));
    }
}
