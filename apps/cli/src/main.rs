mod errors;
mod extract;
mod github;
mod models;
mod render;
mod serve;
mod show;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::models::Resume;
use crate::render::themes::{DEFAULT_THEME, THEMES};
use crate::render::Generator;
use crate::show::ShowOptions;

#[derive(Parser)]
#[command(
    name = "cvforge",
    version,
    about = "HTML and PDF resume generator from a YAML file"
)]
struct Cli {
    /// Path to the resume YAML file
    #[arg(short, long, global = true, default_value = "cv.yaml")]
    data: PathBuf,

    /// Output directory
    #[arg(short, long, global = true, default_value = "output")]
    output: PathBuf,

    /// Theme name (modern, classic, minimal, elegant, tech)
    #[arg(long, global = true, default_value = DEFAULT_THEME)]
    theme: String,

    /// Custom primary color for any theme (hex, e.g. #ff5733)
    #[arg(long, global = true, default_value = "")]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the resume in HTML and/or PDF
    Generate {
        /// Generate the HTML file only
        #[arg(long)]
        html: bool,
        /// Generate the PDF file only
        #[arg(long)]
        pdf: bool,
    },
    /// Display the resume in the terminal
    Show {
        /// Display style passed to glow (auto, dark, light, dracula, tokyo-night, notty)
        #[arg(short, long, default_value = "auto")]
        style: String,
        /// Force glow pager usage
        #[arg(short, long)]
        pager: bool,
        /// Force plain inline display without glow
        #[arg(long)]
        inline: bool,
    },
    /// Validate the resume YAML file
    Validate,
    /// List available themes
    Themes,
    /// Initialize a new resume YAML file
    Init {
        /// LinkedIn profile URL or username to import from
        #[arg(short, long)]
        linkedin: Option<String>,
        /// LinkedIn session cookie (li_at) for full data access
        #[arg(short, long)]
        cookie: Option<String>,
        /// GitHub username to fetch top projects from
        #[arg(short, long)]
        github: Option<String>,
        /// Number of top GitHub projects to fetch
        #[arg(short, long, default_value_t = 5)]
        projects: isize,
        /// Output file name
        #[arg(short, long, default_value = "cv.yaml")]
        file: PathBuf,
        /// Overwrite an existing file without confirmation
        #[arg(long)]
        force: bool,
    },
    /// Start a live preview server with auto reload
    Serve {
        /// Server port
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME")))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate { html, pdf } => run_generate(&cli, html, pdf)?,
        Commands::Show {
            ref style,
            pager,
            inline,
        } => run_show(&cli, style, pager, inline)?,
        Commands::Validate => run_validate(&cli)?,
        Commands::Themes => run_themes(),
        Commands::Init {
            ref linkedin,
            ref cookie,
            ref github,
            projects,
            ref file,
            force,
        } => {
            run_init(
                linkedin.as_deref(),
                cookie.as_deref(),
                github.as_deref(),
                projects,
                file,
                force,
            )
            .await?
        }
        Commands::Serve { port } => {
            serve::run(&cli.data, &cli.output, &cli.theme, &cli.color, port).await?
        }
    }

    Ok(())
}

fn run_generate(cli: &Cli, html_only: bool, pdf_only: bool) -> Result<()> {
    let generator = Generator::from_file(&cli.data, &cli.theme, &cli.color)?;

    let name = generator.resume().personal.full_name();
    if cli.color.is_empty() {
        info!(name = %name, theme = generator.theme(), "generating resume");
    } else {
        info!(
            name = %name,
            theme = generator.theme(),
            color = %cli.color,
            "generating resume"
        );
    }

    let html_path = cli.output.join("cv.html");
    let pdf_path = cli.output.join("cv.pdf");
    let both = !html_only && !pdf_only;

    if both || html_only || pdf_only {
        // The PDF converters consume the HTML file, so it is always rendered.
        generator.generate_html(&html_path)?;
        if both || html_only {
            info!(path = %html_path.display(), "HTML generated");
        }
    }

    if both || pdf_only {
        info!("generating PDF");
        if let Err(e) = generator.generate_pdf(&html_path, &pdf_path) {
            warn!("PDF generation failed: {e}");
            warn!("install one of: wkhtmltopdf, Chrome/Chromium, or `pip install weasyprint`");
            return Err(e.into());
        }
        info!(path = %pdf_path.display(), "PDF generated");
    }

    info!("generation completed");
    Ok(())
}

fn run_show(cli: &Cli, style: &str, pager: bool, inline: bool) -> Result<()> {
    let generator = Generator::from_file(&cli.data, &cli.theme, &cli.color)?;
    let opts = ShowOptions {
        style: style.to_string(),
        pager,
        inline,
    };
    show::show(generator.resume(), &opts)?;
    Ok(())
}

fn run_validate(cli: &Cli) -> Result<()> {
    info!(path = %cli.data.display(), "validating file");

    let generator = Generator::from_file(&cli.data, &cli.theme, &cli.color)?;
    let resume = generator.resume();

    info!("YAML file is valid");
    info!(
        name = %resume.personal.full_name(),
        title = %resume.personal.title,
        email = %resume.personal.email,
        experiences = resume.experience.len(),
        education = resume.education.len(),
        skills = resume.skills.len(),
        languages = resume.languages.len(),
        certifications = resume.certifications.len(),
        projects = resume.projects.len(),
        "resume summary"
    );
    Ok(())
}

fn run_themes() {
    println!("Available themes:");
    println!();
    for theme in THEMES {
        let marker = if theme.name == DEFAULT_THEME { "*" } else { " " };
        println!("  {marker} {:<10}  {}", theme.name, theme.description);
    }
    println!();
    println!("  * = default theme");
    println!();
    println!("Usage:");
    println!("  cvforge generate --theme <name>");
}

async fn run_init(
    linkedin: Option<&str>,
    cookie: Option<&str>,
    github_user: Option<&str>,
    project_count: isize,
    file: &Path,
    force: bool,
) -> Result<()> {
    if file.exists() && !force {
        anyhow::bail!(
            "file {} already exists, use --force to overwrite",
            file.display()
        );
    }

    let mut resume = match linkedin {
        Some(reference) => import_profile(reference, cookie).await,
        None => Resume::starter(),
    };

    if let Some(github_user) = github_user {
        import_projects(&mut resume, github_user, project_count).await;
    }

    write_resume_file(&resume, file)?;

    info!(path = %file.display(), "resume file created");
    info!("next steps:");
    println!("  1. Edit the file with your information: {}", file.display());
    println!("  2. Generate your resume: cvforge generate");
    println!("  3. Preview in browser: cvforge serve");
    Ok(())
}

/// Imports a remote profile; any failure degrades to the starter template.
async fn import_profile(reference: &str, cookie: Option<&str>) -> Resume {
    info!("fetching profile");

    let handle = match extract::normalize_handle(reference) {
        Ok(handle) => handle,
        Err(e) => {
            warn!("could not extract username, using input as-is: {e}");
            reference.to_string()
        }
    };
    info!(username = %handle, "looking up profile");

    let fetched = match extract::ProfileFetcher::new() {
        Ok(fetcher) => fetcher.fetch(&handle, cookie).await,
        Err(e) => Err(e),
    };

    match fetched {
        Ok(profile) => {
            info!(
                name = %format!("{} {}", profile.first_name, profile.last_name),
                "profile found"
            );
            if cookie.is_none() {
                warn!("public data access is limited, some information may be missing");
                println!();
                println!("  Note: most profile data is masked for non-authenticated visitors.");
                println!("        To get full data, pass --cookie <your li_at cookie>:");
                println!("        1. Log in to the site in your browser");
                println!("        2. Open DevTools (F12) > Application > Cookies");
                println!("        3. Copy the value of the 'li_at' cookie");
                println!();
            } else {
                info!("full profile data retrieved");
            }
            profile.into_resume(reference)
        }
        Err(e) => {
            warn!("could not fetch profile, creating template instead: {e}");
            Resume::starter()
        }
    }
}

/// Appends top projects to the resume; failures are logged and skipped.
async fn import_projects(resume: &mut Resume, github_user: &str, count: isize) {
    info!("fetching GitHub projects");

    let handle = github::normalize_github_handle(github_user);
    info!(username = %handle, "looking up GitHub profile");

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!("could not build HTTP client: {e}");
            return;
        }
    };

    match github::fetch_top_projects(&client, &handle, count).await {
        Ok(projects) => {
            info!(count = projects.len(), "GitHub projects fetched");
            resume.projects.extend(projects);

            let current = &resume.personal.github;
            if current.is_empty() || current == "github.com/yourusername" {
                resume.personal.github = format!("github.com/{handle}");
            }
        }
        Err(e) => warn!("could not fetch GitHub projects: {e}"),
    }

    // The account summary fills contact gaps the profile import left open.
    match github::fetch_user(&client, &handle).await {
        Ok(user) => {
            debug!(login = %user.login, "account summary fetched");
            if resume.personal.location.is_empty() {
                resume.personal.location = user.location.unwrap_or_default();
            }
            let blog = user.blog.unwrap_or_default();
            let website = &resume.personal.website;
            if !blog.is_empty() && (website.is_empty() || website == "yourwebsite.com") {
                resume.personal.website = blog;
            }
        }
        Err(e) => debug!("could not fetch GitHub account summary: {e}"),
    }
}

const FILE_HEADER: &str = "\
# Resume configuration file
# Generated by cvforge
#
# Edit this file with your personal information, then run:
#   cvforge generate          # Generate HTML and PDF
#   cvforge serve             # Preview in browser with live reload
#   cvforge themes            # List available themes

";

fn write_resume_file(resume: &Resume, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let yaml = serde_yaml::to_string(resume)?;
    let content = format!("{FILE_HEADER}{}", add_section_comments(&yaml));
    std::fs::write(path, content)?;
    Ok(())
}

/// Prefixes each top-level section with a short comment banner. Only the
/// first occurrence of each key is annotated.
fn add_section_comments(yaml: &str) -> String {
    const BANNERS: &[(&str, &str)] = &[
        ("personal:", "# Personal Information\npersonal:"),
        ("summary:", "\n# Professional Summary\nsummary:"),
        ("experience:", "\n# Work Experience\nexperience:"),
        ("education:", "\n# Education\neducation:"),
        ("skills:", "\n# Skills (grouped by category)\nskills:"),
        ("languages:", "\n# Languages\nlanguages:"),
        ("certifications:", "\n# Certifications\ncertifications:"),
        ("projects:", "\n# Personal Projects\nprojects:"),
        ("interests:", "\n# Interests (optional)\ninterests:"),
    ];

    let mut result = yaml.to_string();
    for (key, banner) in BANNERS {
        if let Some(idx) = result.find(key) {
            // Annotate only keys at the start of a line (top-level sections).
            if idx == 0 || result.as_bytes()[idx - 1] == b'\n' {
                result.replace_range(idx..idx + key.len(), banner);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_generate_flags() {
        let cli = Cli::parse_from(["cvforge", "generate", "--html", "--theme", "tech"]);
        assert_eq!(cli.theme, "tech");
        assert!(matches!(
            cli.command,
            Commands::Generate {
                html: true,
                pdf: false
            }
        ));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["cvforge", "validate"]);
        assert_eq!(cli.data, PathBuf::from("cv.yaml"));
        assert_eq!(cli.output, PathBuf::from("output"));
        assert_eq!(cli.theme, "modern");
        assert!(cli.color.is_empty());
    }

    #[test]
    fn test_cli_parses_init_options() {
        let cli = Cli::parse_from([
            "cvforge", "init", "--linkedin", "johndoe", "--github", "octocat", "--projects", "10",
        ]);
        match cli.command {
            Commands::Init {
                linkedin,
                github,
                projects,
                force,
                ..
            } => {
                assert_eq!(linkedin.as_deref(), Some("johndoe"));
                assert_eq!(github.as_deref(), Some("octocat"));
                assert_eq!(projects, 10);
                assert!(!force);
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn test_section_comments_annotate_top_level_keys() {
        let yaml = "personal:\n  firstName: Ada\nsummary: Hi\nskills: []\n";
        let annotated = add_section_comments(yaml);
        assert!(annotated.starts_with("# Personal Information\npersonal:"));
        assert!(annotated.contains("\n# Professional Summary\nsummary: Hi"));
        assert!(annotated.contains("\n# Skills (grouped by category)\nskills: []"));
    }

    #[test]
    fn test_written_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.yaml");
        let starter = Resume::starter();

        write_resume_file(&starter, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Resume configuration file"));

        let reloaded: Resume = serde_yaml::from_str(&content).unwrap();
        assert_eq!(reloaded.personal.full_name(), starter.personal.full_name());
        assert_eq!(reloaded.experience.len(), starter.experience.len());
    }
}
