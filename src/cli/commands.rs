//! CLI command implementations

use anyhow::Result;
use dialoguer::Password;
use std::fs;

use crate::auth::{token_expiry, AuthContext};
use crate::cli::{
    error, info, print_course_detail, print_course_table, print_lesson_detail, print_quiz_detail,
    print_session, print_structured, spinner, success, warn, OutputFormat,
};
use crate::config::{self, loader::CONFIG_FILENAME, Config};
use crate::content::pages::{self, parse_id};
use crate::content::ContentRepository;
use crate::error::Error;

/// Initialize a new smlt.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Put courses.json, lessons.json and quizzes.json under ./static/data and run 'smlt serve'");

    Ok(())
}

/// Start the HTTP server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Sign in with an identity and password
pub async fn login(identity: &str, password: Option<String>) -> Result<()> {
    let config = load_config()?;
    let ctx = AuthContext::open(&config)?;

    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let pb = spinner("Signing in...");
    let result = ctx.state().login(identity, &password).await;
    pb.finish_and_clear();

    match result {
        Ok(auth) => {
            success(&format!("Signed in as {}", auth.record.username));
            Ok(())
        }
        Err(e) => {
            error(&format!("Failed to sign in: {}", e));
            Err(e.into())
        }
    }
}

/// Create an account
pub async fn register(username: &str, email: &str, password: Option<String>) -> Result<()> {
    let config = load_config()?;
    let ctx = AuthContext::open(&config)?;

    let (password, password_confirm) = match password {
        Some(password) => (password.clone(), password),
        None => {
            let password = Password::new().with_prompt("Password").interact()?;
            let confirm = Password::new().with_prompt("Confirm password").interact()?;
            (password, confirm)
        }
    };

    let pb = spinner("Creating account...");
    let result = ctx
        .state()
        .register(username, email, &password, &password_confirm)
        .await;
    pb.finish_and_clear();

    match result {
        Ok(record) => {
            success(&format!("Created account {}", record.username));
            info(&format!("Sign in with 'smlt login {}'", username));
            Ok(())
        }
        Err(e) => {
            error(&format!("Failed to create account: {}", e));
            Err(e.into())
        }
    }
}

/// Forget the stored session
pub async fn logout() -> Result<()> {
    let config = load_config()?;
    let ctx = AuthContext::open(&config)?;

    if !ctx.state().is_authenticated() {
        info("Not signed in");
        return Ok(());
    }

    ctx.state().logout();
    success("Signed out");
    Ok(())
}

/// Show the stored session, refreshing it against the provider first
pub async fn whoami(format: OutputFormat) -> Result<()> {
    let config = load_config()?;
    let ctx = AuthContext::open(&config)?;

    if ctx.state().is_authenticated() {
        let pb = spinner("Checking session...");
        crate::auth::refresh_session(ctx.client()).await;
        pb.finish_and_clear();
    }

    let view = ctx.state().view();
    if !print_structured(&view, format)? {
        let expires = token_expiry(&ctx.client().store().token());
        print_session(&view, expires);
    }
    Ok(())
}

/// List courses
pub async fn courses(format: OutputFormat) -> Result<()> {
    let repo = content_repository()?;
    let page = pages::load_home(&repo).await?;

    if !print_structured(&page, format)? {
        print_course_table(&page.courses);
    }
    Ok(())
}

/// Show a course
pub async fn course(id: &str, format: OutputFormat) -> Result<()> {
    let repo = content_repository()?;
    let id = parse_id(id).ok_or_else(|| Error::CourseNotFound(id.to_string()))?;
    let page = pages::load_course_page(&repo, id).await?;

    if !print_structured(&page, format)? {
        print_course_detail(&page);
    }
    Ok(())
}

/// Show a lesson
pub async fn lesson(id: &str, format: OutputFormat) -> Result<()> {
    let repo = content_repository()?;
    let id = parse_id(id).ok_or_else(|| Error::LessonNotFound(id.to_string()))?;
    let page = pages::load_lesson_page(&repo, id).await?;

    if !print_structured(&page, format)? {
        print_lesson_detail(&page);
    }
    Ok(())
}

/// Show a quiz
pub async fn quiz(id: &str, answers: bool, format: OutputFormat) -> Result<()> {
    let repo = content_repository()?;
    let id = parse_id(id).ok_or_else(|| Error::QuizNotFound(id.to_string()))?;
    let page = pages::load_quiz_page(&repo, id).await?;

    if !print_structured(&page, format)? {
        print_quiz_detail(&page, answers);
    }
    Ok(())
}

// Helper functions

fn load_config() -> Result<Config> {
    config::load_config().map_err(|e| anyhow::anyhow!("{}", e))
}

fn content_repository() -> Result<ContentRepository> {
    let config = load_config()?;
    let client = reqwest::Client::builder().build()?;
    Ok(ContentRepository::from_config(&config.content, client))
}
