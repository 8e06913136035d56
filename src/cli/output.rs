//! CLI output formatting utilities

use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use crate::auth::AuthView;
use crate::cli::OutputFormat;
use crate::content::{Course, CoursePage, Lesson, LessonPage, QuizPage};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Spinner shown while waiting on the network
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Print a value as JSON or YAML. Returns false for the table format.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<bool> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => return Ok(false),
    }
    Ok(true)
}

/// Print a table of courses
pub fn print_course_table(courses: &[Course]) {
    if courses.is_empty() {
        info("No courses found");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Lessons").fg(Color::Cyan),
            Cell::new("Summary").fg(Color::Cyan),
        ]);

    for course in courses {
        table.add_row(vec![
            Cell::new(course.id),
            Cell::new(&course.title),
            Cell::new(course.lessons.len()),
            Cell::new(&course.summary),
        ]);
    }

    println!("{table}");
}

fn print_lesson_table(lessons: &[Lesson]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Quiz").fg(Color::Cyan),
        ]);

    for lesson in lessons {
        table.add_row(vec![
            Cell::new(lesson.id),
            Cell::new(&lesson.title),
            Cell::new(
                lesson
                    .quiz_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    println!("{table}");
}

/// Print a course with its lessons
pub fn print_course_detail(page: &CoursePage) {
    println!("{}", page.course.title.bold().underline());
    println!();
    if !page.course.description.is_empty() {
        println!("  {}", page.course.description);
        println!();
    }

    if page.lessons.is_empty() {
        info("This course has no lessons yet");
    } else {
        print_lesson_table(&page.lessons);
    }
}

/// Print a lesson and its previous/next links
pub fn print_lesson_detail(page: &LessonPage) {
    let lesson = &page.lesson;
    println!("{}", lesson.title.bold().underline());
    println!();
    if !lesson.intro.is_empty() {
        println!("{}", lesson.intro);
        println!();
    }

    for section in &lesson.sections {
        println!("{}", section.title.bold());
        println!("{}", section.content);
        for point in section.key_points.iter().flatten() {
            println!("  - {}", point);
        }
        if let Some(example) = &section.example {
            println!("  {} {}", "Example:".italic(), example);
        }
        println!();
    }

    if !lesson.key_takeaways.is_empty() {
        println!("{}", "Key takeaways".bold());
        for takeaway in &lesson.key_takeaways {
            println!("  {} {}", "●".green(), takeaway);
        }
        println!();
    }

    if let Some(connection) = &lesson.connection_to_scientific_method {
        println!("{} {}", "Scientific method:".bold(), connection);
        println!();
    }

    for term in lesson.glossary.iter().flatten() {
        println!("  {} {}", format!("{}:", term.term).bold(), term.definition);
    }

    let prev = page
        .prev_lesson
        .as_ref()
        .map(|l| format!("← {} {}", l.id, l.title))
        .unwrap_or_default();
    let next = page
        .next_lesson
        .as_ref()
        .map(|l| format!("{} {} →", l.id, l.title))
        .unwrap_or_default();
    if !prev.is_empty() || !next.is_empty() {
        println!("{}    {}", prev.cyan(), next.cyan());
    }
}

/// Print a quiz, optionally marking the correct answers
pub fn print_quiz_detail(page: &QuizPage, show_answers: bool) {
    let quiz = &page.quiz;
    println!("{}", quiz.title.bold().underline());
    println!();
    if !quiz.description.is_empty() {
        println!("{}", quiz.description);
        println!();
    }

    for (index, question) in quiz.questions.iter().enumerate() {
        println!("{}. {}", index + 1, question.text.bold());
        let correct = if show_answers {
            quiz.correct_answers(question.id)
        } else {
            Vec::new()
        };
        for (letter, answer) in ('a'..='z').zip(&question.answers) {
            if correct.iter().any(|c| c.id == answer.id) {
                println!("   {}) {} {}", letter, answer.text, "✓".green());
                if let Some(explanation) = &answer.explanation {
                    println!("      {}", explanation.italic());
                }
            } else {
                println!("   {}) {}", letter, answer.text);
            }
        }
        println!();
    }
}

/// Print the current session
pub fn print_session(view: &AuthView, expires: Option<DateTime<Utc>>) {
    match &view.user {
        Some(user) if view.is_authenticated => {
            println!("  {} {}", "User:".bold(), user.username);
            println!("  {} {}", "Email:".bold(), user.email);
            println!("  {} {}", "ID:".bold(), user.id);
            if let Some(expires) = expires {
                println!(
                    "  {} {}",
                    "Expires:".bold(),
                    expires.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
        _ => info("Not signed in"),
    }
}
