//! Page loaders: the data each course/lesson/quiz page needs, or a not-found signal

use serde::{Deserialize, Serialize};

use crate::content::models::{Course, Lesson, Quiz};
use crate::content::repository::{course_lessons, lesson_neighbors, ContentRepository};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomePage {
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursePage {
    pub course: Course,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPage {
    pub lesson: Lesson,
    pub prev_lesson: Option<Lesson>,
    pub next_lesson: Option<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizPage {
    pub quiz: Quiz,
}

/// Parse a route id segment. Anything that is not an integer matches no entity.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

pub async fn load_home(repo: &ContentRepository) -> Result<HomePage> {
    Ok(HomePage {
        courses: repo.load_courses().await?,
    })
}

pub async fn load_course_page(repo: &ContentRepository, id: i64) -> Result<CoursePage> {
    let courses = repo.load_courses().await?;
    let course = courses
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| Error::CourseNotFound(id.to_string()))?;

    let lessons = course_lessons(&course, repo.load_lessons().await?);
    Ok(CoursePage { course, lessons })
}

pub async fn load_lesson_page(repo: &ContentRepository, id: i64) -> Result<LessonPage> {
    let lessons = repo.load_lessons().await?;
    let lesson = lessons
        .iter()
        .find(|l| l.id == id)
        .cloned()
        .ok_or_else(|| Error::LessonNotFound(id.to_string()))?;

    let (prev_lesson, next_lesson) = lesson_neighbors(&lessons, id);
    Ok(LessonPage {
        lesson,
        prev_lesson,
        next_lesson,
    })
}

pub async fn load_quiz_page(repo: &ContentRepository, id: i64) -> Result<QuizPage> {
    let quiz = repo.load_quiz(id).await?.ok_or_else(|| Error::QuizNotFound(id.to_string()))?;
    Ok(QuizPage { quiz })
}
