//! Loading and filtering the read-only content documents
//!
//! Lookups by id never fail for a missing id: single-entity loaders return
//! `None` and collection filters return an empty list. Errors are reserved for
//! documents that cannot be fetched or parsed.

use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::debug;

use crate::config::ContentConfig;
use crate::content::models::{Course, Lesson, Quiz};
use crate::error::{Error, Result};

pub const COURSES: &str = "courses";
pub const LESSONS: &str = "lessons";
pub const QUIZZES: &str = "quizzes";

/// Where the documents come from
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// `<dir>/data/<name>.json` on the local filesystem
    Dir(PathBuf),
    /// `<base_url>/data/<name>.json` over HTTP
    Http {
        base_url: String,
        client: reqwest::Client,
    },
}

#[derive(Debug, Clone)]
pub struct ContentRepository {
    source: ContentSource,
}

impl ContentRepository {
    pub fn new(source: ContentSource) -> Self {
        Self { source }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(ContentSource::Dir(dir.into()))
    }

    pub fn from_url(base_url: &str, client: reqwest::Client) -> Self {
        Self::new(ContentSource::Http {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Pick a directory or HTTP source based on the configured value
    pub fn from_config(config: &ContentConfig, client: reqwest::Client) -> Self {
        let source = config.source.as_str();
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::from_url(source, client)
        } else {
            Self::from_dir(source)
        }
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Fetch and parse one named collection
    pub async fn load_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        match &self.source {
            ContentSource::Dir(dir) => {
                let path = dir.join("data").join(format!("{}.json", name));
                debug!("Loading {}", path.display());
                let content = tokio::fs::read_to_string(&path).await?;
                Ok(serde_json::from_str(&content)?)
            }
            ContentSource::Http { base_url, client } => {
                let url = format!("{}/data/{}.json", base_url, name);
                debug!("Fetching {}", url);
                let response = client.get(&url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Content(format!("{} returned {}", url, status)));
                }
                Ok(response.json().await?)
            }
        }
    }

    pub async fn load_courses(&self) -> Result<Vec<Course>> {
        self.load_collection(COURSES).await
    }

    pub async fn load_lessons(&self) -> Result<Vec<Lesson>> {
        self.load_collection(LESSONS).await
    }

    pub async fn load_quizzes(&self) -> Result<Vec<Quiz>> {
        self.load_collection(QUIZZES).await
    }

    pub async fn load_course(&self, id: i64) -> Result<Option<Course>> {
        Ok(self.load_courses().await?.into_iter().find(|c| c.id == id))
    }

    pub async fn load_lesson(&self, id: i64) -> Result<Option<Lesson>> {
        Ok(self.load_lessons().await?.into_iter().find(|l| l.id == id))
    }

    pub async fn load_quiz(&self, id: i64) -> Result<Option<Quiz>> {
        Ok(self.load_quizzes().await?.into_iter().find(|q| q.id == id))
    }

    /// Lessons belonging to a course, in lessons-document order
    pub async fn get_course_lessons(&self, course_id: i64) -> Result<Vec<Lesson>> {
        let courses = self.load_courses().await?;
        let lessons = self.load_lessons().await?;

        Ok(match courses.iter().find(|c| c.id == course_id) {
            Some(course) => course_lessons(course, lessons),
            None => Vec::new(),
        })
    }
}

/// Keep the lessons whose id the course lists. Order follows `lessons`,
/// not the course's id list; ids with no matching lesson are skipped.
pub fn course_lessons(course: &Course, lessons: Vec<Lesson>) -> Vec<Lesson> {
    lessons
        .into_iter()
        .filter(|l| course.lessons.contains(&l.id))
        .collect()
}

/// Previous and next lesson by position in the lessons document
pub fn lesson_neighbors(lessons: &[Lesson], id: i64) -> (Option<Lesson>, Option<Lesson>) {
    let Some(index) = lessons.iter().position(|l| l.id == id) else {
        return (None, None);
    };

    let prev = index.checked_sub(1).and_then(|i| lessons.get(i)).cloned();
    let next = lessons.get(index + 1).cloned();
    (prev, next)
}
