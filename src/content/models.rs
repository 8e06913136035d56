//! Course, lesson and quiz records as stored in the content documents

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub summary: String,
    /// Ids of the lessons in this course
    #[serde(default)]
    pub lessons: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub quiz_id: Option<i64>,
    #[serde(default)]
    pub sections: Vec<LessonSection>,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_to_scientific_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary: Option<Vec<GlossaryTerm>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonSection {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub lesson_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_lesson_id: Option<i64>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Quiz {
    /// Answers marked correct for a question
    pub fn correct_answers(&self, question_id: i64) -> Vec<&QuizAnswer> {
        self.questions
            .iter()
            .filter(|q| q.id == question_id)
            .flat_map(|q| q.answers.iter().filter(|a| a.correct))
            .collect()
    }
}
