//! Course, lesson and quiz content

pub mod models;
pub mod pages;
pub mod repository;

pub use models::{Course, GlossaryTerm, Lesson, LessonSection, Quiz, QuizAnswer, QuizQuestion};
pub use pages::{
    load_course_page, load_home, load_lesson_page, load_quiz_page, CoursePage, HomePage,
    LessonPage, QuizPage,
};
pub use repository::{course_lessons, lesson_neighbors, ContentRepository, ContentSource};
