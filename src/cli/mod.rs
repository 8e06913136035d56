//! CLI interface for smlt

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "smlt")]
#[command(version)]
#[command(about = "Scientific method courses, lessons and quizzes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new smlt.toml configuration file
    Init,

    /// Start the HTTP server
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Sign in and keep the session for later commands
    Login {
        /// Username or email
        identity: String,

        /// Password (prompted when omitted)
        #[arg(short, long, env = "SMLT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create a new account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        /// Password (prompted with confirmation when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who is signed in
    Whoami {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List all courses
    Courses {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a course and its lessons
    Course {
        id: String,

        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a lesson with its neighbours
    Lesson {
        id: String,

        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a quiz
    Quiz {
        id: String,

        /// Mark the correct answers
        #[arg(long)]
        answers: bool,

        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
