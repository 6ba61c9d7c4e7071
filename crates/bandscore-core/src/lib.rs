//! bandscore-core — Grading core for IELTS-style exams.
//!
//! Scores listening and reading answers per question family, converts
//! correct counts and rubric grades to half-step band scores, and combines
//! sections into an overall result. Grading never fails on malformed data;
//! the [`validation`] module catches those problems at authoring time.

pub mod aggregate;
pub mod answer;
pub mod band;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod family;
pub mod graders;
pub mod model;
pub mod parser;
pub mod report;
pub mod results;
pub mod rubric;
pub mod text;
pub mod validation;

pub use dispatch::{grade, grade_question};
