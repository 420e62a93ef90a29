//! Study Agent library
//!
//! Backend for a study assistant: uploaded documents are turned into
//! flashcards, quizzes, answers to questions and revision plans. The
//! library exposes everything the binary serves, for testing and
//! embedding.

pub mod api;
pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod services;
