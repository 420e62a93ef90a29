//! Services module
//!
//! One service per operation, coordinating the repository, extraction
//! and the generation gateway. Handlers call these, never the
//! repository directly.

pub mod analytics;
pub mod documents;
pub mod doubt;
pub mod flashcards;
pub mod planner;
pub mod quiz;

pub use analytics::{AnalyticsService, PerformanceStats};
pub use documents::DocumentsService;
pub use doubt::{DoubtAnswer, DoubtService};
pub use flashcards::FlashcardsService;
pub use planner::{PlannerService, TopicWeight};
pub use quiz::{GradeReport, QuizService};
