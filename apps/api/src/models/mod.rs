pub mod feedback;
pub mod record;

pub use feedback::{Category, Feedback, Tip, TipKind};
pub use record::{resume_key, ResumeRecord};
