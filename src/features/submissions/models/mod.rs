mod submission;

pub use submission::{Submission, SubmissionWithContext};
