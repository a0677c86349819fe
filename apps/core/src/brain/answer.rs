//! Structured answers built straight from the HR dataset.

use super::intent::Intent;
use crate::dataset::table::{Table, COURSE_NAME, COURSE_TIMING, JOB_OPENING};

/// Per-intent lookup column and reply wording.
struct AnswerTemplate {
    column: &'static str,
    header: &'static str,
    topic: &'static str,
}

fn template(intent: Intent) -> Option<AnswerTemplate> {
    match intent {
        Intent::Course => Some(AnswerTemplate {
            column: COURSE_NAME,
            header: "**📘 Available Courses:**",
            topic: "courses",
        }),
        Intent::Job => Some(AnswerTemplate {
            column: JOB_OPENING,
            header: "**💼 Current Job Openings:**",
            topic: "job openings",
        }),
        Intent::Timing => Some(AnswerTemplate {
            column: COURSE_TIMING,
            header: "**🕒 Course Timings:**",
            topic: "course timings",
        }),
        Intent::General => None,
    }
}

/// Answers a structured intent from the table.
///
/// Returns `None` only for [`Intent::General`]. A missing or empty column is not
/// an error: it produces the fixed "no data yet" sentence for that category.
pub fn answer(intent: Intent, table: &Table) -> Option<String> {
    let template = template(intent)?;
    let values = table.values(template.column);

    if values.is_empty() {
        return Some(no_data_reply(template.topic));
    }

    Some(format!("{}\n- {}", template.header, values.join("\n- ")))
}

fn no_data_reply(topic: &str) -> String {
    format!(
        "I don't have information about specific {} right now. Please check back later or ask a general question.",
        topic
    )
}
