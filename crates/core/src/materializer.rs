//! Expansion of weekly schedules into dated lessons.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::booking::book_in_tx;
use crate::errors::{StudioError, StudioResult};
use crate::models::lesson::{Lesson, NewLesson};
use crate::models::schedule::{GenerationReport, RecurringSchedule, SkippedDate};
use crate::store::{Store, StoreTx};

pub const ALREADY_EXISTS: &str = "already exists";

/// Realizes `schedule` on every matching date in `from..=until`.
///
/// Each date is booked in its own transaction. Dates that already carry a
/// lesson for the same teacher, student and room are skipped, which makes the
/// call safe to repeat; a date that fails to book is skipped with the reason
/// and the remaining dates are still attempted.
pub async fn generate_lessons<S: Store>(
    store: &S,
    schedule: &RecurringSchedule,
    from: NaiveDate,
    until: NaiveDate,
    max_days: u32,
) -> StudioResult<GenerationReport> {
    check_range(from, until, max_days)?;

    let mut report = GenerationReport::default();
    for date in from.iter_days().take_while(|date| *date <= until) {
        if !schedule.applies_on(date) {
            continue;
        }
        match realize(store, schedule, date).await {
            Ok(Some(lesson)) => report.created.push(lesson),
            Ok(None) => {
                debug!(schedule_id = %schedule.id, %date, "lesson already exists");
                report.skipped.push(SkippedDate {
                    date,
                    reason: ALREADY_EXISTS.to_string(),
                });
            }
            Err(err) => {
                warn!(schedule_id = %schedule.id, %date, "skipping date: {err}");
                report.skipped.push(SkippedDate {
                    date,
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        schedule_id = %schedule.id,
        created = report.created.len(),
        skipped = report.skipped.len(),
        "schedule materialized"
    );
    Ok(report)
}

/// Inclusive ranges longer than `max_days` are refused.
pub fn check_range(from: NaiveDate, until: NaiveDate, max_days: u32) -> StudioResult<()> {
    if from > until {
        return Err(StudioError::Validation(format!(
            "range start {from} is after its end {until}"
        )));
    }
    let days = (until - from).num_days() + 1;
    if days > i64::from(max_days) {
        return Err(StudioError::Validation(format!(
            "range of {days} days exceeds the limit of {max_days} days"
        )));
    }
    Ok(())
}

async fn realize<S: Store>(
    store: &S,
    schedule: &RecurringSchedule,
    date: NaiveDate,
) -> StudioResult<Option<Lesson>> {
    let mut tx = store.begin().await?;
    if tx
        .lesson_exists(
            schedule.id,
            schedule.teacher_id,
            schedule.student_id,
            schedule.room_id,
            date,
        )
        .await?
    {
        return Ok(None);
    }
    let lesson = book_in_tx(
        &mut tx,
        NewLesson {
            teacher_id: schedule.teacher_id,
            student_id: schedule.student_id,
            room_id: schedule.room_id,
            instrument: schedule.instrument.clone(),
            date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            duration: Some(schedule.duration),
        },
        Some(schedule.id),
    )
    .await?;
    tx.commit().await?;
    Ok(Some(lesson))
}
