//! Recurring schedule management.

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::booking::{ensure_parties, required_instrument, resolve_duration};
use crate::config::SchedulingConfig;
use crate::conflict::check_schedule_lanes;
use crate::errors::{StudioError, StudioResult};
use crate::materializer::generate_lessons;
use crate::models::people::Actor;
use crate::models::schedule::{
    CreateScheduleResponse, GenerationReport, NewSchedule, RecurringSchedule, ScheduleUpdate,
};
use crate::store::{Store, StoreTx};
use crate::time::TimeRange;

/// Stores a new weekly pattern and materializes it up to the configured horizon,
/// starting from `today` or the schedule's first effective date, whichever is later.
pub async fn create_schedule<S: Store>(
    store: &S,
    actor: &Actor,
    config: &SchedulingConfig,
    today: NaiveDate,
    new: NewSchedule,
) -> StudioResult<CreateScheduleResponse> {
    actor.require_admin()?;
    validate_day_of_week(new.day_of_week)?;
    validate_effective_range(new.effective_from, new.effective_until)?;
    let range = TimeRange::new(new.start_time, new.end_time)?;
    let duration = resolve_duration(&range, new.duration)?;
    let instrument = required_instrument(&new.instrument)?;

    let schedule = RecurringSchedule {
        id: Uuid::new_v4(),
        teacher_id: new.teacher_id,
        student_id: new.student_id,
        room_id: new.room_id,
        instrument,
        day_of_week: new.day_of_week,
        start_time: range.start,
        end_time: range.end,
        duration,
        effective_from: new.effective_from,
        effective_until: new.effective_until,
        is_active: true,
        created_at: Utc::now(),
    };

    let mut tx = store.begin().await?;
    ensure_parties(&mut tx, schedule.room_id, schedule.teacher_id, schedule.student_id).await?;
    check_schedule_lanes(&mut tx, &schedule, None).await?;
    tx.insert_schedule(&schedule).await?;
    tx.commit().await?;
    info!(schedule_id = %schedule.id, day_of_week = schedule.day_of_week, "schedule created");

    let generation = match initial_window(&schedule, config, today) {
        Some((from, until)) => {
            generate_lessons(store, &schedule, from, until, config.max_range_days).await?
        }
        None => GenerationReport::default(),
    };

    Ok(CreateScheduleResponse {
        schedule,
        generation,
    })
}

/// First materialization window, clamped to the effective range and to the
/// configured maximum range.
pub fn initial_window(
    schedule: &RecurringSchedule,
    config: &SchedulingConfig,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let horizon = config.initial_horizon_days.min(config.max_range_days);
    if horizon == 0 {
        return None;
    }
    let from = today.max(schedule.effective_from);
    let mut until = from + Duration::days(i64::from(horizon) - 1);
    if let Some(last) = schedule.effective_until {
        until = until.min(last);
    }
    (from <= until).then_some((from, until))
}

pub async fn get_schedule<S: Store>(store: &S, id: Uuid) -> StudioResult<RecurringSchedule> {
    let mut tx = store.begin().await?;
    let schedule = tx
        .get_schedule(id)
        .await?
        .ok_or_else(|| StudioError::not_found("Schedule", id))?;
    Ok(schedule)
}

/// Edits a schedule, re-checking it against every other active schedule.
/// Lessons already generated from it are left untouched.
pub async fn update_schedule<S: Store>(
    store: &S,
    actor: &Actor,
    id: Uuid,
    update: ScheduleUpdate,
) -> StudioResult<RecurringSchedule> {
    actor.require_admin()?;
    let mut tx = store.begin().await?;
    let current = tx
        .get_schedule(id)
        .await?
        .ok_or_else(|| StudioError::not_found("Schedule", id))?;

    let mut schedule = current.clone();
    if let Some(teacher_id) = update.teacher_id {
        schedule.teacher_id = teacher_id;
    }
    if let Some(student_id) = update.student_id {
        schedule.student_id = student_id;
    }
    if let Some(room_id) = update.room_id {
        schedule.room_id = room_id;
    }
    if let Some(instrument) = &update.instrument {
        schedule.instrument = required_instrument(instrument)?;
    }
    if let Some(day_of_week) = update.day_of_week {
        validate_day_of_week(day_of_week)?;
        schedule.day_of_week = day_of_week;
    }
    let range = TimeRange::new(
        update.start_time.unwrap_or(current.start_time),
        update.end_time.unwrap_or(current.end_time),
    )?;
    schedule.start_time = range.start;
    schedule.end_time = range.end;
    schedule.duration = match update.duration {
        Some(minutes) => resolve_duration(&range, Some(minutes))?,
        None if range != current.range() => range.duration_minutes(),
        None => current.duration,
    };
    if let Some(from) = update.effective_from {
        schedule.effective_from = from;
    }
    if let Some(until) = update.effective_until {
        schedule.effective_until = until;
    }
    validate_effective_range(schedule.effective_from, schedule.effective_until)?;
    if let Some(active) = update.is_active {
        schedule.is_active = active;
    }

    if schedule.room_id != current.room_id
        || schedule.teacher_id != current.teacher_id
        || schedule.student_id != current.student_id
    {
        ensure_parties(&mut tx, schedule.room_id, schedule.teacher_id, schedule.student_id)
            .await?;
    }
    if schedule.is_active {
        check_schedule_lanes(&mut tx, &schedule, Some(schedule.id)).await?;
    }
    tx.update_schedule(&schedule).await?;
    tx.commit().await?;
    info!(schedule_id = %schedule.id, "schedule updated");
    Ok(schedule)
}

/// Soft-deletes a schedule so it stops participating in conflict checks.
pub async fn deactivate_schedule<S: Store>(
    store: &S,
    actor: &Actor,
    id: Uuid,
) -> StudioResult<RecurringSchedule> {
    actor.require_admin()?;
    let mut tx = store.begin().await?;
    let mut schedule = tx
        .get_schedule(id)
        .await?
        .ok_or_else(|| StudioError::not_found("Schedule", id))?;
    schedule.is_active = false;
    tx.update_schedule(&schedule).await?;
    tx.commit().await?;
    info!(schedule_id = %schedule.id, "schedule deactivated");
    Ok(schedule)
}

/// Explicit generation over an admin-chosen range.
pub async fn generate_for_schedule<S: Store>(
    store: &S,
    actor: &Actor,
    config: &SchedulingConfig,
    id: Uuid,
    from: NaiveDate,
    until: NaiveDate,
) -> StudioResult<GenerationReport> {
    actor.require_admin()?;
    let schedule = get_schedule(store, id).await?;
    if !schedule.is_active {
        return Err(StudioError::Validation(format!(
            "schedule {id} is not active"
        )));
    }
    generate_lessons(store, &schedule, from, until, config.max_range_days).await
}

fn validate_day_of_week(day_of_week: i16) -> StudioResult<()> {
    if !(0..=6).contains(&day_of_week) {
        return Err(StudioError::Validation(format!(
            "day_of_week must be between 0 (Sunday) and 6 (Saturday), got {day_of_week}"
        )));
    }
    Ok(())
}

fn validate_effective_range(from: NaiveDate, until: Option<NaiveDate>) -> StudioResult<()> {
    match until {
        Some(until) if until < from => Err(StudioError::Validation(format!(
            "effective_until {until} is before effective_from {from}"
        ))),
        _ => Ok(()),
    }
}
