//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use chrono::NaiveDate;
use faixa_core::{
    Clock, Evaluator, FaixaError, Program, PromotionRequest, Session, StudentGraduationState,
    SystemClock,
};
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(db_path: &PathBuf, host: &str, port: u16) -> Result<(), FaixaError> {
    let session = Session::with_redb(db_path)?;

    println!("Faixa Academy Graduation Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Endpoints:");
    println!("  GET  /health                         - Health check");
    println!("  GET  /students                       - List students");
    println!("  POST /students                       - Register a student");
    println!("  GET  /students/{{id}}                  - Graduation state");
    println!("  GET  /students/{{id}}/eligibility      - Promotion eligibility");
    println!("  POST /students/{{id}}/attendance       - Record a class");
    println!("  GET  /students/{{id}}/promotions       - Promotion history");
    println!("  POST /students/{{id}}/promotions       - Record a promotion");
    println!("  POST /students/{{id}}/degree           - Set degree count");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, session).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(db_path: &PathBuf, force: bool) -> Result<(), FaixaError> {
    if db_path.exists() && !force {
        return Err(FaixaError::IoError(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }
    if db_path.exists() {
        std::fs::remove_file(db_path)
            .map_err(|e| FaixaError::IoError(format!("Remove old database: {}", e)))?;
    }

    let _session = Session::with_redb(db_path)?;
    println!("Initialized new database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// REGISTER COMMAND
// =============================================================================

/// Register a student into a program.
pub fn cmd_register(
    db_path: &PathBuf,
    json_mode: bool,
    student: u64,
    program: &str,
    enrolled: NaiveDate,
) -> Result<(), FaixaError> {
    let program = Program::from_str(program)?;
    let mut session = Session::with_redb(db_path)?;
    let state = session.register(faixa_core::StudentId(student), program, enrolled)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&state).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "Registered student {} in the {} program",
        student,
        program.as_str()
    );
    println!("Starting rank: {} (enrolled {})", state.rank, enrolled);
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

fn print_state(state: &StudentGraduationState) {
    let last = state
        .last_promotion
        .map(|d| d.to_string())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "  #{:<6} {:<10} {:<14} {} degree(s)  enrolled {}  last promotion {}",
        state.student.0,
        state.program.as_str(),
        state.rank,
        state.degrees,
        state.enrolled,
        last
    );
}

/// Show one student's state, or all students.
pub fn cmd_status(
    db_path: &PathBuf,
    json_mode: bool,
    student: Option<u64>,
) -> Result<(), FaixaError> {
    let session = Session::with_redb(db_path)?;

    match student {
        Some(id) => {
            let state = session.state(faixa_core::StudentId(id))?;
            if json_mode {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&state).unwrap_or_default()
                );
                return Ok(());
            }
            println!("Faixa Student Status");
            println!("====================");
            print_state(&state);
            println!("  version: {}", state.version);
        }
        None => {
            let states = session.students()?;
            if json_mode {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&states).unwrap_or_default()
                );
                return Ok(());
            }
            println!("Faixa Academy Roster ({} students)", states.len());
            println!("==================================");
            for state in &states {
                print_state(state);
            }
        }
    }
    Ok(())
}

// =============================================================================
// ATTEND COMMAND
// =============================================================================

/// Record a scheduled class.
pub fn cmd_attend(
    db_path: &PathBuf,
    json_mode: bool,
    student: u64,
    date: NaiveDate,
    present: bool,
) -> Result<(), FaixaError> {
    let mut session = Session::with_redb(db_path)?;
    session.record_attendance(faixa_core::StudentId(student), date, present)?;

    if json_mode {
        let output = serde_json::json!({
            "student": student,
            "date": date,
            "present": present
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "Recorded {} for student {} on {}",
        if present { "presence" } else { "absence" },
        student,
        date
    );
    Ok(())
}

// =============================================================================
// EVALUATE COMMAND
// =============================================================================

/// Evaluate promotion eligibility.
pub fn cmd_evaluate(
    db_path: &PathBuf,
    json_mode: bool,
    student: u64,
    on: Option<NaiveDate>,
) -> Result<(), FaixaError> {
    let session = Session::with_redb(db_path)?;
    let today = on.unwrap_or_else(|| SystemClock.today());
    let snapshot = session.evaluate(faixa_core::StudentId(student), &Evaluator::new(), today)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).unwrap_or_default()
        );
        return Ok(());
    }

    let check = |met: bool| if met { "met" } else { "NOT met" };

    println!("Faixa Eligibility Evaluation");
    println!("============================");
    println!("Student:    {}", student);
    println!("As of:      {}", today);
    println!();
    println!(
        "Time in rank:  {} month(s) — {}",
        snapshot.months_since_promotion,
        check(snapshot.time_met)
    );
    println!(
        "Classes:       {} of {} scheduled — {}",
        snapshot.classes_attended,
        snapshot.scheduled_classes,
        check(snapshot.classes_met)
    );
    println!(
        "Attendance:    {}.{:02}% — {}",
        snapshot.attendance_bps / 100,
        snapshot.attendance_bps % 100,
        check(snapshot.attendance_met)
    );
    println!();
    match (&snapshot.next_candidate, snapshot.eligible) {
        (Some(next), true) => println!("ELIGIBLE for promotion to {}", next),
        (Some(next), false) => println!("Not yet eligible (next belt: {})", next),
        (None, true) => println!("ELIGIBLE for a degree (terminal belt)"),
        (None, false) => println!("Not yet eligible (terminal belt)"),
    }
    Ok(())
}

// =============================================================================
// PROMOTE COMMAND
// =============================================================================

/// Record an approved promotion.
///
/// The attendance metrics stored in the history entry are derived from the
/// eligibility evaluation at the promotion date, so the log keeps the numbers
/// the approver actually reviewed.
#[allow(clippy::too_many_arguments)]
pub fn cmd_promote(
    db_path: &PathBuf,
    json_mode: bool,
    student: u64,
    target: &str,
    on: Option<NaiveDate>,
    evaluator: &str,
    notes: &str,
    expected_version: Option<u64>,
) -> Result<(), FaixaError> {
    let mut session = Session::with_redb(db_path)?;
    let student = faixa_core::StudentId(student);
    let promoted_on = on.unwrap_or_else(|| SystemClock.today());

    let snapshot = session.evaluate(student, &Evaluator::new(), promoted_on)?;
    if !snapshot.eligible {
        tracing::warn!(
            student = student.0,
            target = target,
            "Promotion approved below the advisory thresholds"
        );
    }

    let request = PromotionRequest {
        target_rank: target.to_string(),
        promoted_on,
        attendance_bps: snapshot.attendance_bps,
        classes_attended: snapshot.classes_attended,
        evaluator: evaluator.to_string(),
        notes: notes.to_string(),
    };
    let entry = session.promote(student, &request, expected_version)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&entry).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "Promoted student {}: {} -> {} on {} (approved by {})",
        student.0,
        entry.prior_rank.as_deref().unwrap_or("-"),
        entry.new_rank,
        entry.promoted_on,
        entry.evaluator
    );
    Ok(())
}

// =============================================================================
// DEGREE COMMAND
// =============================================================================

/// Set the degree count within the current belt.
pub fn cmd_degree(
    db_path: &PathBuf,
    json_mode: bool,
    student: u64,
    count: u8,
    expected_version: Option<u64>,
) -> Result<(), FaixaError> {
    let mut session = Session::with_redb(db_path)?;
    let state = session.set_degree(faixa_core::StudentId(student), count, expected_version)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&state).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "Student {} now holds {} with {} degree(s)",
        student, state.rank, state.degrees
    );
    Ok(())
}

// =============================================================================
// HISTORY COMMAND
// =============================================================================

/// Show a student's promotion log.
pub fn cmd_history(db_path: &PathBuf, json_mode: bool, student: u64) -> Result<(), FaixaError> {
    let session = Session::with_redb(db_path)?;
    let log = session.history(faixa_core::StudentId(student))?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&log).unwrap_or_default());
        return Ok(());
    }

    println!("Faixa Promotion History (student {})", student);
    println!("====================================");
    if log.is_empty() {
        println!("  No promotions recorded.");
        return Ok(());
    }
    for entry in &log {
        println!(
            "  {}  {} -> {}  ({} classes, {}.{:02}% attendance, approved by {})",
            entry.promoted_on,
            entry.prior_rank.as_deref().unwrap_or("-"),
            entry.new_rank,
            entry.classes_attended,
            entry.attendance_bps / 100,
            entry.attendance_bps % 100,
            entry.evaluator
        );
        if !entry.notes.is_empty() {
            println!("      notes: {}", entry.notes);
        }
    }
    Ok(())
}
