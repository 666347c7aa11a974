//! # redb-backed Graduation Registry
//!
//! A disk-backed [`GraduationStore`] using the redb embedded database:
//! ACID transactions, crash safety (copy-on-write B-trees), MVCC with a
//! single writer.
//!
//! The promotion path is the reason this backend exists: the history append
//! and the state update run in one write transaction, so a crash between
//! the two steps cannot leave the log and the state inconsistent. Version
//! checks happen inside the same transaction, before any write.

use crate::promotion::{PromotionRequest, Recorder};
use crate::registry::{GraduationStore, check_version};
use crate::types::{
    AttendanceRecord, FaixaError, GraduationHistoryEntry, Program, StudentGraduationState,
    StudentId,
};
use crate::{curriculum, degree};
use chrono::{Datelike, NaiveDate};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Table for graduation state: StudentId(u64) -> serialized state bytes.
const STUDENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("students");

/// Table for the promotion log: (student_id, seq) -> serialized entry bytes.
/// The sequence number preserves append order within a student.
const HISTORY: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("history");

/// Table for attendance: (student_id, day_number) -> present.
/// Day numbers are days since the Common Era, so ranges scan in date order.
const ATTENDANCE: TableDefinition<(u64, i64), bool> = TableDefinition::new("attendance");

/// A disk-backed graduation registry using redb.
pub struct RedbRegistry {
    db: Database,
}

impl std::fmt::Debug for RedbRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbRegistry").finish_non_exhaustive()
    }
}

fn io_err(e: impl std::fmt::Display) -> FaixaError {
    FaixaError::IoError(e.to_string())
}

fn ser_err(e: impl std::fmt::Display) -> FaixaError {
    FaixaError::SerializationError(e.to_string())
}

fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

fn date_from_day_number(days: i64) -> Result<NaiveDate, FaixaError> {
    NaiveDate::from_num_days_from_ce_opt(days as i32)
        .ok_or_else(|| ser_err(format!("day number {} out of range", days)))
}

impl RedbRegistry {
    /// Open or create a registry database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FaixaError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let _ = write_txn.open_table(HISTORY).map_err(io_err)?;
            let _ = write_txn.open_table(ATTENDANCE).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        Ok(Self { db })
    }

    /// Compact the database (optional optimization).
    pub fn compact(&mut self) -> Result<(), FaixaError> {
        self.db.compact().map_err(io_err)?;
        Ok(())
    }

    fn read_state_bytes(bytes: &[u8]) -> Result<StudentGraduationState, FaixaError> {
        postcard::from_bytes(bytes).map_err(ser_err)
    }

    fn read_entry_bytes(bytes: &[u8]) -> Result<GraduationHistoryEntry, FaixaError> {
        postcard::from_bytes(bytes).map_err(ser_err)
    }
}

impl GraduationStore for RedbRegistry {
    fn register(
        &mut self,
        student: StudentId,
        program: Program,
        enrolled: NaiveDate,
    ) -> Result<StudentGraduationState, FaixaError> {
        let state = StudentGraduationState {
            student,
            program,
            rank: curriculum::default_rank(program).name.to_string(),
            degrees: 0,
            enrolled,
            last_promotion: None,
            version: 1,
        };
        let state_bytes = postcard::to_allocvec(&state).map_err(ser_err)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut students_table = write_txn.open_table(STUDENTS).map_err(io_err)?;
            if students_table.get(student.0).map_err(io_err)?.is_some() {
                return Err(FaixaError::DuplicateStudent(student));
            }
            students_table
                .insert(student.0, state_bytes.as_slice())
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        Ok(state)
    }

    fn state(&self, student: StudentId) -> Result<StudentGraduationState, FaixaError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let students_table = read_txn.open_table(STUDENTS).map_err(io_err)?;
        let bytes = students_table
            .get(student.0)
            .map_err(io_err)?
            .ok_or(FaixaError::StudentNotFound(student))?;
        Self::read_state_bytes(bytes.value())
    }

    fn students(&self) -> Result<Vec<StudentGraduationState>, FaixaError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let students_table = read_txn.open_table(STUDENTS).map_err(io_err)?;

        let mut states = Vec::new();
        for entry in students_table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            states.push(Self::read_state_bytes(value.value())?);
        }
        Ok(states)
    }

    fn promote(
        &mut self,
        student: StudentId,
        request: &PromotionRequest,
        expected_version: Option<u64>,
    ) -> Result<GraduationHistoryEntry, FaixaError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let entry = {
            let mut students_table = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let mut history_table = write_txn.open_table(HISTORY).map_err(io_err)?;

            // Read, check, and validate against the state inside the same
            // transaction, before any write.
            let current = {
                let bytes = students_table
                    .get(student.0)
                    .map_err(io_err)?
                    .ok_or(FaixaError::StudentNotFound(student))?;
                Self::read_state_bytes(bytes.value())?
            };
            check_version(expected_version, current.version)?;

            let (updated, entry) = Recorder::record(&current, request)?;

            let next_seq = {
                let mut seq = 0u64;
                for row in history_table
                    .range((student.0, 0u64)..=(student.0, u64::MAX))
                    .map_err(io_err)?
                {
                    let (key, _) = row.map_err(io_err)?;
                    seq = key.value().1.saturating_add(1);
                }
                seq
            };

            let entry_bytes = postcard::to_allocvec(&entry).map_err(ser_err)?;
            let state_bytes = postcard::to_allocvec(&updated).map_err(ser_err)?;

            history_table
                .insert((student.0, next_seq), entry_bytes.as_slice())
                .map_err(io_err)?;
            students_table
                .insert(student.0, state_bytes.as_slice())
                .map_err(io_err)?;

            entry
        };
        // Both writes land together or not at all.
        write_txn.commit().map_err(io_err)?;

        Ok(entry)
    }

    fn set_degree(
        &mut self,
        student: StudentId,
        new_count: u8,
        expected_version: Option<u64>,
    ) -> Result<StudentGraduationState, FaixaError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let updated = {
            let mut students_table = write_txn.open_table(STUDENTS).map_err(io_err)?;

            let current = {
                let bytes = students_table
                    .get(student.0)
                    .map_err(io_err)?
                    .ok_or(FaixaError::StudentNotFound(student))?;
                Self::read_state_bytes(bytes.value())?
            };
            check_version(expected_version, current.version)?;

            let updated = degree::set_degree(&current, new_count)?;
            let state_bytes = postcard::to_allocvec(&updated).map_err(ser_err)?;
            students_table
                .insert(student.0, state_bytes.as_slice())
                .map_err(io_err)?;

            updated
        };
        write_txn.commit().map_err(io_err)?;

        Ok(updated)
    }

    fn history(&self, student: StudentId) -> Result<Vec<GraduationHistoryEntry>, FaixaError> {
        // Surface StudentNotFound for unregistered ids.
        self.state(student)?;

        let read_txn = self.db.begin_read().map_err(io_err)?;
        let history_table = read_txn.open_table(HISTORY).map_err(io_err)?;

        let mut entries = Vec::new();
        for row in history_table
            .range((student.0, 0u64)..=(student.0, u64::MAX))
            .map_err(io_err)?
        {
            let (_, value) = row.map_err(io_err)?;
            entries.push(Self::read_entry_bytes(value.value())?);
        }
        Ok(entries)
    }

    fn record_attendance(
        &mut self,
        student: StudentId,
        date: NaiveDate,
        present: bool,
    ) -> Result<(), FaixaError> {
        self.state(student)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut attendance_table = write_txn.open_table(ATTENDANCE).map_err(io_err)?;
            attendance_table
                .insert((student.0, day_number(date)), present)
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        Ok(())
    }

    fn attendance_between(
        &self,
        student: StudentId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, FaixaError> {
        self.state(student)?;

        let read_txn = self.db.begin_read().map_err(io_err)?;
        let attendance_table = read_txn.open_table(ATTENDANCE).map_err(io_err)?;

        let mut records = Vec::new();
        for row in attendance_table
            .range((student.0, day_number(from))..=(student.0, day_number(to)))
            .map_err(io_err)?
        {
            let (key, value) = row.map_err(io_err)?;
            records.push(AttendanceRecord {
                date: date_from_day_number(key.value().1)?,
                present: value.value(),
            });
        }
        Ok(records)
    }
}

// =============================================================================
// TESTS
// =============================================================================
