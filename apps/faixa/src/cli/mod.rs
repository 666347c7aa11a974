//! # Faixa CLI Module
//!
//! This module implements the CLI interface for Faixa.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `register` - Register a student into a program
//! - `status` - Show one student's state, or all
//! - `attend` - Record a scheduled class
//! - `evaluate` - Evaluate promotion eligibility
//! - `promote` - Record an approved promotion
//! - `degree` - Set the degree count within the current belt
//! - `history` - Show a student's promotion log

mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use faixa_core::FaixaError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Faixa - Academy Graduation Server
///
/// A deterministic belt-graduation rules engine. Eligibility is advisory;
/// promotions record a human approval.
#[derive(Parser, Debug)]
#[command(name = "faixa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the academy database
    #[arg(short = 'D', long, global = true, default_value = "faixa.db")]
    pub database: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Register a student into a program
    Register {
        /// Student ID
        #[arg(short, long)]
        student: u64,

        /// Program (adult, children, juvenile, master)
        #[arg(short, long, default_value = "adult")]
        program: String,

        /// Enrollment date (YYYY-MM-DD)
        #[arg(short, long)]
        enrolled: NaiveDate,
    },

    /// Show one student's graduation state, or all students
    Status {
        /// Student ID (omit to list all students)
        #[arg(short, long)]
        student: Option<u64>,
    },

    /// Record a scheduled class for a student
    Attend {
        /// Student ID
        #[arg(short, long)]
        student: u64,

        /// Class date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Mark the student absent instead of present
        #[arg(short, long)]
        absent: bool,
    },

    /// Evaluate promotion eligibility
    Evaluate {
        /// Student ID
        #[arg(short, long)]
        student: u64,

        /// Evaluation date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        on: Option<NaiveDate>,
    },

    /// Record an approved promotion
    Promote {
        /// Student ID
        #[arg(short, long)]
        student: u64,

        /// Target rank (must be the direct successor of the current belt)
        #[arg(short, long)]
        target: String,

        /// Promotion date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        on: Option<NaiveDate>,

        /// Approving evaluator
        #[arg(short, long)]
        evaluator: String,

        /// Free-text approval notes
        #[arg(short, long, default_value = "")]
        notes: String,

        /// Expected state version (fail on concurrent modification)
        #[arg(long)]
        expected_version: Option<u64>,
    },

    /// Set the degree count within the current belt
    Degree {
        /// Student ID
        #[arg(short, long)]
        student: u64,

        /// New degree count
        #[arg(short, long)]
        count: u8,

        /// Expected state version (fail on concurrent modification)
        #[arg(long)]
        expected_version: Option<u64>,
    },

    /// Show a student's promotion log
    History {
        /// Student ID
        #[arg(short, long)]
        student: u64,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), FaixaError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&cli.database, &host, port).await,
        Some(Commands::Init { force }) => cmd_init(&cli.database, force),
        Some(Commands::Register {
            student,
            program,
            enrolled,
        }) => cmd_register(&cli.database, json_mode, student, &program, enrolled),
        Some(Commands::Status { student }) => cmd_status(&cli.database, json_mode, student),
        Some(Commands::Attend {
            student,
            date,
            absent,
        }) => cmd_attend(&cli.database, json_mode, student, date, !absent),
        Some(Commands::Evaluate { student, on }) => {
            cmd_evaluate(&cli.database, json_mode, student, on)
        }
        Some(Commands::Promote {
            student,
            target,
            on,
            evaluator,
            notes,
            expected_version,
        }) => cmd_promote(
            &cli.database,
            json_mode,
            student,
            &target,
            on,
            &evaluator,
            &notes,
            expected_version,
        ),
        Some(Commands::Degree {
            student,
            count,
            expected_version,
        }) => cmd_degree(&cli.database, json_mode, student, count, expected_version),
        Some(Commands::History { student }) => cmd_history(&cli.database, json_mode, student),
        None => {
            // No subcommand - list all students by default
            cmd_status(&cli.database, json_mode, None)
        }
    }
}
