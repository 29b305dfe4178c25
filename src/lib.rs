//! jrxml-scanner - Report Definition Tree Scanner
//!
//! A tool for scanning a directory tree of JasperReports report
//! definitions and extracting a normalized relational dataset - the
//! parameters, fields, variables, query strings, and embedded sub-report
//! references of every document - as CSV tables for downstream analysis.
//!
//! # Features
//!
//! - **Bounded Concurrency**: An admission controller caps concurrently
//!   open file reads (default 100), so trees with many thousands of
//!   reports never exhaust process file handles.
//!
//! - **Recursive Sub-report Discovery**: Sub-report references are found
//!   at any nesting depth; display names and print-when conditions are
//!   inherited from the nearest enclosing container, with conflicts
//!   logged rather than silently overwritten.
//!
//! - **Relational Output**: Append-only in-memory tables with dense
//!   surrogate keys and foreign-key linkage, exported one CSV per table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Report Directory                          │
//! │                     (*.jrxml, recursive)                        │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ walk
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       ScanCoordinator                           │
//! │   ┌────────────────────────────────────────────────────────┐    │
//! │   │                AdmissionController                     │    │
//! │   │        ≤ N concurrent reads, FIFO queueing             │    │
//! │   └────────────────┬───────────────────────────────────────┘    │
//! │                    │ file content                               │
//! │                    ▼                                            │
//! │   ┌──────────────────────────┐   ┌──────────────────────────┐   │
//! │   │    Flat extractors       │   │  Sub-report engine       │   │
//! │   │  parameters / fields /   │   │  recursive descent,      │   │
//! │   │  variables / query       │   │  ancestor context,       │   │
//! │   │                          │   │  depth-1 batching        │   │
//! │   └────────────┬─────────────┘   └────────────┬─────────────┘   │
//! │                └──────────────┬───────────────┘                 │
//! │                               ▼                                 │
//! │                 ┌──────────────────────────┐                    │
//! │                 │     Tables (in-memory)   │                    │
//! │                 └──────────────────────────┘                    │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ export
//!                               ▼
//!                    ┌──────────────────┐
//!                    │   CSV per table  │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Scan a report tree into ./report-tables
//! jrxml-scanner ./Reports
//!
//! # Deterministic ids, custom output directory
//! jrxml-scanner ./Reports -o ./tables --stable-ids
//!
//! # Only the sub-report tables, lower read ceiling
//! jrxml-scanner ./Reports --tables subreports,parameters --max-reads 50
//! ```

pub mod admission;
pub mod config;
pub mod error;
pub mod extract;
pub mod progress;
pub mod tables;
pub mod walker;

pub use admission::AdmissionController;
pub use config::{CliArgs, ScanConfig};
pub use error::{Result, ScanError};
pub use tables::{TableKind, Tables};
pub use walker::{ScanCoordinator, ScanOutcome, ScanReport};
