//! Directory walking and scan coordination
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    ScanCoordinator                       │
//! │  walk → sort → register file rows → fan out scan tasks   │
//! └───────────┬───────────────────────────────┬──────────────┘
//!             │                               │
//!             ▼                               ▼
//! ┌───────────────────────┐      ┌───────────────────────────┐
//! │       walk()          │      │     per-file task          │
//! │  recursive read_dir   │      │  gated read → XML parse    │
//! │  extension filter     │      │  → extractors → tables     │
//! └───────────────────────┘      └─────────────┬─────────────┘
//!                                              │
//!                                              ▼
//!                                ┌───────────────────────────┐
//!                                │   AdmissionController     │
//!                                │  ≤ N concurrent reads     │
//!                                └───────────────────────────┘
//! ```

pub mod coordinator;
pub mod walk;

pub use coordinator::{ScanCoordinator, ScanOutcome, ScanReport};
pub use walk::walk;
