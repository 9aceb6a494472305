//! netperf result processing pipeline
//!
//! This crate turns raw `netperf` text logs into structured reports:
//! - The converter parses a directory of raw logs into a JSON array of
//!   run records (`result-convert`).
//! - The report generator flattens records into a fixed-schema CSV table
//!   (`netperf-test-report`).
//! - The benchmark comparator joins a baseline CSV against a test CSV and
//!   computes per-metric deltas (`netperf-benchmark-report`).
//!
//! The stages share no runtime state; each one reads files produced by the
//! previous stage and writes its own artifact.

pub mod compare;
pub mod config;
pub mod convert;
pub mod parser;
pub mod report;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classic netperf test types recognized by the log parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TestType {
    #[serde(rename = "TCP_STREAM")]
    TcpStream,
    #[serde(rename = "TCP_MAERTS")]
    TcpMaerts,
    #[serde(rename = "UDP_STREAM")]
    UdpStream,
    #[serde(rename = "TCP_RR")]
    TcpRr,
    #[serde(rename = "UDP_RR")]
    UdpRr,
}

impl TestType {
    /// Transfer direction implied by the test type. MAERTS is a STREAM
    /// test with the data flowing back to the local host.
    pub fn direction(&self) -> Direction {
        match self {
            TestType::TcpStream | TestType::UdpStream => Direction::Send,
            TestType::TcpMaerts => Direction::Recv,
            TestType::TcpRr | TestType::UdpRr => Direction::Bidir,
        }
    }

    /// Unit of the measured value as printed by netperf.
    pub fn unit(&self) -> &'static str {
        match self {
            TestType::TcpStream | TestType::TcpMaerts | TestType::UdpStream => "Mbits/s",
            TestType::TcpRr | TestType::UdpRr => "trans/s",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestType::TcpStream => "TCP_STREAM",
            TestType::TcpMaerts => "TCP_MAERTS",
            TestType::UdpStream => "UDP_STREAM",
            TestType::TcpRr => "TCP_RR",
            TestType::UdpRr => "UDP_RR",
        };
        f.write_str(name)
    }
}

/// Transfer direction of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Send,
    Recv,
    Bidir,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Send => "send",
            Direction::Recv => "recv",
            Direction::Bidir => "bidir",
        };
        f.write_str(name)
    }
}

/// One benchmark measurement parsed from a netperf log. Immutable once
/// created by the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub test_type: TestType,
    pub direction: Direction,
    /// Local socket buffer size in bytes.
    pub socket_size: u64,
    /// Message size in bytes (request size for RR tests).
    pub message_size: u64,
    pub elapsed_secs: f64,
    /// Measured throughput or transaction rate.
    pub value: f64,
    pub unit: String,
    /// Round number recovered from the log file name, if present.
    pub round: Option<u32>,
    /// File the record was parsed from.
    pub source: String,
}
