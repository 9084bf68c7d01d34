//! Core library for the `edgeprobe` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI
//! argument types, configuration parsing, the remote-call primitive for
//! database RPCs and edge functions, the probe suite, payload validation
//! and report generation. The primary user-facing interface is the
//! `edgeprobe` command-line application; library APIs may evolve as the
//! CLI grows.
pub mod args;
pub mod config;
pub mod error;
pub mod metrics;
pub mod remote;
pub mod report;
pub mod suite;
pub mod validation;

#[cfg(test)]
mod test_support;
