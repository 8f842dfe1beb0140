//! # Configuration Module
//!
//! This module provides the engine configuration and backend preference.

pub mod config;
