//! # Engine Module
//!
//! The stateful machinery behind a structure load.
//!
//! ## Overview
//!
//! A load resolves a source name to a byte stream, reads it line by line through the
//! record decoders in [`crate::core::io`], and hands the accumulated components to a
//! `StructureBuilder`. All parse-time state lives inside a single call; nothing
//! survives between loads, so one [`loader::PdbLoader`] may serve any number of
//! sequential or concurrent loads.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Loader settings and their validating builder
//! - **Progress Monitoring** ([`progress`]) - Progress events, the reporter and cancellation
//! - **Error Handling** ([`error`]) - The `LoadError` taxonomy
//! - **Sources** ([`source`]) - Name classification, local files, network fetches and gzip
//! - **Loading** ([`loader`]) - The PDB loader and its entry points

pub mod config;
pub mod error;
pub mod loader;
pub mod progress;
pub mod source;
