//! Unit tests for probe modules
//!
//! This module contains property tests that cut across the decoder and the
//! frame lookup. Tests are organized by module and functionality.
