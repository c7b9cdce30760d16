//! Integration tests for Topic-Harvest
//!
//! These tests use wiremock to create mock HTTP servers and run whole
//! batches end-to-end.

mod batch_tests;
