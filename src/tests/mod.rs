//! Crate-level integration tests over the mock ledger

mod engine_pipeline_tests;
