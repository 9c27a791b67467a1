//! Integration tests for packsync
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! None of them needs network access or a `git` binary.
