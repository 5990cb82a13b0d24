//! Test utilities for recording listener calls.
