//! Common test utilities for integration tests.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;

use rhai::Dynamic;
use scriptkit::UtilEngine;

/// Evaluate a script with default settings, panicking with the script error.
pub fn eval(script: &str) -> Dynamic {
    match UtilEngine::default().eval(script) {
        Ok(value) => value,
        Err(e) => panic!("script failed: {e:#}\n---\n{script}"),
    }
}

/// Evaluate a script that is expected to fail, returning the error text.
pub fn eval_err(script: &str) -> String {
    match UtilEngine::default().eval(script) {
        Ok(value) => panic!("script should have failed, returned {value}\n---\n{script}"),
        Err(e) => format!("{e:#}"),
    }
}
