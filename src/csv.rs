//! Naive CSV Tokenizer
//!
//! Splits a header line and data lines on commas and zips them into
//! column -> value maps. No quoting, escaping or embedded commas.

use std::collections::HashMap;

use crate::error::{PriceError, Result};

// == Naive CSV Tokenizer ==
#[derive(Debug, Clone)]
pub struct NaiveCsvTokenizer {
    headers: Vec<String>,
}

impl NaiveCsvTokenizer {
    // == Constructor ==
    /// Creates a tokenizer for rows laid out like `header_line`.
    pub fn new(header_line: &str) -> Self {
        Self {
            headers: split(header_line),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    // == Tokenize ==
    /// Maps each header to the value in the same position of `line`.
    ///
    /// # Errors
    /// `Csv` if `line` has a different number of fields than the header.
    pub fn tokenize(&self, line: &str) -> Result<HashMap<String, String>> {
        let fields = split(line);

        if fields.len() != self.headers.len() {
            return Err(PriceError::Csv(format!(
                "headers/input length mismatch: expected {} fields, found {}",
                self.headers.len(),
                fields.len()
            )));
        }

        Ok(self.headers.iter().cloned().zip(fields).collect())
    }
}

fn split(line: &str) -> Vec<String> {
    line.trim_end_matches(['\r', '\n'])
        .split(',')
        .map(|field| field.trim().to_string())
        .collect()
}
