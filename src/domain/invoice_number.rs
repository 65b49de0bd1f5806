//! Human-facing invoice numbers: `INV-{year}-{sequence:06}`.

use std::fmt;

use crate::config::INVOICE_NUMBER_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvoiceNumber {
    year: i32,
    sequence: u32,
}

impl InvoiceNumber {
    /// `sequence` starts at 1 each calendar year.
    pub fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:06}", INVOICE_NUMBER_PREFIX, self.year, self.sequence)
    }
}
