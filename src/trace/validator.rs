use std::path::Path;

use crate::debug_flags;
use crate::emulator::Emulator;
use crate::error::{HaltError, TraceError, TraceMismatchError};
use crate::frame::FrameBuffer;
use crate::units::{CentralUnit, MemoryMap, PictureUnit};

use super::format_trace_line;

/// Outcome of a validation run that found no mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Golden lines that were compared and matched.
    pub lines_checked: usize,
    pub frames_run: u64,
    /// The halt that ended the run, if the program stopped before the golden log ran out.
    pub halt: Option<HaltError>,
    pub golden_exhausted: bool,
    /// Set when the frame budget ran out before the golden log or a halt ended
    /// the run. Such a report has not validated the whole log.
    pub budget_exhausted: bool,
}

impl ValidationReport {
    /// True when the run reached a definite end: the golden log was used up or
    /// the program halted.
    pub fn is_complete(&self) -> bool {
        self.golden_exhausted || self.halt.is_some()
    }
}

/// Compares the emulator's formatted trace against a golden log, line by line.
pub struct TraceValidator {
    golden: Vec<String>,
    max_frames: u64,
}

impl TraceValidator {
    pub fn new<I, S>(golden_lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let golden = golden_lines
            .into_iter()
            .map(|line| line.as_ref().trim_end().to_string())
            .collect();
        Self {
            golden,
            max_frames: debug_flags::max_validation_frames(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(text.lines()))
    }

    /// Upper bound on ticks, for programs that loop forever without retiring
    /// enough instructions to exhaust the golden log.
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn golden_len(&self) -> usize {
        self.golden.len()
    }

    /// Ticks `emulator` until it halts, the golden log is exhausted or the frame
    /// budget runs out. Fails on the first line that differs.
    pub fn run<C, P, M>(
        &self,
        emulator: &mut Emulator<C, P, M>,
        frame: &mut FrameBuffer,
    ) -> Result<ValidationReport, TraceMismatchError>
    where
        C: CentralUnit,
        P: PictureUnit,
        M: MemoryMap,
    {
        let mut report = ValidationReport {
            lines_checked: 0,
            frames_run: 0,
            halt: None,
            golden_exhausted: self.golden.is_empty(),
            budget_exhausted: false,
        };

        while !report.golden_exhausted && report.frames_run < self.max_frames {
            let (retired, halt) = match emulator.tick(frame) {
                Ok(retired) => (retired, None),
                Err(halted) => (halted.retired, Some(halted.error)),
            };
            report.frames_run += 1;

            for record in &retired {
                let Some(expected) = self.golden.get(report.lines_checked) else {
                    report.golden_exhausted = true;
                    break;
                };
                let actual = format_trace_line(record);
                if actual.as_str() != expected.as_str() {
                    log::warn!("trace diverged at line {}", report.lines_checked + 1);
                    return Err(TraceMismatchError {
                        index: report.lines_checked,
                        expected: expected.clone(),
                        actual: actual.into_string(),
                    });
                }
                report.lines_checked += 1;
            }
            if report.lines_checked == self.golden.len() {
                report.golden_exhausted = true;
            }

            if let Some(error) = halt {
                log::info!(
                    "program halted after {} matching lines: {}",
                    report.lines_checked,
                    error
                );
                report.halt = Some(error);
                break;
            }
        }

        if !report.is_complete() {
            report.budget_exhausted = true;
            log::warn!(
                "frame budget of {} ran out with {} golden lines unchecked",
                self.max_frames,
                self.golden.len() - report.lines_checked
            );
        }

        log::info!(
            "validated {}/{} golden lines over {} frames",
            report.lines_checked,
            self.golden.len(),
            report.frames_run
        );
        Ok(report)
    }
}
