//! Interactive binary search over the lines of the target file
//!
//! [`BisectState`] is a pure state machine: it names the lines to probe
//! next and advances one transition per user [`Response`]. [`Bisector`]
//! drives it against the filesystem and a [`FeedbackDialog`].
//!
//! Search rules:
//! - The first probe covers the whole file. "No visible change" there ends
//!   the search: the file was never shown to matter.
//! - Once a range is confirmed relevant, the lower half of it is probed.
//!   A visible change confirms that half; no visible change confirms the
//!   untried upper remainder instead. Either way the newly confirmed range
//!   is halved again.
//! - A single probed line answered with "visible change" is the result. A
//!   single line answered with "no visible change" and nothing left untried
//!   means the search failed.

use anyhow::Result;
use std::fmt;
use std::ops::RangeInclusive;

use crate::color_replacer::{self, ColorReplacer};
use crate::dialog::{DialogSession, FeedbackDialog};
use crate::interrupt;
use crate::report;
use crate::snapshot::Snapshot;

/// What the user saw after a replacement pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    NoVisibleChange,
    VisibleChange,
}

/// Zero-based inclusive line range currently replaced with the sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub first: usize,
    pub last: usize,
}

impl Probe {
    pub fn range(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }

    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn is_single_line(&self) -> bool {
        self.first == self.last
    }
}

impl fmt::Display for Probe {
    /// 1-based, the way editors number lines
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(f, "line {}", self.first + 1)
        } else {
            write!(f, "lines {}-{}", self.first + 1, self.last + 1)
        }
    }
}

/// Result of feeding one response to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep going with this probe
    Probe(Probe),
    /// Zero-based index of the line confirmed to matter
    Found(usize),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BisectState {
    first: usize,
    last: usize,
    /// Upper end of the confirmed range while its lower half is probed
    pending_upper: Option<usize>,
    /// Set once some range has been confirmed relevant
    probing: bool,
}

impl BisectState {
    /// Start a search over `total_lines` lines
    pub fn new(total_lines: usize) -> Result<Self> {
        if total_lines == 0 {
            anyhow::bail!("Nothing to search: the file has no lines");
        }
        Ok(Self {
            first: 0,
            last: total_lines - 1,
            pending_upper: None,
            probing: false,
        })
    }

    pub fn probe(&self) -> Probe {
        Probe {
            first: self.first,
            last: self.last,
        }
    }

    pub fn is_probing(&self) -> bool {
        self.probing
    }

    pub fn pending_upper(&self) -> Option<usize> {
        self.pending_upper
    }

    /// Advance on the user's answer to the current probe
    pub fn submit(&mut self, response: Response) -> Step {
        let step = match response {
            Response::VisibleChange if self.first == self.last => Step::Found(self.first),
            Response::VisibleChange => {
                *self = Self::probe_lower_half(self.first, self.last);
                Step::Probe(self.probe())
            }
            Response::NoVisibleChange => match self.pending_upper {
                Some(upper) if self.probing && upper > self.last => {
                    *self = Self::probe_lower_half(self.last + 1, upper);
                    Step::Probe(self.probe())
                }
                _ => Step::NotFound,
            },
        };

        tracing::debug!(?response, ?step, "bisect transition");
        step
    }

    /// Probe the lower half of the confirmed range `[first, last]`
    ///
    /// An odd-sized range puts the extra line in the upper remainder. A
    /// single confirmed line is probed on its own.
    fn probe_lower_half(first: usize, last: usize) -> Self {
        Self {
            first,
            last: lower_half_end(first, last),
            pending_upper: Some(last),
            probing: true,
        }
    }
}

/// Last index of the lower half of `[first, last]`, rounding down
pub fn lower_half_end(first: usize, last: usize) -> usize {
    first + ((last + 1 - first) / 2).max(1) - 1
}

/// How a finished search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found {
        /// Zero-based line index
        index: usize,
        /// Original text of the line, without its line ending
        content: String,
    },
    NotFound,
}

impl Outcome {
    /// 1-based line number of a found line
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Outcome::Found { index, .. } => Some(index + 1),
            Outcome::NotFound => None,
        }
    }
}

/// Runs the search against the target file of a [`Snapshot`]
pub struct Bisector<'a> {
    snapshot: &'a Snapshot,
    replacer: ColorReplacer,
    total_lines: usize,
}

impl<'a> Bisector<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Result<Self> {
        let original = snapshot.original_content()?;
        Ok(Self {
            snapshot,
            replacer: ColorReplacer::new()?,
            total_lines: color_replacer::count_lines(&original),
        })
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Probe, ask, and narrow until the state machine reaches a verdict
    ///
    /// The target is left holding the last probe; restoring it is the
    /// snapshot owner's job.
    pub fn run(
        &self,
        dialog: &mut dyn FeedbackDialog,
        session: &mut DialogSession,
    ) -> Result<Outcome> {
        let mut state = BisectState::new(self.total_lines)?;
        tracing::info!(total_lines = self.total_lines, "search started");

        loop {
            interrupt::check()?;

            let probe = state.probe();
            println!("{}", report::format_probe(&probe, self.total_lines));

            let replaced = self.replacer.apply(
                self.snapshot.backup_path(),
                self.snapshot.target_path(),
                probe.range(),
            )?;
            if replaced == 0 {
                tracing::warn!(%probe, "no color codes in probed lines");
            }

            let response = dialog.ask(&probe, session)?;
            tracing::info!(%probe, ?response, "user response");

            match state.submit(response) {
                Step::Probe(_) => continue,
                Step::Found(index) => {
                    let content = self.original_line(index)?;
                    return Ok(Outcome::Found { index, content });
                }
                Step::NotFound => return Ok(Outcome::NotFound),
            }
        }
    }

    fn original_line(&self, index: usize) -> Result<String> {
        let original = self.snapshot.original_content()?;
        let line = color_replacer::split_lines(&original)
            .get(index)
            .map(|line| String::from_utf8_lossy(line).trim_end_matches(['\r', '\n']).to_string())
            .unwrap_or_default();
        Ok(line)
    }
}
