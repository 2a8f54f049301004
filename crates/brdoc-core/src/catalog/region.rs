//! Table-region scanning.
//!
//! Payslip tables sit between a header line and a terminal line. Scanning is an
//! explicit state machine so duplicated tables on one page (a second header
//! before the terminal) cannot open a second region.

/// Where the scanner is relative to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    BeforeTable,
    InTable,
    AfterTable,
}

/// What a line turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// Opened the region.
    Header,
    /// Closed the region.
    Terminal,
    /// A candidate row inside the region.
    Row,
    /// Before or after the region.
    Outside,
}

/// One-shot table region tracker.
#[derive(Debug, Clone)]
pub struct TableRegion {
    state: RegionState,
}

impl TableRegion {
    pub fn new() -> Self {
        Self {
            state: RegionState::BeforeTable,
        }
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    /// Feed one line's triggers and get its role. `AfterTable` is absorbing.
    pub fn advance(&mut self, header_seen: bool, terminal_seen: bool) -> LineRole {
        match self.state {
            RegionState::BeforeTable if header_seen => {
                self.state = RegionState::InTable;
                LineRole::Header
            }
            RegionState::BeforeTable => LineRole::Outside,
            RegionState::InTable if terminal_seen || header_seen => {
                self.state = RegionState::AfterTable;
                LineRole::Terminal
            }
            RegionState::InTable => LineRole::Row,
            RegionState::AfterTable => LineRole::Outside,
        }
    }

    /// Run the machine over `lines`, returning the candidate rows.
    pub fn rows<'a, H, T>(lines: &[&'a str], is_header: H, is_terminal: T) -> Vec<&'a str>
    where
        H: Fn(&str) -> bool,
        T: Fn(&str) -> bool,
    {
        let mut region = Self::new();
        let mut rows = Vec::new();
        for &line in lines {
            if region.advance(is_header(line), is_terminal(line)) == LineRole::Row {
                rows.push(line);
            }
        }
        rows
    }
}

impl Default for TableRegion {
    fn default() -> Self {
        Self::new()
    }
}
