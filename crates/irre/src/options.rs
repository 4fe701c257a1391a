//! Analysis options.

/// Options for disassembly and lifting runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Number of parallel jobs (0 = auto-detect based on CPU count).
    pub jobs: usize,
    /// First address to analyze; defaults to the start of the image.
    pub start: Option<u32>,
    /// Maximum number of instruction slots to analyze.
    pub count: Option<usize>,
    /// Use the symbol table for labels and block starts.
    pub symbols: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            jobs: 0,
            start: None,
            count: None,
            symbols: true,
        }
    }
}

impl AnalysisOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of parallel jobs (0 = auto-detect).
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Restrict the sweep to `count` slots starting at `start`.
    #[must_use]
    pub const fn with_range(mut self, start: Option<u32>, count: Option<usize>) -> Self {
        self.start = start;
        self.count = count;
        self
    }

    #[must_use]
    pub const fn with_symbols(mut self, enabled: bool) -> Self {
        self.symbols = enabled;
        self
    }

    /// Worker threads to use.
    #[must_use]
    pub fn job_count(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get().max(1)
        } else {
            self.jobs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = AnalysisOptions::new()
            .with_jobs(3)
            .with_range(Some(0x10), Some(4))
            .with_symbols(false);
        assert_eq!(options.jobs, 3);
        assert_eq!(options.job_count(), 3);
        assert_eq!(options.start, Some(0x10));
        assert_eq!(options.count, Some(4));
        assert!(!options.symbols);
    }

    #[test]
    fn test_auto_jobs() {
        let options = AnalysisOptions::default();
        assert!(options.symbols);
        assert!(options.job_count() >= 1);
    }
}
