// medseg-data/src/indexing/table.rs

use medseg_core::{MedsegError, PatchSlice};

/// Per-case patch tables flattened into one global index space.
///
/// Global index `i` belongs to the first case whose cumulative patch count
/// exceeds `i`; cases without patches are skipped naturally.
#[derive(Debug, Clone, Default)]
pub struct PatchTable {
    slices: Vec<Vec<PatchSlice>>,
    cumulative: Vec<usize>,
}

impl PatchTable {
    pub fn new(slices: Vec<Vec<PatchSlice>>) -> Self {
        let cumulative = slices
            .iter()
            .scan(0usize, |total, case| {
                *total += case.len();
                Some(*total)
            })
            .collect();
        PatchTable { slices, cumulative }
    }

    /// Total number of patches over all cases.
    pub fn len(&self) -> usize {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_cases(&self) -> usize {
        self.slices.len()
    }

    /// Running patch counts, one entry per case.
    pub fn cumulative_counts(&self) -> &[usize] {
        &self.cumulative
    }

    pub fn case_slices(&self, case: usize) -> Option<&[PatchSlice]> {
        self.slices.get(case).map(|s| s.as_slice())
    }

    /// `(case, local patch)` owning global `index`.
    pub fn locate(&self, index: usize) -> Result<(usize, usize), MedsegError> {
        if index >= self.len() {
            return Err(MedsegError::IndexOutOfBounds {
                index: vec![index],
                shape: vec![self.len()],
            });
        }
        let case = self.cumulative.partition_point(|&count| count <= index);
        let start = if case == 0 { 0 } else { self.cumulative[case - 1] };
        Ok((case, index - start))
    }

    /// Case index and patch slice of global `index`.
    pub fn get(&self, index: usize) -> Result<(usize, &PatchSlice), MedsegError> {
        let (case, local) = self.locate(index)?;
        Ok((case, &self.slices[case][local]))
    }
}
