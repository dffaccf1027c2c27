//! Candidate orderings for each form kind

/// `k`-element index combinations out of `0..n`, ascending within each
/// combination and lexicographic across them.
#[derive(Clone, Debug)]
pub struct Combinations {
	n: usize,
	next: Option<Vec<usize>>,
}

impl Combinations {
	pub fn new(n: usize, k: usize) -> Self {
		let next = (k <= n).then(|| (0..k).collect());
		Self { n, next }
	}
}

impl Iterator for Combinations {
	type Item = Vec<usize>;

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.next.take()?;
		let k = current.len();

		// rightmost slot that can still move right
		if let Some(i) = (0..k).rev().find(|&i| current[i] < self.n - k + i) {
			let mut following = current.clone();
			following[i] += 1;
			for j in i + 1..k {
				following[j] = following[j - 1] + 1;
			}
			self.next = Some(following);
		}

		Some(current)
	}
}

/// Every non-empty subset of `0..n`, smallest first
pub fn subsets(n: usize) -> impl Iterator<Item = Vec<usize>> {
	(1..=n).flat_map(move |k| Combinations::new(n, k))
}

/// Number of submissions needed, in the worst case, to reach a subset of `size` out of `n`
pub fn subsets_up_to(n: usize, size: usize) -> usize {
	(1..=size.min(n)).map(|k| binomial(n, k)).sum()
}

fn binomial(n: usize, k: usize) -> usize {
	(0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Per-row search position of a matrix form
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RowState {
	pub pointer: usize,
	pub locked: bool,
}

/// Coordinate-wise search over a `rows x cols` grid driven by per-row feedback.
///
/// Each unlocked row walks its columns left to right; a row locks once the
/// platform marks its current cell correct and is never touched again.
#[derive(Clone, Debug)]
pub struct MatrixSearch {
	rows: Vec<RowState>,
	cols: usize,
}

impl MatrixSearch {
	pub fn new(rows: usize, cols: usize) -> Self {
		Self {
			rows: vec![RowState::default(); rows],
			cols,
		}
	}

	/// `(row, column)` of every row still being searched, in row order
	pub fn pending(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.rows.iter().enumerate().filter(|(_, state)| !state.locked).map(|(row, state)| (row, state.pointer))
	}

	pub fn lock(&mut self, row: usize) {
		if let Some(state) = self.rows.get_mut(row) {
			state.locked = true;
		}
	}

	pub fn all_locked(&self) -> bool {
		self.rows.iter().all(|state| state.locked)
	}

	/// Move every unlocked row one column right.
	///
	/// Fails with the first row that has no column left; nothing moves in that case.
	pub fn advance(&mut self) -> Result<(), usize> {
		if let Some((row, _)) = self.pending().find(|&(_, col)| col + 1 >= self.cols) {
			return Err(row);
		}
		for state in self.rows.iter_mut().filter(|state| !state.locked) {
			state.pointer += 1;
		}
		Ok(())
	}

	/// Current column of every row
	pub fn selection(&self) -> Vec<usize> {
		self.rows.iter().map(|state| state.pointer).collect()
	}
}
