//! Lazy k-subset enumeration.
//!
//! Subsets of `0..n` are produced as sorted index vectors in lexicographic
//! order, the same order as the classic `combinations(range(n), k)`:
//!
//! ```text
//! n = 4, k = 2:  [0,1] [0,2] [0,3] [1,2] [1,3] [2,3]
//! ```
//!
//! The attack and defense searches depend on this order for their
//! first-seen tie-break, so it must not change.

/// Iterator over the k-subsets of `0..n`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    /// `k = 0` yields a single empty subset; `k > n` yields nothing.
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }

    /// Rewind to the first subset.
    pub fn reset(&mut self) {
        *self = Self::new(self.n, self.k);
    }

    pub fn universe(&self) -> usize {
        self.n
    }

    pub fn subset_size(&self) -> usize {
        self.k
    }

    fn advance(&mut self) -> bool {
        let (n, k) = (self.n, self.k);
        // Rightmost index that can still move right
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] < n - k + i) else {
            return false;
        };
        self.indices[i] += 1;
        for j in (i + 1)..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        true
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
        } else if !self.advance() {
            self.done = true;
            return None;
        }
        Some(self.indices.clone())
    }
}

/// All subsets of sizes `1..=min(max_k, n)`, smaller sizes first.
pub fn combinations_up_to(n: usize, max_k: usize) -> impl Iterator<Item = Vec<usize>> {
    (1..=max_k.min(n)).flat_map(move |k| Combinations::new(n, k))
}

/// C(n, k), saturating at `u128::MAX`.
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) / (i + 1) stays integral at every step
        acc = match acc.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    acc
}

/// Σ_{s=1}^{min(k,n)} C(n, s): subsets visited by [`combinations_up_to`].
pub fn count_up_to(n: usize, max_k: usize) -> u128 {
    (1..=max_k.min(n)).fold(0u128, |acc, k| acc.saturating_add(binomial(n, k)))
}
