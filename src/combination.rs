//! Lexicographic k-subsets of `{0, .., n-1}`.
//!
//! Two access paths over the same ordering: random access by rank
//! through the combinadic, and in-place stepping to the next subset.
//! Only index tuples are ever materialised.

/// Computes `n` choose `k` with the multiplicative formula.
///
/// Each partial product is itself a binomial coefficient, so the result is
/// exact whenever it fits in a `u64`. Wider values saturate.
pub fn choose(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 1..=k {
        acc = acc * u128::from(n - k + i) / u128::from(i);
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    acc as u64
}

/// Table of `C(a, b)` for `a <= max_n`, `b <= max_k`.
///
/// Built once and shared read-only by every lookup in the same family.
#[derive(Debug, Clone)]
pub struct BinomialTable {
    max_n: usize,
    max_k: usize,
    values: Vec<u64>,
}

impl BinomialTable {
    /// Fills the table for all `a <= max_n` and `b <= max_k`.
    pub fn new(max_n: usize, max_k: usize) -> Self {
        let mut values = Vec::with_capacity((max_n + 1) * (max_k + 1));
        for a in 0..=max_n {
            for b in 0..=max_k {
                values.push(choose(a as u64, b as u64));
            }
        }
        BinomialTable {
            max_n,
            max_k,
            values,
        }
    }

    /// Largest `n` the table covers.
    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Largest `k` the table covers.
    pub fn max_k(&self) -> usize {
        self.max_k
    }

    /// Returns `C(n, k)`.
    #[inline]
    pub fn get(&self, n: usize, k: usize) -> u64 {
        debug_assert!(n <= self.max_n && k <= self.max_k, "C({}, {}) not cached", n, k);
        self.values[n * (self.max_k + 1) + k]
    }
}

/// Random access to the `C(n, k)` lexicographic k-subsets of `n` items.
#[derive(Debug, Clone, Copy)]
pub struct RandomAccessCombinations<'a> {
    table: &'a BinomialTable,
    n: usize,
    k: usize,
    count: u64,
}

impl<'a> RandomAccessCombinations<'a> {
    /// Panics if the table does not cover `(n, k)` or `k > n`.
    pub fn new(table: &'a BinomialTable, n: usize, k: usize) -> Self {
        assert!(k <= n, "cannot choose {} of {}", k, n);
        assert!(
            n <= table.max_n() && k <= table.max_k(),
            "binomial table too small for C({}, {})",
            n,
            k
        );
        RandomAccessCombinations {
            table,
            n,
            k,
            count: table.get(n, k),
        }
    }

    /// Number of subsets in the family.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Writes the subset of rank `m` into `out`, ascending.
    ///
    /// Ranks the dual `C(n,k) - 1 - m` as a combinadic
    /// `C(a_1, k) + C(a_2, k-1) + .. + C(a_k, 1)` with `a_1 > a_2 > ..`,
    /// finding each `a_i` by binary search in the cached table; element `i`
    /// is then `n - 1 - a_i`.
    pub fn nth_into(&self, m: u64, out: &mut [usize]) {
        assert!(m < self.count, "rank {} out of range {}", m, self.count);
        assert_eq!(out.len(), self.k);
        let mut remain = self.count - 1 - m;
        // Exclusive upper bound for the next a_i.
        let mut bound = self.n;
        for (i, slot) in out.iter_mut().enumerate() {
            let kk = self.k - i;
            // C(a, kk) is nondecreasing in a; find the largest a < bound
            // with C(a, kk) <= remain. a = kk - 1 always qualifies (C = 0).
            let mut lo = kk - 1;
            let mut hi = bound - 1;
            while lo < hi {
                let mid = lo + (hi - lo + 1) / 2;
                if self.table.get(mid, kk) <= remain {
                    lo = mid;
                } else {
                    hi = mid - 1;
                }
            }
            remain -= self.table.get(lo, kk);
            *slot = self.n - 1 - lo;
            bound = lo;
        }
        debug_assert_eq!(remain, 0);
    }

    /// The subset of rank `m`.
    pub fn nth(&self, m: u64) -> Vec<usize> {
        let mut out = vec![0; self.k];
        self.nth_into(m, &mut out);
        out
    }
}

/// Steps through k-subsets in lexicographic order in place.
///
/// Each step touches only the tail that changes, so a full sweep costs
/// amortised O(1) per subset and never more than O(k).
#[derive(Debug, Clone)]
pub struct CombinationStepper {
    n: usize,
    k: usize,
    current: Vec<usize>,
    rank: u64,
    started: bool,
    done: bool,
}

impl CombinationStepper {
    /// Starts before the first subset `{0, .., k-1}`.
    pub fn new(n: usize, k: usize) -> Self {
        CombinationStepper {
            n,
            k,
            current: (0..k).collect(),
            rank: 0,
            started: false,
            done: k > n,
        }
    }

    /// Starts before the subset of rank `m`.
    pub fn starting_at(access: &RandomAccessCombinations<'_>, m: u64) -> Self {
        let mut stepper = CombinationStepper::new(access.n, access.k);
        if m >= access.count() {
            stepper.done = true;
        } else {
            access.nth_into(m, &mut stepper.current);
            stepper.rank = m;
        }
        stepper
    }

    /// Moves to the next subset. Returns false once exhausted.
    pub fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        if !self.started {
            self.started = true;
            return true;
        }
        let (n, k) = (self.n, self.k);
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.current[i] < n - k + i {
                self.current[i] += 1;
                for j in i + 1..k {
                    self.current[j] = self.current[j - 1] + 1;
                }
                self.rank += 1;
                return true;
            }
        }
        self.done = true;
        false
    }

    /// The subset reached by the last successful [`advance`](Self::advance).
    pub fn current(&self) -> &[usize] {
        &self.current
    }

    /// Lexicographic rank of the current subset.
    pub fn rank(&self) -> u64 {
        self.rank
    }
}

/// Calls `f` with every k-subset of `n` items in lexicographic order.
pub fn for_each_combination<F>(n: usize, k: usize, mut f: F)
where
    F: FnMut(&[usize]),
{
    let mut stepper = CombinationStepper::new(n, k);
    while stepper.advance() {
        f(stepper.current());
    }
}
