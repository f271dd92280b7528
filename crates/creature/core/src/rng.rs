//! Deterministic random streams.
//!
//! Every random decision the AI makes draws from the substantive stream, in a
//! fixed order, so a seed plus the same inputs replays the same game. The
//! cosmetic stream exists for presentation-only rolls and must never influence
//! creature behaviour.

/// PCG-XSH-RR generator with an internal cursor and a draw counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RngStream {
    state: u64,
    draws: u64,
}

impl RngStream {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn seeded(seed: u64) -> Self {
        let mut stream = Self {
            state: 0,
            draws: 0,
        };
        stream.state = Self::step(seed.wrapping_add(Self::INCREMENT));
        stream
    }

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::step(old);
        self.draws += 1;
        Self::output(old)
    }

    /// Uniform value in `[lower, upper]`. Does not draw when the range is a single value.
    pub fn range(&mut self, lower: i32, upper: i32) -> i32 {
        if upper <= lower {
            return lower;
        }
        let span = (upper as i64 - lower as i64 + 1) as u64;
        let roll = self.next_u32() as u64 % span;
        (lower as i64 + roll as i64) as i32
    }

    /// True with probability `percent` out of 100. Always draws exactly once.
    pub fn percent(&mut self, percent: i32) -> bool {
        self.range(0, 99) < percent.clamp(0, 100)
    }

    /// True with probability `1 / (upper + 1)`.
    pub fn one_in(&mut self, upper: i32) -> bool {
        self.range(0, upper) == 0
    }

    /// Swap-with-random-index shuffle. Draws once per element of a slice of two
    /// or more; shorter slices draw nothing.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        let len = items.len() as i32;
        for i in 0..items.len() {
            let j = self.range(0, len - 1) as usize;
            items.swap(i, j);
        }
    }

    /// Number of values drawn since seeding.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Internal cursor, folded into state digests.
    pub fn cursor(&self) -> u64 {
        self.state
    }
}

/// The pair of streams a simulation owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rngs {
    pub substantive: RngStream,
    pub cosmetic: RngStream,
}

impl Rngs {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            substantive: RngStream::seeded(derive_stream_seed(seed, 0)),
            cosmetic: RngStream::seeded(derive_stream_seed(seed, 1)),
        }
    }
}

/// Mixes a base seed with a stream index so sibling streams never overlap.
pub fn derive_stream_seed(seed: u64, stream: u32) -> u64 {
    let mut hash = seed;
    hash ^= (stream as u64).wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;
    hash
}
