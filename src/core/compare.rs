// compare.rs - Pairwise comparison of aligned sequences

use std::fmt;
use std::str::FromStr;

use crate::core::stats::ComparisonStat;
use crate::data::block::GAP;
use crate::error::{MafError, Result};

/// Strategy used to scan two aligned sequences.
///
/// All kernels produce identical statistics; they differ only in how many
/// columns are examined per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonKernel {
    /// One column at a time
    Scalar,
    /// Eight columns per step using 64-bit lane masks (portable)
    Chunked,
    /// 32 columns per step with AVX2 byte compares (x86_64 only)
    Avx2,
}

impl ComparisonKernel {
    /// Fastest kernel the running CPU supports
    pub fn detect() -> Self {
        if avx2_available() {
            ComparisonKernel::Avx2
        } else {
            ComparisonKernel::Chunked
        }
    }

    pub fn is_supported(&self) -> bool {
        match self {
            ComparisonKernel::Avx2 => avx2_available(),
            _ => true,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ComparisonKernel::Scalar => "scalar (1 column/step)",
            ComparisonKernel::Chunked => "chunked (8 columns/step)",
            ComparisonKernel::Avx2 => "AVX2 (32 columns/step)",
        }
    }

    /// Compare two aligned sequences of equal length
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Result<ComparisonStat> {
        if a.len() != b.len() {
            return Err(MafError::UnequalSequences(a.len(), b.len()));
        }
        Ok(match self {
            ComparisonKernel::Scalar => compare_scalar(a, b),
            ComparisonKernel::Chunked => compare_chunked(a, b),
            ComparisonKernel::Avx2 => compare_avx2(a, b),
        })
    }
}

impl FromStr for ComparisonKernel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ComparisonKernel::detect()),
            "scalar" => Ok(ComparisonKernel::Scalar),
            "chunked" | "swar" => Ok(ComparisonKernel::Chunked),
            "avx2" => Ok(ComparisonKernel::Avx2),
            _ => Err(format!(
                "Invalid kernel: {}. Use: auto, scalar, chunked, avx2",
                s
            )),
        }
    }
}

impl fmt::Display for ComparisonKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComparisonKernel::Scalar => "scalar",
            ComparisonKernel::Chunked => "chunked",
            ComparisonKernel::Avx2 => "avx2",
        };
        write!(f, "{}", name)
    }
}

/// Compare with the best kernel for this CPU
pub fn compare(a: &[u8], b: &[u8]) -> Result<ComparisonStat> {
    ComparisonKernel::detect().compare(a, b)
}

/// Reference scan: a column counts when neither side is a gap
pub fn compare_scalar(a: &[u8], b: &[u8]) -> ComparisonStat {
    let mut compared = 0u64;
    let mut mismatches = 0u64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        if x == GAP || y == GAP {
            continue;
        }
        compared += 1;
        if x != y {
            mismatches += 1;
        }
    }
    ComparisonStat::new(compared, mismatches)
}

const LANE: usize = 8;
const LOW_BITS: u64 = 0x7f7f_7f7f_7f7f_7f7f;
const HIGH_BITS: u64 = 0x8080_8080_8080_8080;
const GAP_LANES: u64 = u64::from_ne_bytes([GAP; LANE]);

/// High bit of every byte set where that byte of `x` is non-zero (exact, no carries)
#[inline]
fn nonzero_bytes(x: u64) -> u64 {
    (((x & LOW_BITS) + LOW_BITS) | x) & HIGH_BITS
}

/// Eight columns per step: equality and gap masks folded with popcounts
pub fn compare_chunked(a: &[u8], b: &[u8]) -> ComparisonStat {
    let mut compared = 0u64;
    let mut mismatches = 0u64;

    let mut chunks_a = a.chunks_exact(LANE);
    let mut chunks_b = b.chunks_exact(LANE);
    for (ca, cb) in chunks_a.by_ref().zip(chunks_b.by_ref()) {
        let wa = u64::from_ne_bytes(ca.try_into().unwrap_or([0; LANE]));
        let wb = u64::from_ne_bytes(cb.try_into().unwrap_or([0; LANE]));

        let differ = nonzero_bytes(wa ^ wb);
        let gap = !nonzero_bytes(wa ^ GAP_LANES) & HIGH_BITS
            | !nonzero_bytes(wb ^ GAP_LANES) & HIGH_BITS;

        mismatches += (differ & !gap).count_ones() as u64;
        compared += (LANE as u32 - gap.count_ones()) as u64;
    }

    compare_scalar(chunks_a.remainder(), chunks_b.remainder())
        .combine(ComparisonStat::new(compared, mismatches))
}

#[cfg(target_arch = "x86_64")]
fn avx2_available() -> bool {
    std::arch::is_x86_feature_detected!("avx2")
}

#[cfg(not(target_arch = "x86_64"))]
fn avx2_available() -> bool {
    false
}

/// 32 columns per step; falls back to the chunked kernel without AVX2
pub fn compare_avx2(a: &[u8], b: &[u8]) -> ComparisonStat {
    #[cfg(target_arch = "x86_64")]
    {
        if avx2_available() {
            // SAFETY: AVX2 support was checked at runtime just above.
            return unsafe { compare_avx2_unchecked(a, b) };
        }
    }
    compare_chunked(a, b)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn compare_avx2_unchecked(a: &[u8], b: &[u8]) -> ComparisonStat {
    use std::arch::x86_64::*;

    const WIDTH: usize = 32;
    let len = a.len().min(b.len());
    let chunked = len - len % WIDTH;

    let all_gap = _mm256_set1_epi8(GAP as i8);
    let mut compared = 0u64;
    let mut mismatches = 0u64;

    let mut i = 0;
    while i < chunked {
        let va = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
        let vb = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);

        let equal = _mm256_movemask_epi8(_mm256_cmpeq_epi8(va, vb)) as u32;
        let gap_a = _mm256_movemask_epi8(_mm256_cmpeq_epi8(va, all_gap)) as u32;
        let gap_b = _mm256_movemask_epi8(_mm256_cmpeq_epi8(vb, all_gap)) as u32;
        let gap = gap_a | gap_b;

        mismatches += (!equal & !gap).count_ones() as u64;
        compared += (WIDTH as u32 - gap.count_ones()) as u64;
        i += WIDTH;
    }

    compare_chunked(&a[chunked..len], &b[chunked..len])
        .combine(ComparisonStat::new(compared, mismatches))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KERNELS: [ComparisonKernel; 3] = [
        ComparisonKernel::Scalar,
        ComparisonKernel::Chunked,
        ComparisonKernel::Avx2,
    ];

    /// Deterministic pseudo-random alignment rows over ACGT plus gaps
    fn sequence(len: usize, seed: u64) -> Vec<u8> {
        let alphabet = b"ACGT-acgtN";
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                alphabet[((state >> 33) % alphabet.len() as u64) as usize]
            })
            .collect()
    }

    #[test]
    fn test_examples() {
        for kernel in KERNELS {
            assert_eq!(
                kernel.compare(b"ACGT", b"ACGA").unwrap(),
                ComparisonStat::new(4, 1)
            );
            assert_eq!(
                kernel.compare(b"AC-T", b"ACG-").unwrap(),
                ComparisonStat::new(2, 0)
            );
            assert_eq!(
                kernel.compare(b"----", b"ACGT").unwrap(),
                ComparisonStat::new(0, 0)
            );
        }
    }

    #[test]
    fn test_case_sensitive() {
        for kernel in KERNELS {
            assert_eq!(kernel.compare(b"acgt", b"ACGT").unwrap(), ComparisonStat::new(4, 4));
        }
    }

    #[test]
    fn test_kernels_agree_on_all_lengths() {
        for len in 0..200 {
            let a = sequence(len, len as u64);
            let b = sequence(len, len as u64 + 1000);
            let expected = compare_scalar(&a, &b);
            assert_eq!(compare_chunked(&a, &b), expected, "chunked, len {}", len);
            assert_eq!(compare_avx2(&a, &b), expected, "avx2, len {}", len);
        }
    }

    #[test]
    fn test_high_bytes_do_not_confuse_masks() {
        // 0x80 | '-' and 0xAD must not be mistaken for gaps
        let a = vec![0xAD, 0x2D, 0x80, 0xFF, b'A', 0x00, 0x7F, 0xAD, 0x2D];
        let b = vec![0x2D, 0xAD, 0x00, 0xFF, b'A', 0x80, 0x7F, 0xAD, b'C'];
        let expected = compare_scalar(&a, &b);
        assert_eq!(compare_chunked(&a, &b), expected);
        assert_eq!(compare_avx2(&a, &b), expected);
    }

    #[test]
    fn test_gap_insertion_never_adds_counts() {
        let a = sequence(97, 7);
        let b = sequence(97, 8);
        let base = compare_scalar(&a, &b);
        for pos in 0..a.len() {
            let mut gapped = a.clone();
            gapped[pos] = GAP;
            for kernel in KERNELS {
                let stat = kernel.compare(&gapped, &b).unwrap();
                assert!(stat.compared <= base.compared);
                let column = compare_scalar(&a[pos..pos + 1], &b[pos..pos + 1]);
                assert_eq!(stat.compared + column.compared, base.compared);
                assert_eq!(stat.mismatches + column.mismatches, base.mismatches);
            }
        }
    }

    #[test]
    fn test_unequal_lengths_rejected() {
        for kernel in KERNELS {
            assert!(matches!(
                kernel.compare(b"ACG", b"AC"),
                Err(MafError::UnequalSequences(3, 2))
            ));
        }
    }

    #[test]
    fn test_kernel_parsing() {
        assert_eq!("scalar".parse::<ComparisonKernel>().unwrap(), ComparisonKernel::Scalar);
        assert_eq!("Chunked".parse::<ComparisonKernel>().unwrap(), ComparisonKernel::Chunked);
        assert!("auto".parse::<ComparisonKernel>().unwrap().is_supported());
        assert!("sse9".parse::<ComparisonKernel>().is_err());
        assert_eq!(ComparisonKernel::Chunked.to_string(), "chunked");
    }
}
