//! Property-based tests for transcripts
//!
//! Coding-region bookkeeping over randomly generated chains: genomic
//! bounds, UTR partitioning and re-derivation after segment edits.

use std::collections::BTreeSet;

use proptest::prelude::*;
use segchain::{GenomicSegment, SegmentChain, Strand, Transcript, ATTR_ID};

// ============================================================================
// Generators
// ============================================================================

/// Generate a valid chromosome name
fn arb_chrom_name() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..=22).prop_map(|n| format!("chr{}", n)),
        Just("chrX".to_string()),
    ]
}

/// Generate a strand, the unstranded case included
fn arb_strand() -> impl Strategy<Value = Strand> {
    prop_oneof![
        Just(Strand::Forward),
        Just(Strand::Reverse),
        Just(Strand::Unstranded),
    ]
}

/// Generate sorted spans separated by gaps, starting past position 1000
fn arb_spans() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((1u64..500, 1u64..200), 1..8).prop_map(|steps| {
        let mut spans = Vec::with_capacity(steps.len());
        let mut cursor = 1000u64;
        for (gap, len) in steps {
            let start = cursor + gap + 1;
            spans.push((start, start + len));
            cursor = start + len;
        }
        spans
    })
}

fn build_chain(chrom: &str, strand: Strand, spans: &[(u64, u64)]) -> SegmentChain {
    let segments: Vec<GenomicSegment> = spans
        .iter()
        .map(|&(start, end)| GenomicSegment::new(chrom, start, end, strand).unwrap())
        .collect();
    SegmentChain::from_segments(segments).unwrap()
}

/// Clamp two free draws into a non-empty window over `[0, span)`
fn cds_window(span: u64, a: u64, b: u64) -> (u64, u64) {
    let start = a % span;
    let end = start + 1 + b % (span - start);
    (start, end)
}

/// The genomic bounds a coding region must have, phrased without strand
fn expected_bounds(chain: &SegmentChain, start: u64, end: u64) -> (u64, u64) {
    let first = chain.chain_to_genomic(start, true).unwrap();
    let last = chain.chain_to_genomic(end - 1, true).unwrap();
    (first.min(last), first.max(last) + 1)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: genomic CDS bounds bracket exactly the annotated offsets
    #[test]
    fn test_cds_genome_bounds(
        chrom in arb_chrom_name(),
        strand in arb_strand(),
        spans in arb_spans(),
        a in 0u64..10000,
        b in 0u64..10000
    ) {
        let chain = build_chain(&chrom, strand, &spans);
        let (start, end) = cds_window(chain.span_length(), a, b);
        let (lo, hi) = expected_bounds(&chain, start, end);
        let transcript = Transcript::with_cds(chain, start, end).unwrap();
        prop_assert!(transcript.is_coding());
        prop_assert_eq!(transcript.cds_start(), Some(start));
        prop_assert_eq!(transcript.cds_end(), Some(end));
        prop_assert_eq!(transcript.cds_genome_start(), Some(lo));
        prop_assert_eq!(transcript.cds_genome_end(), Some(hi));
    }

    /// Property: UTRs and CDS partition the transcript's positions
    #[test]
    fn test_cds_utr_partition(
        chrom in arb_chrom_name(),
        strand in arb_strand(),
        spans in arb_spans(),
        a in 0u64..10000,
        b in 0u64..10000
    ) {
        let chain = build_chain(&chrom, strand, &spans);
        let (start, end) = cds_window(chain.span_length(), a, b);
        let transcript = Transcript::with_cds(chain.clone(), start, end).unwrap();

        let utr5 = transcript.utr5_chain().unwrap();
        let cds = transcript.cds_chain().unwrap();
        let utr3 = transcript.utr3_chain().unwrap();

        prop_assert_eq!(utr5.span_length(), start);
        prop_assert_eq!(cds.span_length(), end - start);
        prop_assert_eq!(utr3.span_length(), chain.span_length() - end);

        let mut union = BTreeSet::new();
        let mut total = 0usize;
        for part in [&utr5, &cds, &utr3] {
            let positions = part.position_set();
            total += positions.len();
            union.extend(positions);
        }
        // equal sizes plus equal union means the parts are disjoint
        prop_assert_eq!(total, union.len());
        prop_assert_eq!(union, chain.position_set());
    }

    /// Property: masks never disturb the coding annotation
    #[test]
    fn test_masks_leave_cds_alone(
        chrom in arb_chrom_name(),
        strand in arb_strand(),
        spans in arb_spans(),
        a in 0u64..10000,
        b in 0u64..10000
    ) {
        let chain = build_chain(&chrom, strand, &spans);
        let span = chain.span_length();
        let (start, end) = cds_window(span, a, b);
        let masks: Vec<GenomicSegment> =
            chain.subchain(start, end, true).unwrap().segments().to_vec();
        let mut transcript = Transcript::with_cds(chain, start, end).unwrap();
        let bounds = (transcript.cds_genome_start(), transcript.cds_genome_end());
        transcript.set_masks(masks).unwrap();
        prop_assert_eq!(transcript.length(), span - (end - start));
        prop_assert_eq!(transcript.cds_start(), Some(start));
        prop_assert_eq!(transcript.cds_end(), Some(end));
        prop_assert_eq!((transcript.cds_genome_start(), transcript.cds_genome_end()), bounds);
    }

    /// Property: extending the chain re-derives the genomic bounds from
    /// the unchanged chain offsets
    #[test]
    fn test_extension_rederives_bounds(
        chrom in arb_chrom_name(),
        strand in arb_strand(),
        spans in arb_spans(),
        a in 0u64..10000,
        b in 0u64..10000
    ) {
        let chain = build_chain(&chrom, strand, &spans);
        let (start, end) = cds_window(chain.span_length(), a, b);
        let mut transcript = Transcript::with_cds(chain, start, end).unwrap();
        // a fresh segment well left of every generated span
        let extra = GenomicSegment::new(&chrom, 100, 150, strand).unwrap();
        transcript.add_segments(vec![extra]).unwrap();
        prop_assert_eq!(transcript.cds_start(), Some(start));
        prop_assert_eq!(transcript.cds_end(), Some(end));
        let (lo, hi) = expected_bounds(transcript.chain(), start, end);
        prop_assert_eq!(transcript.cds_genome_start(), Some(lo));
        prop_assert_eq!(transcript.cds_genome_end(), Some(hi));
    }

    /// Property: invalid coding windows are rejected
    #[test]
    fn test_cds_validation(chrom in arb_chrom_name(), spans in arb_spans()) {
        let chain = build_chain(&chrom, Strand::Forward, &spans);
        let span = chain.span_length();
        let mut transcript = Transcript::new(chain);
        prop_assert!(transcript.set_cds(5, 5).is_err());
        prop_assert!(transcript.set_cds(span, span + 10).is_err());
        prop_assert!(transcript.set_cds(0, span + 1).is_err());
        prop_assert!(!transcript.is_coding());
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

fn demo_chain(strand: Strand) -> SegmentChain {
    build_chain("chr1", strand, &[(100, 110), (200, 215)])
}

#[test]
fn test_forward_transcript_layout() {
    let transcript = Transcript::with_cds(demo_chain(Strand::Forward), 5, 20).unwrap();
    assert_eq!(transcript.cds_genome_start(), Some(105));
    assert_eq!(transcript.cds_genome_end(), Some(210));
    let utr5 = transcript.utr5_chain().unwrap();
    let utr3 = transcript.utr3_chain().unwrap();
    assert_eq!(utr5.position_set(), (100..105).collect());
    assert_eq!(utr3.position_set(), (210..215).collect());
}

#[test]
fn test_reverse_transcript_layout() {
    let transcript = Transcript::with_cds(demo_chain(Strand::Reverse), 5, 20).unwrap();
    assert_eq!(transcript.cds_genome_start(), Some(105));
    assert_eq!(transcript.cds_genome_end(), Some(210));
    // on the reverse strand the 5' UTR sits at the genomic right edge
    let utr5 = transcript.utr5_chain().unwrap();
    assert_eq!(utr5.position_set(), (210..215).collect());
    let utr3 = transcript.utr3_chain().unwrap();
    assert_eq!(utr3.position_set(), (100..105).collect());
}

#[test]
fn test_noncoding_transcript() {
    let transcript = Transcript::new(demo_chain(Strand::Forward));
    assert!(!transcript.is_coding());
    assert_eq!(transcript.cds_start(), None);
    assert_eq!(transcript.cds_genome_start(), None);
    assert!(transcript.cds_chain().unwrap().is_empty());
    assert!(transcript.utr5_chain().unwrap().is_empty());
    assert!(transcript.utr3_chain().unwrap().is_empty());
}

#[test]
fn test_clear_cds() {
    let mut transcript = Transcript::with_cds(demo_chain(Strand::Forward), 5, 20).unwrap();
    transcript.clear_cds();
    assert!(!transcript.is_coding());
    assert_eq!(transcript.cds_genome_end(), None);
}

#[test]
fn test_chain_conversion_and_display() {
    let chain = demo_chain(Strand::Forward);
    let rendered = chain.to_string();
    let transcript = Transcript::from(chain);
    assert_eq!(transcript.to_string(), rendered);
    assert_eq!(transcript.into_chain().to_string(), rendered);
}

#[test]
fn test_attribute_delegation() {
    let mut transcript = Transcript::new(demo_chain(Strand::Forward));
    transcript.set_attribute(ATTR_ID, "YAL001C");
    assert_eq!(transcript.chain().name(), Some("YAL001C"));
}
