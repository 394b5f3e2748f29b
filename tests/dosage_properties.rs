//! Property-based tests for dosage computation and record annotation
//!
//! Dosages stay within [0, 2], are written with two fraction digits, and
//! annotation keeps every original column and sample value intact.

use add_dosage::core::{sample_dosage, DegeneratePolicy, Dosage, GenotypeLikelihoods};
use add_dosage::{transform_stream, DosageConfig, VcfLayout, VcfRecordView};
use proptest::prelude::*;
use std::io::Cursor;

const HEADER: &str = "##fileformat=VCFv4.2\n\
    ##FORMAT=<ID=PL,Number=G,Type=Integer,Description=\"Phred-scaled likelihoods\">\n\
    #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT";

/// Generate a single-base allele
fn arb_base() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("A".to_string()),
        Just("C".to_string()),
        Just("G".to_string()),
        Just("T".to_string()),
    ]
}

/// Generate a realistic PL triple (one genotype at 0)
fn arb_pl() -> impl Strategy<Value = (u32, u32, u32)> {
    (0usize..3, 0u32..1000, 0u32..1000).prop_map(|(best, a, b)| match best {
        0 => (0, a, b),
        1 => (a, 0, b),
        _ => (a, b, 0),
    })
}

/// Generate a sample entry with GT and PL
fn arb_sample() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("0/0"), Just("0/1"), Just("1/1"), Just("./.")],
        arb_pl(),
    )
        .prop_map(|(gt, (p0, p1, p2))| format!("{}:{},{},{}", gt, p0, p1, p2))
}

/// Generate an SNP data line with 1-8 samples
fn arb_snp_line() -> impl Strategy<Value = (String, usize)> {
    (
        1u64..250_000_000,
        arb_base(),
        arb_base(),
        prop::collection::vec(arb_sample(), 1..8),
    )
        .prop_map(|(pos, ref_allele, alt_allele, samples)| {
            let n = samples.len();
            let line = format!(
                "chr1\t{}\t.\t{}\t{}\t50\tPASS\tDP=10\tGT:PL\t{}",
                pos,
                ref_allele,
                alt_allele,
                samples.join("\t")
            );
            (line, n)
        })
}

fn header_for(samples: usize) -> String {
    let mut header = HEADER.to_string();
    for i in 0..samples {
        header.push_str(&format!("\tS{}", i + 1));
    }
    header.push('\n');
    header
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Dosage of any finite PL triple lies in [0, 2]
    #[test]
    fn prop_dosage_in_range(p0 in 0.0f64..3000.0, p1 in 0.0f64..3000.0, p2 in 0.0f64..3000.0) {
        let gl = GenotypeLikelihoods::from_phred(p0, p1, p2);
        if let Some(dosage) = gl.dosage() {
            prop_assert!((0.0..=2.0 + 1e-12).contains(&dosage), "dosage {} out of range", dosage);
        }
    }

    /// Realistic PL triples never degenerate and print with two decimals
    #[test]
    fn prop_dosage_two_decimals((p0, p1, p2) in arb_pl()) {
        let entry = format!("{},{},{}", p0, p1, p2);
        let dosage = sample_dosage(entry.as_bytes(), 0, b':', b',', DegeneratePolicy::Fail).unwrap();
        prop_assert!(!dosage.is_missing());

        let text = dosage.to_string();
        let (whole, fraction) = text.split_once('.').unwrap();
        prop_assert_eq!(fraction.len(), 2);
        prop_assert!(whole == "0" || whole == "1" || whole == "2");
    }

    /// Swapping hom-ref and hom-alt mirrors the dosage around 1
    #[test]
    fn prop_dosage_symmetry((p0, p1, p2) in arb_pl()) {
        let forward = GenotypeLikelihoods::from_phred(p0 as f64, p1 as f64, p2 as f64);
        let mirrored = GenotypeLikelihoods::from_phred(p2 as f64, p1 as f64, p0 as f64);
        let sum = forward.dosage().unwrap() + mirrored.dosage().unwrap();
        prop_assert!((sum - 2.0).abs() < 1e-9);
    }

    /// Annotation keeps columns and appends one dosage per sample
    #[test]
    fn prop_annotation_preserves_samples((line, samples) in arb_snp_line()) {
        let input = format!("{}{}\n", header_for(samples), line);
        let (out, stats) = transform_stream(
            Cursor::new(input),
            Vec::new(),
            &DosageConfig::default(),
        ).unwrap();
        let output = String::from_utf8(out).unwrap();
        let annotated = output.lines().last().unwrap();

        let original = VcfRecordView::parse(line.as_bytes(), &VcfLayout::default(), 1).unwrap();
        let rewritten = VcfRecordView::parse(annotated.as_bytes(), &VcfLayout::default(), 1).unwrap();

        prop_assert_eq!(stats.annotated, 1);
        prop_assert_eq!(rewritten.field_count(), original.field_count());
        for i in 0..8 {
            prop_assert_eq!(rewritten.field(i), original.field(i));
        }
        prop_assert_eq!(rewritten.format(), &b"GT:PL:DS"[..]);

        for (before, after) in original.samples().zip(rewritten.samples()) {
            let suffix = std::str::from_utf8(after.strip_prefix(before).unwrap()).unwrap();
            prop_assert!(suffix.starts_with(':'));
            let value: f64 = suffix[1..].parse().unwrap();
            prop_assert!((0.0..=2.0).contains(&value));
            prop_assert_eq!(suffix[1..].split_once('.').unwrap().1.len(), 2);
        }
    }
}

/// Known values from hand calculation
#[test]
fn test_reference_dosages() {
    let cases = [
        ("0,0,0", "1.00"),
        ("0,100,100", "0.00"),
        ("100,100,0", "2.00"),
        ("60,0,60", "1.00"),
        ("0,60,60", "0.00"),
    ];
    for (pl, expected) in cases {
        let dosage = sample_dosage(pl.as_bytes(), 0, b':', b',', DegeneratePolicy::Fail).unwrap();
        assert_eq!(dosage.to_string(), expected, "PL {}", pl);
    }
}

/// Missing and degenerate values
#[test]
fn test_missing_and_degenerate() {
    assert_eq!(
        sample_dosage(b"./.:.", 1, b':', b',', DegeneratePolicy::Fail).unwrap(),
        Dosage::Missing
    );
    assert_eq!(
        sample_dosage(b"4000,4000,4000", 0, b':', b',', DegeneratePolicy::Missing).unwrap(),
        Dosage::Missing
    );
    assert!(sample_dosage(b"4000,4000,4000", 0, b':', b',', DegeneratePolicy::Fail).is_err());
}
