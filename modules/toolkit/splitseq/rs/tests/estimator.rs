use std::sync::Arc;

use eyre::{eyre, Result};

use splitseq_core_rs::loc::{Interval, Strand};
use splitseq_core_rs::seq::reverse_complement;
use splitseq_io_rs::bam::Alignment;
use splitseq_rs::accessor::memory::Exons;
use splitseq_rs::accessor::ReadAccessor;
use splitseq_rs::{Config, EvidenceClass, FusionEstimator, RegionPair};

mod common;
use common::{library, Fixture, Side, READ_LENGTH};

#[test]
fn test_agreeing_reads() -> Result<()> {
    let fixture = Fixture::with_split_reads();
    let estimator = fixture.estimator(Config::default());
    let result = estimator.calculate(&Fixture::pair(), 300.0, 30.0, 100, 100)?;

    assert_eq!(result.id(), "fusion");
    assert_eq!(result.break_a().contig(), "chr1");
    assert_eq!(result.break_a().strand(), &Strand::Forward);
    assert_eq!(result.break_a().position() + 1, 1000);
    assert_eq!(result.break_b().contig(), "chr2");
    assert_eq!(result.break_b().strand(), &Strand::Reverse);
    assert_eq!(result.break_b().position() + 1, 5000);
    assert_eq!(*result.supporting_reads(), 10);

    // Windows: chr1 [900, 1390) read forward, chr2 [4609, 5099) read forward
    let expected = [&fixture.chr1[900..1000], &fixture.chr2[4999..5099]].concat();
    assert_eq!(result.sequence(), &expected);

    // Reverse mates split at 100 - k: 70, 62, 54, 46, 38. Forward mates at k: 34, 42, 50, 58, 66
    assert_eq!(*result.split_pos_avg(), 52.0);
    assert_eq!(*result.split_min_avg(), 50.0);
    assert_eq!(result.inter_length(), 0);
    Ok(())
}

#[test]
fn test_swapped_regions_mirror_the_result() -> Result<()> {
    let fixture = Fixture::with_split_reads();
    let estimator = fixture.estimator(Config::default());

    let pair = Fixture::pair();
    let direct = estimator.estimate(&pair, &library())?;
    let mirror = estimator.estimate(&pair.swapped(), &library())?;

    assert_eq!(mirror.break_a(), direct.break_b());
    assert_eq!(mirror.break_b(), direct.break_a());
    assert_eq!(mirror.sequence(), &reverse_complement(direct.sequence()));
    assert_eq!(mirror.supporting_reads(), direct.supporting_reads());
    assert_eq!(mirror.split_pos_avg(), direct.split_pos_avg());
    assert_eq!(mirror.split_min_avg(), direct.split_min_avg());
    Ok(())
}

#[test]
fn test_zero_evidence() -> Result<()> {
    let fixture = Fixture::with_split_reads();
    let estimator = fixture.estimator(Config::default());

    let pair = RegionPair::from_strings("empty", "chr1+:2001-2100", "chr2+:101-200")?;
    let result = estimator.estimate(&pair, &library())?;

    assert_eq!(*result.supporting_reads(), 0);
    assert!(result.sequence().is_empty());
    assert_eq!(*result.split_pos_avg(), 0.0);
    assert_eq!(*result.split_min_avg(), 0.0);

    // Window midpoints: chr1 [2000, 2490) and chr2 [100, 590)
    assert_eq!(*result.break_a().position(), 2245);
    assert_eq!(*result.break_b().position(), 345);
    Ok(())
}

#[test]
fn test_monotonic_threshold() -> Result<()> {
    let mut fixture = Fixture::new();
    for i in 0..10 {
        // Substitutions stay far from the split
        let subs = (0..i).map(|j| 2 + 4 * j).collect::<Vec<_>>();
        fixture.add_split_read(&format!("read{i}"), 50, &subs, Side::B, EvidenceClass::Anchored);
    }

    let mut previous = 0;
    for fraction in [0.0, 0.01, 0.02, 0.03, 0.05, 0.1] {
        let mut config = Config::default();
        config.set_max_mismatch_fraction(fraction);

        let result = fixture
            .estimator(config)
            .estimate(&Fixture::pair(), &library())?;
        let supporting = *result.supporting_reads();

        assert!(supporting >= previous, "{fraction}: {supporting} < {previous}");
        if supporting > 0 {
            assert_eq!(result.break_a().position() + 1, 1000);
            assert_eq!(result.break_b().position() + 1, 5000);
        }
        previous = supporting;
    }
    assert_eq!(previous, 10);

    let mut strict = Config::default();
    strict.set_max_mismatch_fraction(0.0);
    let result = fixture
        .estimator(strict)
        .estimate(&Fixture::pair(), &library())?;
    assert_eq!(*result.supporting_reads(), 1);
    Ok(())
}

#[test]
fn test_substituted_read_is_excluded() -> Result<()> {
    let mut fixture = Fixture::with_split_reads();
    // Every tenth base is substituted, which is too much for any split
    let subs = (0..READ_LENGTH).step_by(10).collect::<Vec<_>>();
    fixture.add_split_read("noisy", 50, &subs, Side::B, EvidenceClass::Anchored);

    let result = fixture
        .estimator(Config::default())
        .estimate(&Fixture::pair(), &library())?;
    assert_eq!(*result.supporting_reads(), 10);
    assert_eq!(*result.split_pos_avg(), 52.0);
    Ok(())
}

#[test]
fn test_skipped_reads() -> Result<()> {
    let mut fixture = Fixture::with_split_reads();

    // Mate sequence is not available
    fixture.add_alignment(
        Alignment::new(
            "lost/1".into(),
            "lost/2".into(),
            "chr1".into(),
            900,
            Strand::Forward,
        ),
        EvidenceClass::Anchored,
    );

    // Shorter than the minimum read length
    let short = fixture.split_read(1000, 40, READ_LENGTH - 10, &[]);
    fixture.add_read("short", short, Side::B, EvidenceClass::Anchored);

    // Anchored on the strand pointing away from the junction
    let read = fixture.split_read(1000, 50, READ_LENGTH, &[]);
    fixture.reads.add("away/2", read);
    fixture.add_alignment(
        Alignment::new(
            "away/1".into(),
            "away/2".into(),
            "chr2".into(),
            5100,
            Strand::Forward,
        ),
        EvidenceClass::Discordant,
    );

    // The same mate nominated twice
    let read = fixture.split_read(1000, 50, READ_LENGTH, &[]);
    fixture.add_read("twice", read.clone(), Side::B, EvidenceClass::Anchored);
    fixture.add_read("twice", read, Side::B, EvidenceClass::Discordant);

    let result = fixture
        .estimator(Config::default())
        .estimate(&Fixture::pair(), &library())?;
    assert_eq!(*result.supporting_reads(), 11);
    assert_eq!(result.break_a().position() + 1, 1000);
    assert_eq!(result.break_b().position() + 1, 5000);
    Ok(())
}

#[test]
fn test_minority_junction() -> Result<()> {
    let mut fixture = Fixture::with_split_reads();
    for i in 0..3 {
        let read = fixture.split_read(990, 40 + 5 * i, READ_LENGTH, &[]);
        fixture.add_read(&format!("alt{i}"), read, Side::B, EvidenceClass::Anchored);
    }

    let result = fixture
        .estimator(Config::default())
        .estimate(&Fixture::pair(), &library())?;
    assert_eq!(result.break_a().position() + 1, 1000);
    assert_eq!(result.break_b().position() + 1, 5000);
    // Reads supporting the other junction are accepted, but don't support the winner
    assert_eq!(*result.supporting_reads(), 10);
    Ok(())
}

#[test]
fn test_annotation_clips_windows() -> Result<()> {
    let fixture = Fixture::with_split_reads();
    let mut estimator = fixture.estimator(Config::default());

    let mut exons = Exons::new();
    exons
        .add("chr1", Interval::new(500, 1000)?)
        .add("chr2", Interval::new(4999, 6000)?);
    estimator.set_annotation(Arc::new(exons));

    let result = estimator.estimate(&Fixture::pair(), &library())?;
    assert_eq!(result.break_a().position() + 1, 1000);
    assert_eq!(result.break_b().position() + 1, 5000);
    assert_eq!(*result.supporting_reads(), 10);

    let expected = [&fixture.chr1[900..1000], &fixture.chr2[4999..5099]].concat();
    assert_eq!(result.sequence(), &expected);
    Ok(())
}

struct BrokenReads;

impl ReadAccessor for BrokenReads {
    fn fetch(&self, _: &str, _: &mut Vec<u8>) -> Result<()> {
        Err(eyre!("Read index is corrupted"))
    }
}

#[test]
fn test_fatal_errors() -> Result<()> {
    let fixture = Fixture::with_split_reads();
    let estimator = fixture.estimator(Config::default());

    for (a, b) in [
        ("chrZ+:1-100", "chr2-:5000-5200"),
        ("chr1+:801-1000", "chr2-:7901-8100"),
    ] {
        let pair = RegionPair::from_strings("invalid", a, b)?;
        assert!(estimator.estimate(&pair, &library()).is_err(), "{a} {b}");
    }

    // Invalid library
    let pair = Fixture::pair();
    assert!(estimator.calculate(&pair, 300.0, 30.0, 120, 100).is_err());

    // Read index failures are not skipped
    let broken = FusionEstimator::new(
        Arc::new(fixture.alignments.clone()),
        Arc::new(BrokenReads),
        Arc::new(fixture.reference.clone()),
        Config::default(),
    )?;
    let err = broken.estimate(&pair, &library()).unwrap_err();
    assert!(format!("{err:?}").contains("Read index is corrupted"));

    // Invalid configuration
    let mut config = Config::default();
    config.set_max_mismatch_fraction(2.0);
    assert!(FusionEstimator::new(
        Arc::new(fixture.alignments.clone()),
        Arc::new(fixture.reads.clone()),
        Arc::new(fixture.reference.clone()),
        config,
    )
    .is_err());
    Ok(())
}
