use eyre::Result;
use rayon::ThreadPoolBuilder;

use splitseq_core_rs::parallelism;
use splitseq_rs::{Config, EvidenceClass, RegionPair, SplitSeq};

mod common;
use common::{library, Fixture, Side};

fn splitseq(fixture: &Fixture, threads: isize) -> Result<SplitSeq> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(parallelism::available(threads)?)
        .build()?;
    Ok(SplitSeq::new(pool, fixture.estimator(Config::default())))
}

#[test]
fn test_results_follow_input_order() -> Result<()> {
    let fixture = Fixture::with_split_reads();
    let mut splitseq = splitseq(&fixture, -1)?;

    let pairs = vec![
        Fixture::pair(),
        RegionPair::from_strings("empty", "chr1+:2001-2100", "chr2+:101-200")?,
        RegionPair::from_strings("swapped", "chr2-:5000-5200", "chr1+:801-1000")?,
    ];
    let expected = pairs
        .iter()
        .map(|pair| splitseq.estimator().estimate(pair, &library()))
        .collect::<Result<Vec<_>>>()?;

    // The same engine can be reused
    for _ in 0..2 {
        splitseq.add_pairs(pairs.clone());
        let results = splitseq.run(&library())?;
        assert_eq!(results, expected);
        assert!(splitseq.pairs().is_empty());
    }

    assert_eq!(*expected[0].supporting_reads(), 10);
    assert_eq!(*expected[1].supporting_reads(), 0);
    assert_eq!(expected[2].break_a(), expected[0].break_b());
    Ok(())
}

#[test]
fn test_many_pairs() -> Result<()> {
    let fixture = Fixture::with_split_reads();
    let mut splitseq = splitseq(&fixture, 4)?;

    for i in 0..64 {
        let mut pair = Fixture::pair();
        if i % 2 == 1 {
            pair = pair.swapped();
        }
        let (_, a, b) = pair.dissolve();
        splitseq.add_pair(RegionPair::new(format!("pair{i}"), a, b));
    }

    let results = splitseq.run(&library())?;
    assert_eq!(results.len(), 64);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.id(), &format!("pair{i}"));
        assert_eq!(*result.supporting_reads(), 10);
    }
    Ok(())
}

#[test]
fn test_deep_pairs_share_threads() -> Result<()> {
    // Enough reads per pair for the estimator to fan out inside the pool while other pairs are
    // still queued
    let mut fixture = Fixture::new();
    for i in 0..200 {
        let side = if i % 2 == 0 { Side::A } else { Side::B };
        fixture.add_split_read(
            &format!("read{i}"),
            20 + i % 61,
            &[],
            side,
            EvidenceClass::Anchored,
        );
    }
    let mut splitseq = splitseq(&fixture, 8)?;
    let expected = splitseq.estimator().estimate(&Fixture::pair(), &library())?;
    assert_eq!(*expected.supporting_reads(), 200);

    splitseq.add_pairs(std::iter::repeat_n(Fixture::pair(), 256));
    let results = splitseq.run(&library())?;
    assert_eq!(results.len(), 256);
    assert!(results.iter().all(|x| x == &expected));
    Ok(())
}

#[test]
fn test_failure_stops_the_run() -> Result<()> {
    let fixture = Fixture::with_split_reads();
    let mut splitseq = splitseq(&fixture, 2)?;

    splitseq
        .add_pair(Fixture::pair())
        .add_pair(RegionPair::from_strings("broken", "chrZ+:1-100", "chr2-:5000-5200")?)
        .add_pair(Fixture::pair());

    let err = splitseq.run(&library()).unwrap_err();
    assert!(err.to_string().contains("broken"), "{err:?}");

    // Nothing is left behind after a failed run
    assert!(splitseq.pairs().is_empty());
    splitseq.add_pair(Fixture::pair());
    assert_eq!(splitseq.run(&library())?.len(), 1);
    Ok(())
}
