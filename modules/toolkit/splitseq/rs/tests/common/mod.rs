#![allow(dead_code)]

use std::sync::Arc;

use splitseq_core_rs::loc::Strand;
use splitseq_core_rs::seq::reverse_complement;
use splitseq_io_rs::bam::Alignment;
use splitseq_rs::accessor::memory::{Alignments, Sequences};
use splitseq_rs::{Config, EvidenceClass, FusionEstimator, Library, RegionPair};

pub const READ_LENGTH: usize = 100;

pub fn random_seq(seed: u64, length: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E3779B97F4A7C15) | 1;
    (0..length)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            b"ACGT"[((state >> 32) % 4) as usize]
        })
        .collect()
}

fn substitute(base: u8) -> u8 {
    match base {
        b'A' => b'C',
        _ => b'A',
    }
}

pub fn library() -> Library {
    Library::new(300.0, 30.0, READ_LENGTH, READ_LENGTH)
}

/// Which region the anchoring mate of a split read is aligned to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    A,
    B,
}

/// A fusion joining chr1 up to position 1000 (forward strand) with chr2 from position 5000
/// onwards (forward strand), 1-based. The fusion is described by the regions `chr1+:801-1000`
/// and `chr2-:5000-5200`.
#[derive(Clone)]
pub struct Fixture {
    pub chr1: Vec<u8>,
    pub chr2: Vec<u8>,
    pub reference: Sequences,
    pub reads: Sequences,
    pub alignments: Alignments,
}

impl Fixture {
    pub fn new() -> Self {
        let mut chr1 = random_seq(1, 3_000);
        let mut chr2 = random_seq(2, 8_000);

        // The junction must not be shifted by a micro-homology
        chr1[1000] = substitute(chr2[4999]);
        chr2[4998] = substitute(chr1[999]);

        let mut reference = Sequences::new();
        reference.add("chr1", chr1.clone()).add("chr2", chr2.clone());

        Self {
            chr1,
            chr2,
            reference,
            reads: Sequences::new(),
            alignments: Alignments::new(),
        }
    }

    /// Ten reads agreeing on the junction, with 30 to 66 bases on the chr1 side.
    pub fn with_split_reads() -> Self {
        let mut fixture = Self::new();
        for i in 0..10 {
            let side = if i % 2 == 0 { Side::A } else { Side::B };
            let class = match i % 3 {
                0 => EvidenceClass::Discordant,
                _ => EvidenceClass::Anchored,
            };
            fixture.add_split_read(&format!("read{i}"), 30 + 4 * i, &[], side, class);
        }
        fixture
    }

    pub fn pair() -> RegionPair {
        RegionPair::from_strings("fusion", "chr1+:801-1000", "chr2-:5000-5200").unwrap()
    }

    /// Fused sequence with `junction` bases of chr1.
    pub fn fused(&self, junction: usize) -> Vec<u8> {
        [&self.chr1[..junction], &self.chr2[4999..]].concat()
    }

    /// Read of the given length spanning the junction with `offset` bases on the chr1 side and
    /// substitutions at the given read positions.
    pub fn split_read(
        &self,
        junction: usize,
        offset: usize,
        length: usize,
        subs: &[usize],
    ) -> Vec<u8> {
        let fused = self.fused(junction);
        let mut read = fused[junction - offset..junction - offset + length].to_vec();
        for pos in subs {
            read[*pos] = substitute(read[*pos]);
        }
        read
    }

    /// Register a read as the mate of an alignment pointing towards the junction.
    pub fn add_read(&mut self, name: &str, read: Vec<u8>, side: Side, class: EvidenceClass) {
        let (read_id, mate_id) = (format!("{name}/1"), format!("{name}/2"));
        let (contig, start, strand, sequence) = match side {
            Side::A => ("chr1", 850, Strand::Forward, reverse_complement(&read)),
            Side::B => ("chr2", 5050, Strand::Reverse, read),
        };
        self.reads.add(mate_id.clone(), sequence);
        self.add_alignment(Alignment::new(read_id, mate_id, contig.into(), start, strand), class);
    }

    pub fn add_split_read(
        &mut self,
        name: &str,
        offset: usize,
        subs: &[usize],
        side: Side,
        class: EvidenceClass,
    ) {
        let read = self.split_read(1000, offset, READ_LENGTH, subs);
        self.add_read(name, read, side, class);
    }

    pub fn add_alignment(&mut self, alignment: Alignment, class: EvidenceClass) {
        match class {
            EvidenceClass::Anchored => self.alignments.add_anchored(alignment),
            EvidenceClass::Discordant => self.alignments.add_discordant(alignment),
        };
    }

    pub fn estimator(&self, config: Config) -> FusionEstimator {
        FusionEstimator::new(
            Arc::new(self.alignments.clone()),
            Arc::new(self.reads.clone()),
            Arc::new(self.reference.clone()),
            config,
        )
        .unwrap()
    }
}
