use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{bail, Result, WrapErr};
use rayon::ThreadPoolBuilder;

use splitseq_core_rs::parallelism;
use splitseq_io_rs::WriteRecord;
use splitseq_rs::accessor::{ExonIndex, IndexedAlignments, IndexedReads, IndexedReference};
use splitseq_rs::region::{self, RegionPair};
use splitseq_rs::{Config, FusionEstimator, Library, SplitSeq, Writer};

#[derive(Parser)]
#[command(
    name = "splitseq",
    about = "Predict exact fusion breakpoints and sequences from split reads",
    version
)]
struct Cli {
    /// Discordant alignments BAM (indexed)
    #[arg(short = 'd', long, value_name = "FILE")]
    discordant: PathBuf,

    /// Anchored alignments BAM (indexed)
    #[arg(short = 'a', long, value_name = "FILE")]
    anchored: PathBuf,

    /// Reference genome FASTA (indexed)
    #[arg(short = 'f', long, value_name = "FILE")]
    reference: PathBuf,

    /// Read sequences FASTA (indexed)
    #[arg(short = 'r', long, value_name = "FILE")]
    reads: PathBuf,

    /// Exon annotation BED, restricts reference windows to exons
    #[arg(short = 'e', long, value_name = "FILE")]
    exons: Option<PathBuf>,

    /// Fragment length mean
    #[arg(short = 'u', long, value_name = "FLOAT")]
    fragment_mean: f64,

    /// Fragment length standard deviation
    #[arg(short = 's', long, value_name = "FLOAT")]
    fragment_sd: f64,

    /// Minimum read length
    #[arg(short = 'm', long, value_name = "INT")]
    min_read_length: usize,

    /// Maximum read length
    #[arg(short = 'x', long, value_name = "INT")]
    max_read_length: usize,

    /// First region, as contig[+-]:start-end
    #[arg(
        short = '1',
        long,
        value_name = "REGION",
        requires = "region_b",
        conflicts_with = "regions"
    )]
    region_a: Option<String>,

    /// Second region, as contig[+-]:start-end
    #[arg(short = '2', long, value_name = "REGION", requires = "region_a")]
    region_b: Option<String>,

    /// Region pairs table: id, side (0/1), contig, strand, start, end
    #[arg(short = 'i', long, value_name = "FILE")]
    regions: Option<PathBuf>,

    /// Output file for fusion sequences
    #[arg(short = 'q', long, value_name = "FILE")]
    sequences: PathBuf,

    /// Output file for breakpoints
    #[arg(short = 'b', long, value_name = "FILE")]
    breaks: PathBuf,

    /// Write log messages to this file instead of stderr
    #[arg(short = 'l', long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Number of threads, non-positive values are subtracted from the available cores
    #[arg(
        short = 't',
        long,
        value_name = "INT",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    threads: isize,

    /// Reject split reads with more mismatches than this fraction of their length
    #[arg(long, value_name = "FLOAT", default_value_t = 0.05)]
    max_mismatch_fraction: f64,

    /// Minimum anchor on each side of the split, as a fraction of the minimum read length
    #[arg(long, value_name = "FLOAT", default_value_t = 0.2)]
    min_anchor_fraction: f64,

    /// Reach of reference windows in fragment length standard deviations
    #[arg(long, value_name = "FLOAT", default_value_t = 3.0)]
    window_sd_multiplier: f64,
}

impl Cli {
    fn init_logging(&self) -> Result<()> {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .format_target(false);

        if let Some(path) = &self.log {
            let file = File::create(path)
                .wrap_err_with(|| format!("Failed to create log file: {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        builder.init();
        Ok(())
    }

    fn region_pairs(&self) -> Result<Vec<RegionPair>> {
        match (&self.region_a, &self.region_b, &self.regions) {
            (Some(a), Some(b), None) => Ok(vec![RegionPair::from_strings("commandline", a, b)?]),
            (None, None, Some(path)) => region::parse::from_path(path),
            _ => bail!("Specify either both regions (-1, -2) or a region pairs file (-i)"),
        }
    }

    fn estimator(&self) -> Result<FusionEstimator> {
        let config = Config::new(
            self.max_mismatch_fraction,
            self.min_anchor_fraction,
            self.window_sd_multiplier,
        );
        let alignments = IndexedAlignments::from_paths(&self.anchored, &self.discordant)?;
        let reads = IndexedReads::from_path(&self.reads)?;
        let reference = IndexedReference::from_path(&self.reference)?;

        let mut estimator = FusionEstimator::new(
            Arc::new(alignments),
            Arc::new(reads),
            Arc::new(reference),
            config,
        )?;
        if let Some(path) = &self.exons {
            estimator.set_annotation(Arc::new(ExonIndex::from_path(path)?));
        }
        Ok(estimator)
    }

    fn library(&self) -> Library {
        Library::new(
            self.fragment_mean,
            self.fragment_sd,
            self.min_read_length,
            self.max_read_length,
        )
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging()?;

    let library = cli.library();
    library.validate()?;
    let pairs = cli.region_pairs()?;
    log::info!("Loaded {} region pair(s)", pairs.len());

    let threads = parallelism::available(cli.threads)?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .wrap_err("Failed to build the thread pool")?;
    log::info!("Running on {} thread(s)", threads);

    let mut splitseq = SplitSeq::new(pool, cli.estimator()?);
    splitseq.add_pairs(pairs);
    let results = splitseq.run(&library)?;

    let mut writer = Writer::from_paths(&cli.sequences, &cli.breaks)?;
    writer.write_records(&results)?;
    writer.flush()?;
    log::info!(
        "Wrote {} result(s) to {} and {}",
        results.len(),
        cli.sequences.display(),
        cli.breaks.display()
    );
    Ok(())
}
