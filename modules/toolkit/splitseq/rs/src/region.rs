use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::HashMap;
use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::{bail, ensure, eyre, OptionExt, Result, WrapErr};

use splitseq_core_rs::loc::{Interval, Locus, Strand};

/// Two candidate regions of a fusion. The strand of each region points towards the junction:
/// after the end of a forward region and before the start of a reverse one.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Getters, Dissolve, Constructor)]
pub struct RegionPair {
    id: String,
    a: Locus<String, u64>,
    b: Locus<String, u64>,
}

impl RegionPair {
    /// Parse regions written as `<contig><strand>:<start>-<end>`, 1-based and inclusive.
    pub fn from_strings(id: impl Into<String>, a: &str, b: &str) -> Result<Self> {
        let a = a.parse().wrap_err("Invalid first region")?;
        let b = b.parse().wrap_err("Invalid second region")?;
        Ok(Self::new(id.into(), a, b))
    }

    /// The same fusion seen from the other side.
    pub fn swapped(&self) -> Self {
        Self {
            id: self.id.clone(),
            a: self.b.clone(),
            b: self.a.clone(),
        }
    }
}

pub mod parse {
    use super::*;

    fn field<'a>(parts: &mut impl Iterator<Item = &'a str>, name: &str) -> Result<&'a str> {
        parts
            .next()
            .map(str::trim)
            .ok_or_else(|| eyre!("Missing {name}"))
    }

    /// One side of a region pair: `id \t side \t contig \t strand \t start \t end`.
    pub fn side(line: &str) -> Result<(String, usize, Locus<String, u64>)> {
        let mut parts = line.split('\t');

        let id = field(&mut parts, "region pair ID")?;
        ensure!(!id.is_empty(), "Empty region pair ID");

        let side = match field(&mut parts, "region side")? {
            "0" => 0,
            "1" => 1,
            side => bail!("Region side must be 0 or 1, got {side:?}"),
        };

        let contig = field(&mut parts, "contig")?;
        ensure!(!contig.is_empty(), "Empty contig name");
        let strand: Strand = field(&mut parts, "strand")?.parse()?;

        let start = field(&mut parts, "start")?
            .parse::<u64>()
            .wrap_err("Invalid region start")?;
        let end = field(&mut parts, "end")?
            .parse::<u64>()
            .wrap_err("Invalid region end")?;
        ensure!(start >= 1, "Region start must be 1-based, got {start}");
        ensure!(parts.next().is_none(), "Too many fields");

        let interval = Interval::new(start - 1, end).wrap_err("Invalid region coordinates")?;
        Ok((
            id.to_string(),
            side,
            Locus::new(contig.to_string(), interval, strand),
        ))
    }

    /// Read all region pairs, in the order their IDs first appear. Both sides of each pair must be
    /// present exactly once.
    pub fn pairs(reader: impl BufRead) -> Result<Vec<RegionPair>> {
        let mut order = Vec::new();
        let mut sides: HashMap<String, [Option<Locus<String, u64>>; 2]> = HashMap::default();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, side, locus) = self::side(&line).wrap_err_with(|| {
                format!("Failed to parse region pair at line {}: {line}", lineno + 1)
            })?;

            let entry = sides.entry(id.clone()).or_insert_with(|| {
                order.push(id.clone());
                [None, None]
            });
            ensure!(
                entry[side].is_none(),
                "Side {side} of region pair {id} is specified more than once"
            );
            entry[side] = Some(locus);
        }

        order
            .into_iter()
            .map(|id| {
                let [a, b] = sides.remove(&id).ok_or_eyre("Region pair disappeared")?;
                match (a, b) {
                    (Some(a), Some(b)) => Ok(RegionPair::new(id, a, b)),
                    _ => Err(eyre!("Region pair {id} must have both sides (0 and 1)")),
                }
            })
            .collect()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<RegionPair>> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open region pairs: {}", path.display()))?;
        pairs(BufReader::new(file))
            .wrap_err_with(|| format!("Failed to read region pairs: {}", path.display()))
    }
}
