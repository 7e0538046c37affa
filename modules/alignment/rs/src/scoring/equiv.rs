#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Match,
    Mismatch,
    Equivalent,
}

impl Type {
    /// Matches and equivalent symbols are not counted as mismatches.
    #[inline(always)]
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Type::Mismatch)
    }
}

pub trait Classifier {
    type Symbol;

    fn classify(&self, s1: &Self::Symbol, s2: &Self::Symbol) -> Type;
}

/// Case-insensitive comparison of nucleotides. Ambiguous `N` never matches anything, including
/// another `N`, while T and U are treated as equivalent.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Nucleotides {}

impl Classifier for Nucleotides {
    type Symbol = u8;

    #[inline(always)]
    fn classify(&self, s1: &Self::Symbol, s2: &Self::Symbol) -> Type {
        match (s1.to_ascii_uppercase(), s2.to_ascii_uppercase()) {
            (b'N', _) | (_, b'N') => Type::Mismatch,
            (b'T', b'U') | (b'U', b'T') => Type::Equivalent,
            (a, b) if a == b => Type::Match,
            _ => Type::Mismatch,
        }
    }
}
