//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for an [`AlignedArena`](crate::AlignedArena).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Byte alignment of every buffer the arena returns.
    ///
    /// Default: 64, which satisfies SSE (16), AVX (32) and AVX-512 (64)
    /// loads. Must be a power of two in
    /// `MIN_ALIGNMENT..=MAX_ALIGNMENT`.
    pub alignment: usize,
}

impl ArenaConfig {
    /// Default alignment: one AVX-512 register / one x86 cache line.
    pub const DEFAULT_ALIGNMENT: usize = 64;

    /// Smallest accepted alignment (one SSE / NEON register).
    pub const MIN_ALIGNMENT: usize = 16;

    /// Largest accepted alignment (one 4 KiB page).
    pub const MAX_ALIGNMENT: usize = 4096;

    /// Create a config with the given alignment. Not validated until used.
    pub fn with_alignment(alignment: usize) -> Self {
        Self { alignment }
    }

    /// Check that the alignment is usable.
    pub fn validate(&self) -> Result<(), ArenaError> {
        let a = self.alignment;
        if !a.is_power_of_two() || !(Self::MIN_ALIGNMENT..=Self::MAX_ALIGNMENT).contains(&a) {
            return Err(ArenaError::InvalidAlignment { alignment: a });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::with_alignment(Self::DEFAULT_ALIGNMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alignment_is_64() {
        let config = ArenaConfig::default();
        assert_eq!(config.alignment, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_power_of_two_rejected() {
        let err = ArenaConfig::with_alignment(48).validate().unwrap_err();
        assert_eq!(err, ArenaError::InvalidAlignment { alignment: 48 });
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(ArenaConfig::with_alignment(8).validate().is_err());
        assert!(ArenaConfig::with_alignment(8192).validate().is_err());
        assert!(ArenaConfig::with_alignment(16).validate().is_ok());
        assert!(ArenaConfig::with_alignment(4096).validate().is_ok());
    }
}
