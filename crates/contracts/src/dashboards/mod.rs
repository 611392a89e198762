pub mod d400_unified_stats;
pub mod d401_legacy_stats;
