//! Command implementations for peakviz.

pub mod overlaps;
pub mod pie;
pub mod reduce;

pub use overlaps::{
    plot_overlaps, resolve_strategy, Collections, InputKind, MembershipMatrix, NamedSet, Strategy,
};
pub use pie::{plot_pie, PieConfig, PieWeight};
pub use reduce::{reduce, ReduceCommand};
