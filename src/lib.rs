// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

//! peakviz: overlap diagrams for ChIP-Seq peak sets
//!
//! This library turns named collections of genomic intervals or opaque
//! tokens into diagram models: Venn diagrams, UpSet plots and pie charts.
//!
//! # Features
//!
//! - **Common coordinate frame**: interval sets are reduced to one universe
//!   before counting, so overlapping replicate peaks count once
//! - **Automatic dispatch**: Venn for up to three sets, UpSet beyond
//! - **Summary panels**: per-intersection boxplots of a reduced attribute
//! - **Serialisable output**: every diagram is serde-serialisable, with a
//!   small SVG writer for inspection
//!
//! # Example
//!
//! ```rust,no_run
//! use peakviz::prelude::*;
//!
//! let input = Collections::from_bed_files(
//!     &["rep1.narrowPeak", "rep2.narrowPeak"],
//!     &[],
//!     &ColumnScheme::NarrowPeak,
//! )
//! .unwrap();
//!
//! let diagram = plot_overlaps(&input, &OverlapConfig::new()).unwrap();
//! println!("{}", diagram.to_json().unwrap());
//! ```

pub mod bed;
pub mod colors;
pub mod commands;
pub mod config;
pub mod diagram;
pub mod error;
pub mod geometry;
pub mod index;
pub mod interval;
pub mod parallel;
pub mod reducer;
pub mod svg;

// Re-export commonly used types
pub use bed::{read_records, BedReader, ColumnScheme};
pub use commands::{overlaps::plot_overlaps, pie::plot_pie, reduce::reduce};
pub use diagram::Diagram;
pub use error::{OverlapError, Result};
pub use index::{overlaps, IntervalIndex};
pub use interval::{Attribute, BedRecord, Interval, Strand};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bed::{read_records, BedReader, ColumnScheme};
    pub use crate::commands::{
        plot_overlaps, plot_pie, reduce, Collections, NamedSet, PieConfig, PieWeight,
        ReduceCommand,
    };
    pub use crate::config::{OverlapConfig, PlotType, SortPolicy, UpSetOptions, VennOptions};
    pub use crate::diagram::Diagram;
    pub use crate::error::{OverlapError, Result};
    pub use crate::interval::{Attribute, BedRecord, Interval, Strand};
    pub use crate::reducer::Reducer;
}
