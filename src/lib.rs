#[cfg(feature = "cli")]
pub mod cli;
pub mod cluster;
pub mod config;
pub mod document;
pub mod error;
pub mod interact;
pub mod render;
pub mod style;
pub mod tree;
pub mod visibility;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, DescendantMatch, FoldConfig, load_config};
pub use document::DocumentModel;
pub use error::FoldError;
pub use interact::{ClickOutcome, Interaction, LinkRole};
pub use render::{FoldedSvg, render_folded};
pub use style::{PrepareOptions, prepare, stylesheet};
pub use tree::{ElementRef, SvgTree};
pub use visibility::set_cluster_visibility;
