pub(crate) use crate::io;

pub use clap::{Args, Parser, Subcommand};

pub use log::{info, warn};

pub use ppblock::{CommunityDetector, CommunityGraph, DetectorOptions, GraphView};

/// Node identifier as read from an interaction file
pub type NodeId = Box<str>;
