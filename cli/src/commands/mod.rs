//! Command implementations

pub mod plan;
pub mod sync;
pub mod version;

use std::num::NonZeroUsize;

use clap::Args;

use crate::application::services::executor::DEFAULT_JOBS;

/// Concurrency options shared by commands that scan or sync.
#[derive(Args, Debug, Clone)]
pub struct JobsArgs {
    /// Maximum number of plugins processed at once
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_JOBS)]
    pub jobs: NonZeroUsize,
}
