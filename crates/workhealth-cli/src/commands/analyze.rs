use std::sync::Arc;

use clap::Args;
use workhealth_core::{Config, MemoryInsightCache, WorkHealthService};

use super::{print_json, runtime, CmdResult, EventInput};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: EventInput,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: AnalyzeArgs) -> CmdResult {
    let config = Config::load()?;
    let service =
        WorkHealthService::from_config_with_cache(&config, Arc::new(MemoryInsightCache::new()));
    let date = args.input.date(&service)?;

    let raw = runtime()?.block_on(args.input.events(&service, date))?;
    let (_, metrics) = service.analyze_events(&raw, date);
    print_json(&metrics, args.pretty)
}
