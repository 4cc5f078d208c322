use std::sync::Arc;

use clap::Args;
use workhealth_core::{Config, MemoryInsightCache, TabType, WorkHealthService};

use super::{runtime, CmdResult, EventInput};

#[derive(Args, Debug)]
pub struct CacheKeyArgs {
    #[arg(long, default_value = "overview")]
    pub tab: TabType,

    #[command(flatten)]
    pub input: EventInput,
}

pub fn run(args: CacheKeyArgs) -> CmdResult {
    let config = Config::load()?;
    let service =
        WorkHealthService::from_config_with_cache(&config, Arc::new(MemoryInsightCache::new()));
    let date = args.input.date(&service)?;

    let raw = runtime()?.block_on(args.input.events(&service, date))?;
    println!("{}", service.cache_key(&raw, args.tab, date));
    Ok(())
}
