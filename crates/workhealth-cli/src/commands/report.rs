use chrono::Utc;
use clap::Args;
use workhealth_core::{Config, TabType, WorkHealthService};

use super::{print_json, runtime, CmdResult, EventInput};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Dashboard tab: overview, performance, resilience or sustainability
    #[arg(long, default_value = "overview")]
    pub tab: TabType,

    #[command(flatten)]
    pub input: EventInput,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: ReportArgs) -> CmdResult {
    let config = Config::load()?;
    let service = WorkHealthService::from_config(&config)?;
    let date = args.input.date(&service)?;

    let report = runtime()?.block_on(async {
        let raw = args.input.events(&service, date).await?;
        let report = service
            .report_for_events(&config.user.id, args.tab, date, &raw, Utc::now())
            .await;
        Ok::<_, Box<dyn std::error::Error>>(report)
    })?;
    print_json(&report, args.pretty)
}
