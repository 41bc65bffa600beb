//! End-to-end autotune run: stage, fetch, tune, report.

use chrono_tz::Tz;

use crate::cli::report;
use crate::core::config::ToolConfig;
use crate::core::nightscout::{HttpGet, NightscoutFetcher, ReqwestClient};
use crate::core::resolver::RunConfig;
use crate::core::stager::stage_profiles;
use crate::core::tools::{ExternalTool, OrefCore, OrefPrep, Tool};
use crate::core::tuning::{PrepStep, TuneStep, TuningLoop};
use crate::error::Result;
use crate::state::{days_in_range, plan, AutotuneLayout, CurrentProfile, IterationRecord};

/// Runs autotune with the real HTTP client and oref0 tools, then the export
/// and report steps.
///
/// # Errors
///
/// Anything fatal from [`run_with`], or an HTTP client that cannot be built.
pub fn run(config: &RunConfig, tools: &ToolConfig) -> Result<Vec<IterationRecord>> {
    let http = ReqwestClient::new(tools.http_timeout)?;
    let prep = OrefPrep(ExternalTool::new(tools.tools.prep.as_str()));
    let core = OrefCore(ExternalTool::new(tools.tools.core.as_str()));

    let records = run_with(config, tools.timezone, &http, &prep, &core)?;

    finish(
        config,
        &ExternalTool::new(tools.tools.export.as_str()),
        &ExternalTool::new(tools.tools.report.as_str()),
    );
    Ok(records)
}

/// Exports when a spreadsheet path was given, then shows the report when
/// enabled.
pub fn finish<E: Tool, R: Tool>(config: &RunConfig, export: &E, report: &R) {
    let layout = AutotuneLayout::new(&config.base_dir);
    if let Some(xlsx) = &config.xlsx {
        report::export(export, &layout, xlsx);
    }
    if config.report {
        report::show_recommendations(report, &layout);
    }
}

/// Stages profiles, downloads Nightscout data, and runs the tuning loop.
///
/// Staging happens first, so a missing pump profile fails before any request
/// is made.
///
/// # Errors
///
/// Missing pump profile, network failures, file copy failures, and in strict
/// mode HTTP error statuses, failed tools and invalid tuned profiles.
pub fn run_with<H, P, T>(
    config: &RunConfig,
    tz: Tz,
    http: &H,
    prep: &P,
    tune: &T,
) -> Result<Vec<IterationRecord>>
where
    H: HttpGet,
    P: PrepStep,
    T: TuneStep,
{
    let layout = AutotuneLayout::new(&config.base_dir);
    stage_profiles(&layout)?;

    let fetcher = NightscoutFetcher::new(http, &config.ns_host, tz, config.strict);
    if config.fetch_ns_profile {
        fetcher.fetch_profile(&layout.ns_profile())?;
    }
    fetcher.fetch_treatments(config.start_date, config.end_date, &layout.ns_treatments())?;

    let days = days_in_range(config.start_date, config.end_date);
    fetcher.fetch_entries(&days, &layout)?;
    if days.is_empty() {
        tracing::warn!(
            start = %config.start_date,
            end = %config.end_date,
            "end date is not after start date, nothing to tune"
        );
    }

    let mut profile = CurrentProfile::new(layout.current_profile());
    TuningLoop::new(&layout, prep, tune, config.strict).run(&plan(config.runs, &days), &mut profile)
}
