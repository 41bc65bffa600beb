//! The autotune loop.
//!
//! Every (run, day) iteration snapshots the current profile, prepares that
//! day's glucose data, tunes a new profile from it, and promotes the new
//! profile so the next iteration starts from it. Iterations are strictly
//! sequential because each one reads what the previous one wrote.
//!
//! A failing prep or tune step does not stop the loop: the iteration is
//! recorded as [`IterationStatus::FailedButContinued`] and whatever the tune
//! step left behind is promoted. Strict mode turns the first failure, or a
//! tuned profile that is not JSON, into an error.

use std::fs;
use std::path::Path;

use crate::core::tools::ToolOutcome;
use crate::error::{AutotuneError, Result};
use crate::state::{
    AutotuneLayout, CurrentProfile, Iteration, IterationRecord, IterationStatus, Step,
};

/// Files handed to the prep step.
#[derive(Debug, Clone, Copy)]
pub struct PrepInputs<'a> {
    pub treatments: &'a Path,
    pub profile: &'a Path,
    pub entries: &'a Path,
    pub pump_profile: &'a Path,
    /// Where the prepared dataset must be written.
    pub output: &'a Path,
}

/// Files handed to the tune step.
#[derive(Debug, Clone, Copy)]
pub struct TuneInputs<'a> {
    pub prepped: &'a Path,
    pub profile: &'a Path,
    pub pump_profile: &'a Path,
    /// Where the tuned profile must be written.
    pub output: &'a Path,
}

/// Turns treatments, a profile and one day of glucose entries into a
/// prepared dataset at `inputs.output`.
pub trait PrepStep {
    fn name(&self) -> &str;
    fn prep(&self, inputs: &PrepInputs<'_>) -> ToolOutcome;
}

/// Turns a prepared dataset and the current profile into a new profile at
/// `inputs.output`.
pub trait TuneStep {
    fn name(&self) -> &str;
    fn tune(&self, inputs: &TuneInputs<'_>) -> ToolOutcome;
}

/// Drives the prep and tune steps over a plan of iterations.
pub struct TuningLoop<'a, P, T> {
    layout: &'a AutotuneLayout,
    prep: &'a P,
    tune: &'a T,
    strict: bool,
}

impl<'a, P: PrepStep, T: TuneStep> TuningLoop<'a, P, T> {
    pub fn new(layout: &'a AutotuneLayout, prep: &'a P, tune: &'a T, strict: bool) -> Self {
        Self {
            layout,
            prep,
            tune,
            strict,
        }
    }

    /// Runs every iteration of `plan` in order, advancing `profile`.
    ///
    /// # Errors
    ///
    /// Fails if a snapshot or promotion cannot be copied (including a tuned
    /// profile that was never written). In strict mode, also fails on the
    /// first failed step or unparsable tuned profile.
    pub fn run(
        &self,
        plan: &[Iteration],
        profile: &mut CurrentProfile,
    ) -> Result<Vec<IterationRecord>> {
        let mut records = Vec::with_capacity(plan.len());
        for &iteration in plan {
            records.push(self.iterate(iteration, profile)?);
        }

        let failed = records.iter().filter(|r| !r.status.is_success()).count();
        if failed > 0 {
            tracing::warn!(
                failed,
                total = records.len(),
                "some iterations had failing tools; their output was used anyway"
            );
        }
        tracing::info!(
            iterations = records.len(),
            promotions = profile.promotions(),
            "autotune loop finished"
        );
        Ok(records)
    }

    fn iterate(&self, it: Iteration, profile: &mut CurrentProfile) -> Result<IterationRecord> {
        let layout = self.layout;
        tracing::info!(iteration = %it, "starting iteration");

        profile.snapshot_to(&layout.profile_snapshot(it.run, it.date))?;

        let prepped = layout.prepped(it.run, it.date);
        let entries = layout.ns_entries(it.date);
        let treatments = layout.ns_treatments();
        let prep_pump = layout.prep_pump_profile();
        let prep_outcome = self.prep.prep(&PrepInputs {
            treatments: &treatments,
            profile: profile.path(),
            entries: &entries,
            pump_profile: &prep_pump,
            output: &prepped,
        });
        self.check(Step::Prep, self.prep.name(), &prep_outcome)?;
        tracing::info!(output = %prepped.display(), "prep output");

        let new_profile = layout.new_profile(it.run, it.date);
        let profile_pump = layout.profile_pump();
        let tune_outcome = self.tune.tune(&TuneInputs {
            prepped: &prepped,
            profile: profile.path(),
            pump_profile: &profile_pump,
            output: &new_profile,
        });
        self.check(Step::Tune, self.tune.name(), &tune_outcome)?;
        tracing::info!(output = %new_profile.display(), "tuned profile");

        if self.strict {
            validate_profile(&new_profile)?;
        }
        profile.promote(&new_profile)?;

        let status = match (prep_outcome, tune_outcome) {
            (ToolOutcome::Failed(reason), _) => IterationStatus::FailedButContinued {
                step: Step::Prep,
                reason,
            },
            (ToolOutcome::Success, ToolOutcome::Failed(reason)) => {
                IterationStatus::FailedButContinued {
                    step: Step::Tune,
                    reason,
                }
            }
            (ToolOutcome::Success, ToolOutcome::Success) => IterationStatus::Succeeded,
        };
        Ok(IterationRecord {
            iteration: it,
            status,
        })
    }

    fn check(&self, step: Step, tool: &str, outcome: &ToolOutcome) -> Result<()> {
        match outcome {
            ToolOutcome::Failed(reason) if self.strict => Err(AutotuneError::ToolFailed {
                tool: tool.to_string(),
                details: format!("{step} step: {reason}"),
            }),
            _ => Ok(()),
        }
    }
}

fn validate_profile(path: &Path) -> Result<()> {
    let bytes = fs::read(path).map_err(|e| AutotuneError::io(path, e))?;
    serde_json::from_slice::<serde_json::Value>(&bytes)
        .map(|_| ())
        .map_err(|e| AutotuneError::InvalidProfile {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{days_in_range, plan};
    use chrono::NaiveDate;
    use std::cell::RefCell;

    /// Stands in for both oref0 tools.
    ///
    /// Prep copies the current profile into the prepped file; tune writes a
    /// JSON object naming the iteration and the profile it started from, so
    /// the chain of promotions can be checked from file contents.
    #[derive(Default)]
    struct FakeTools {
        calls: RefCell<Vec<String>>,
        fail_prep_on: Option<NaiveDate>,
        fail_tune_on: Option<NaiveDate>,
        tune_writes_garbage: bool,
        tune_skips_output: bool,
    }

    impl FakeTools {
        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    fn day_of(path: &Path) -> NaiveDate {
        // ...<run>.<YYYY-MM-DD>.json
        let name = path.file_name().unwrap().to_str().unwrap();
        let date = &name[name.len() - 15..name.len() - 5];
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    impl PrepStep for FakeTools {
        fn name(&self) -> &str {
            "fake-prep"
        }

        fn prep(&self, inputs: &PrepInputs<'_>) -> ToolOutcome {
            let date = day_of(inputs.entries);
            self.calls.borrow_mut().push(format!("prep {date}"));
            fs::copy(inputs.profile, inputs.output).unwrap();
            if self.fail_prep_on == Some(date) {
                return ToolOutcome::Failed("exit status: 1".to_string());
            }
            ToolOutcome::Success
        }
    }

    impl TuneStep for FakeTools {
        fn name(&self) -> &str {
            "fake-core"
        }

        fn tune(&self, inputs: &TuneInputs<'_>) -> ToolOutcome {
            let name = inputs.output.file_name().unwrap().to_str().unwrap().to_string();
            self.calls.borrow_mut().push(format!("tune {name}"));
            if !self.tune_skips_output {
                let body = if self.tune_writes_garbage {
                    "Error: cannot read profile".to_string()
                } else {
                    let from = fs::read_to_string(inputs.profile).unwrap();
                    serde_json::json!({ "tuned": name, "from": from }).to_string()
                };
                fs::write(inputs.output, body).unwrap();
            }
            if self.fail_tune_on == Some(day_of(inputs.output)) {
                return ToolOutcome::Failed("exit status: 2".to_string());
            }
            ToolOutcome::Success
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn staged_dir() -> (tempfile::TempDir, AutotuneLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = AutotuneLayout::new(dir.path());
        fs::create_dir_all(layout.autotune_dir()).unwrap();
        fs::write(layout.current_profile(), r#"{"seed":true}"#).unwrap();
        (dir, layout)
    }

    #[test]
    fn test_single_day_single_run() {
        let (_dir, layout) = staged_dir();
        let tools = FakeTools::default();
        let mut profile = CurrentProfile::new(layout.current_profile());
        let d = day(2024, 1, 1);

        let records = TuningLoop::new(&layout, &tools, &tools, false)
            .run(&plan(1, &[d]), &mut profile)
            .unwrap();

        assert_eq!(tools.calls(), vec!["prep 2024-01-01", "tune newprofile.1.2024-01-01.json"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, IterationStatus::Succeeded);
        assert_eq!(
            fs::read_to_string(layout.current_profile()).unwrap(),
            fs::read_to_string(layout.new_profile(1, d)).unwrap()
        );
        assert_eq!(
            fs::read_to_string(layout.profile_snapshot(1, d)).unwrap(),
            r#"{"seed":true}"#
        );
    }

    #[test]
    fn test_profile_chain_across_runs_and_days() {
        let (_dir, layout) = staged_dir();
        let tools = FakeTools::default();
        let mut profile = CurrentProfile::new(layout.current_profile());
        let days = days_in_range(day(2024, 1, 1), day(2024, 1, 4));
        let plan = plan(2, &days);

        let records = TuningLoop::new(&layout, &tools, &tools, false)
            .run(&plan, &mut profile)
            .unwrap();

        assert_eq!(records.len(), 6);
        assert_eq!(profile.promotions(), 6);
        assert_eq!(tools.calls().len(), 12);

        // Each iteration starts from the previous iteration's tuned profile.
        let mut expected_start = r#"{"seed":true}"#.to_string();
        for it in &plan {
            let snapshot = fs::read_to_string(layout.profile_snapshot(it.run, it.date)).unwrap();
            assert_eq!(snapshot, expected_start, "{it}");
            expected_start = fs::read_to_string(layout.new_profile(it.run, it.date)).unwrap();
        }
        assert_eq!(
            fs::read_to_string(layout.current_profile()).unwrap(),
            fs::read_to_string(layout.new_profile(2, day(2024, 1, 3))).unwrap()
        );
    }

    #[test]
    fn test_failures_are_recorded_and_loop_continues() {
        let (_dir, layout) = staged_dir();
        let tools = FakeTools {
            fail_prep_on: Some(day(2024, 1, 1)),
            fail_tune_on: Some(day(2024, 1, 2)),
            ..FakeTools::default()
        };
        let mut profile = CurrentProfile::new(layout.current_profile());
        let days = days_in_range(day(2024, 1, 1), day(2024, 1, 4));

        let records = TuningLoop::new(&layout, &tools, &tools, false)
            .run(&plan(1, &days), &mut profile)
            .unwrap();

        let statuses: Vec<_> = records.iter().map(|r| r.status.clone()).collect();
        assert_eq!(
            statuses,
            vec![
                IterationStatus::FailedButContinued {
                    step: Step::Prep,
                    reason: "exit status: 1".to_string()
                },
                IterationStatus::FailedButContinued {
                    step: Step::Tune,
                    reason: "exit status: 2".to_string()
                },
                IterationStatus::Succeeded,
            ]
        );
        assert_eq!(profile.promotions(), 3);
    }

    #[test]
    fn test_garbage_profile_propagates_without_strict() {
        let (_dir, layout) = staged_dir();
        let tools = FakeTools {
            tune_writes_garbage: true,
            ..FakeTools::default()
        };
        let mut profile = CurrentProfile::new(layout.current_profile());

        TuningLoop::new(&layout, &tools, &tools, false)
            .run(&plan(1, &[day(2024, 1, 1)]), &mut profile)
            .unwrap();

        assert_eq!(
            fs::read_to_string(layout.current_profile()).unwrap(),
            "Error: cannot read profile"
        );
    }

    #[test]
    fn test_strict_stops_on_first_failure() {
        let (_dir, layout) = staged_dir();
        let tools = FakeTools {
            fail_prep_on: Some(day(2024, 1, 2)),
            ..FakeTools::default()
        };
        let mut profile = CurrentProfile::new(layout.current_profile());
        let days = days_in_range(day(2024, 1, 1), day(2024, 1, 4));

        let err = TuningLoop::new(&layout, &tools, &tools, true)
            .run(&plan(1, &days), &mut profile)
            .unwrap_err();

        assert!(matches!(err, AutotuneError::ToolFailed { ref tool, .. } if tool == "fake-prep"));
        assert_eq!(profile.promotions(), 1);
        assert_eq!(tools.calls().last().unwrap(), "prep 2024-01-02");
    }

    #[test]
    fn test_strict_rejects_non_json_profile() {
        let (_dir, layout) = staged_dir();
        let tools = FakeTools {
            tune_writes_garbage: true,
            ..FakeTools::default()
        };
        let mut profile = CurrentProfile::new(layout.current_profile());

        let err = TuningLoop::new(&layout, &tools, &tools, true)
            .run(&plan(1, &[day(2024, 1, 1)]), &mut profile)
            .unwrap_err();

        assert!(matches!(err, AutotuneError::InvalidProfile { .. }));
        assert_eq!(
            fs::read_to_string(layout.current_profile()).unwrap(),
            r#"{"seed":true}"#
        );
    }

    #[test]
    fn test_missing_tuned_profile_is_fatal() {
        let (_dir, layout) = staged_dir();
        let tools = FakeTools {
            tune_skips_output: true,
            ..FakeTools::default()
        };
        let mut profile = CurrentProfile::new(layout.current_profile());

        let err = TuningLoop::new(&layout, &tools, &tools, false)
            .run(&plan(1, &[day(2024, 1, 1)]), &mut profile)
            .unwrap_err();

        assert!(matches!(err, AutotuneError::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_plan() {
        let (_dir, layout) = staged_dir();
        let tools = FakeTools::default();
        let mut profile = CurrentProfile::new(layout.current_profile());

        let records = TuningLoop::new(&layout, &tools, &tools, false)
            .run(&[], &mut profile)
            .unwrap();

        assert!(records.is_empty());
        assert!(tools.calls().is_empty());
    }
}
