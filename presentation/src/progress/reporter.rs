//! Progress reporting for ensemble rounds

use colored::Colorize;
use ensemble_application::ports::progress::RoundProgressNotifier;
use ensemble_domain::{Decision, Strategy};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during an ensemble run with a bar per round
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn round_display_name(round: usize) -> String {
        if round == 0 {
            "Round 0 (initial)".to_string()
        } else {
            format!("Round {}", round)
        }
    }

    fn decision_summary(decision: &Decision) -> String {
        match decision {
            Decision::Selected(selection) => format!(
                "{} {} (support {})",
                "consensus:".green(),
                selection.candidate.raw,
                selection.support
            ),
            Decision::InsufficientConsensus(reason) => {
                format!("{} {}", "no consensus:".yellow(), reason)
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundProgressNotifier for ProgressReporter {
    fn on_round_start(&self, round: usize, requested: usize) {
        let pb = self.multi.add(ProgressBar::new(requested as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(Self::round_display_name(round));
        pb.set_message("Generating...");

        if let Ok(mut bar) = self.round_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_generation_complete(&self, _round: usize, _slot: usize, strategy: &Strategy, success: bool) {
        if let Ok(bar) = self.round_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), strategy)
            } else {
                format!("{} {}", "x".red(), strategy)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, _round: usize, decision: &Decision) {
        if let Ok(mut bar) = self.round_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(Self::decision_summary(decision));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl RoundProgressNotifier for SimpleProgress {
    fn on_round_start(&self, round: usize, requested: usize) {
        println!(
            "{} {} ({} generations)",
            "->".cyan(),
            ProgressReporter::round_display_name(round).bold(),
            requested
        );
    }

    fn on_generation_complete(&self, _round: usize, slot: usize, strategy: &Strategy, success: bool) {
        if success {
            println!("  {} [{}] {}", "v".green(), slot, strategy);
        } else {
            println!("  {} [{}] {} (failed)", "x".red(), slot, strategy);
        }
    }

    fn on_round_complete(&self, _round: usize, decision: &Decision) {
        println!("  {}", ProgressReporter::decision_summary(decision));
        println!();
    }
}
