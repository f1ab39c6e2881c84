use crate::SimulationSummary;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::mpsc::Receiver;

fn format_summaries(summaries: HashMap<usize, SimulationSummary>) -> Vec<(usize, String)> {
    const WIDTH: usize = 80;
    let mut formatted = summaries
        .into_iter()
        .map(|(id, summary)| {
            let sim_num = format!("simulation #{}", id);
            let header = format!("{:-^WIDTH$}\n", sim_num);
            (id, format!("{}{}{}\n", header, summary, "-".repeat(WIDTH)))
        })
        .collect::<Vec<(usize, String)>>();
    formatted.sort_by_key(|(id, _)| *id);
    formatted
}

/// A public function to drain `SimulationSummary` data off the channel and
/// write a formatted report to `writer`. Each received summary carries the
/// running totals for its simulation id, so only the latest per id is kept;
/// a `None` on the channel marks that id as finished. Writing happens once
/// every id has finished (or every sender has hung up).
pub fn write_summaries(
    receiver: Receiver<(Option<SimulationSummary>, usize)>,
    mut ids: HashSet<usize>,
    mut writer: impl Write,
) -> std::io::Result<()> {
    let mut summaries: HashMap<usize, SimulationSummary> = HashMap::new();
    while let Ok((cur_summary, id)) = receiver.recv() {
        if let Some(cur_sum) = cur_summary {
            summaries.insert(id, cur_sum);
        } else {
            ids.remove(&id);
            if ids.is_empty() {
                // We have no more stats to process
                break;
            }
        }
    }

    // Write data to writer
    for (_, summary_str) in format_summaries(summaries) {
        writer.write_all(summary_str.as_bytes())?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn summary(label: &str, wins: i32) -> SimulationSummary {
        SimulationSummary {
            wins,
            pushes: 1,
            losses: 2,
            early_endings: 0,
            winnings: 10,
            num_rounds: 10,
            player_naturals: 0,
            label: label.to_string(),
        }
    }

    #[test]
    fn keeps_the_latest_summary_per_id_and_writes_in_id_order() {
        let (sender, receiver) = mpsc::channel();
        sender.send((Some(summary("stand on 15", 1)), 2)).unwrap();
        sender.send((Some(summary("dealer mimic", 3)), 1)).unwrap();
        sender.send((Some(summary("dealer mimic", 7)), 1)).unwrap();
        sender.send((None, 1)).unwrap();
        sender.send((None, 2)).unwrap();

        let mut out = Vec::new();
        write_summaries(receiver, HashSet::from_iter([1, 2]), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();

        let mimic_at = report.find("dealer mimic").unwrap();
        let stand_at = report.find("stand on 15").unwrap();
        assert!(mimic_at < stand_at);
        // The superseded first summary for id 1 is gone.
        assert_eq!(report.matches("dealer mimic").count(), 1);
        assert!(report.contains("simulation #1"));
        assert!(report.contains("simulation #2"));
    }

    #[test]
    fn hung_up_senders_still_produce_a_report() {
        let (sender, receiver) = mpsc::channel();
        sender.send((Some(summary("basic strategy", 5)), 1)).unwrap();
        drop(sender);

        let mut out = Vec::new();
        write_summaries(receiver, HashSet::from_iter([1, 2]), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("basic strategy"));
    }
}
