//! Post-close tallying

use agora_core::Poll;

/// Sum ballot contributions per option, in option order
///
/// Options nobody picked total 0.0; ballots pointing at an index outside
/// the option list (impossible through the cast path) are skipped rather
/// than counted anywhere.
pub fn tally(poll: &Poll) -> Vec<f64> {
    let mut totals = vec![0.0; poll.options.len()];
    for ballot in &poll.ballots {
        if let Some(total) = totals.get_mut(ballot.option) {
            *total += ballot.contribution;
        }
    }
    totals
}

/// Render one "label: total" line per option, totals with two decimals
pub fn result_lines(poll: &Poll) -> Vec<String> {
    poll.options
        .iter()
        .zip(tally(poll))
        .map(|(label, total)| format!("{label}: {total:.2}"))
        .collect()
}
