//! Final summary rendering.

use rach_sim_core::SimulationSummary;

/// Render the summary as human-readable text.
pub fn render_text(summary: &SimulationSummary) -> String {
    let mut out = String::new();

    out.push_str("=== Random Access Summary ===\n");
    out.push_str(&format!("Seed: {}\n", summary.seed));
    out.push_str(&format!("Subframes: {}\n", summary.subframes));
    out.push_str(&format!("Admitted: {}\n", summary.total_admitted));
    out.push_str(&format!("Connected: {}\n", summary.connected));
    out.push_str(&format!("Excluded: {}\n", summary.excluded));
    if summary.pending > 0 {
        out.push_str(&format!("Still pending: {}\n", summary.pending));
    }

    if !summary.excluded_ids.is_empty() {
        let ids: Vec<String> = summary.excluded_ids.iter().map(|id| id.0.to_string()).collect();
        out.push_str(&format!("Excluded terminals: {}\n", ids.join(", ")));
    }

    out
}

/// Render the summary as pretty-printed JSON.
pub fn render_json(summary: &SimulationSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
