//! Rendering of solve results for people and for other programs.

use std::cmp::Ordering;
use std::fmt::Write;

use serde_json::{json, Map, Value};

use crate::results::SolveResult;

/// Convert a result into a JSON document keyed by node and bar id.
///
/// ```text
/// {
///   "displacements": { id: { "ux": .., "uy": .. } },
///   "reactions":     { id: { "rx": .., "ry": .. } },
///   "bar_results":   { id: { "start", "end", "axial_force", "stress", "strain" } }
/// }
/// ```
#[must_use]
pub fn to_json(result: &SolveResult) -> Value {
    let mut displacements = Map::new();
    let mut reactions = Map::new();
    for node in result.nodes() {
        displacements.insert(
            node.id.clone(),
            json!({ "ux": node.displacement.x, "uy": node.displacement.y }),
        );
        if let Some(reaction) = node.reaction {
            reactions.insert(node.id.clone(), json!({ "rx": reaction.x, "ry": reaction.y }));
        }
    }

    let mut bar_results = Map::new();
    for bar in result.bars() {
        bar_results.insert(
            bar.id.clone(),
            json!({
                "start": bar.start,
                "end": bar.end,
                "axial_force": bar.axial_force,
                "stress": bar.stress,
                "strain": bar.strain,
            }),
        );
    }

    json!({
        "displacements": displacements,
        "reactions": reactions,
        "bar_results": bar_results,
    })
}

/// Render the compact `;`-separated summary.
///
/// One `Rx; Ry` line per node in input order (zeros for unsupported nodes),
/// followed by one `N; stress; strain` line per bar sorted by bar id. Integer
/// ids sort numerically and come before any other id. Stress and strain use a
/// three-decimal mantissa and a signed two-digit exponent, e.g. `-1.000e+05`.
#[must_use]
pub fn render_summary(result: &SolveResult) -> String {
    let mut output = String::new();

    for node in result.nodes() {
        let reaction = node.reaction.unwrap_or_default();
        writeln!(
            &mut output,
            "{:.1}; {:.1}",
            clean_zero(reaction.x),
            clean_zero(reaction.y)
        )
        .expect("writing to string cannot fail");
    }

    let mut bars: Vec<_> = result.bars().iter().collect();
    bars.sort_by(|a, b| compare_ids(&a.id, &b.id));
    for bar in bars {
        writeln!(
            &mut output,
            "{:.1}; {}; {}",
            clean_zero(bar.axial_force),
            scientific(bar.stress),
            scientific(bar.strain)
        )
        .expect("writing to string cannot fail");
    }

    output
}

/// Order integer ids numerically ahead of all other ids, which compare as text.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
    .then_with(|| a.cmp(b))
}

/// `{:.3e}` with the exponent written as a sign and at least two digits.
fn scientific(value: f64) -> String {
    let formatted = format!("{value:.3e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

/// Map values that round to zero at one decimal onto `0.0` so `-0.0` is never printed.
fn clean_zero(value: f64) -> f64 {
    if value.abs() < 0.05 {
        0.0
    } else {
        value
    }
}
