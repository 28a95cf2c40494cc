use crate::transform::cleaner::normalise_text;

pub const UNNAMED_SERIES: &str = "Unnamed";

/// Human-readable series name: `segment - concept - [interval] - (units)`,
/// skipping whichever parts are blank.
pub fn serie_name(
    segment: Option<&str>,
    concept: Option<&str>,
    interval: Option<&str>,
    units: Option<&str>,
) -> String {
    let parts: Vec<String> = [
        normalise_text(segment),
        normalise_text(concept),
        normalise_text(interval).map(|i| format!("[{i}]")),
        normalise_text(units).map(|u| format!("({u})")),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        UNNAMED_SERIES.to_string()
    } else {
        parts.join(" - ")
    }
}
