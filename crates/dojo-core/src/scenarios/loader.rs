//! External scenario file loader.

use dojo_shared::Scenario;
use std::path::Path;

/// Recursively walks `dir`, parsing every `.json` file whose shape matches
/// the `Scenario` schema. Malformed files are skipped silently — a
/// deliberate non-fatal boundary so one bad file doesn't abort a whole
/// directory of otherwise-usable scenarios.
pub fn load_external_scenarios(dir: &Path) -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    walk(dir, &mut scenarios);
    scenarios
}

fn walk(dir: &Path, out: &mut Vec<Scenario>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out);
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        if let Ok(scenario) = serde_json::from_str::<Scenario>(&content) {
            out.push(scenario);
        } else {
            tracing::debug!(path = %path.display(), "skipping malformed external scenario file");
        }
    }
}
