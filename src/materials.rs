// Registry of built-in wall materials

use crate::parameters::FurmanPiviParameters;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Built-in parameter sets keyed by material name.
static MATERIALS: Lazy<HashMap<&'static str, FurmanPiviParameters>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("copper", FurmanPiviParameters::copper());
    m
});

/// Look up the parameter set for a named wall material.
///
/// Names are case-insensitive. Unknown materials are an error listing the
/// available choices.
pub fn material_parameters(name: &str) -> Result<FurmanPiviParameters, String> {
    let key = name.to_ascii_lowercase();
    MATERIALS.get(key.as_str()).cloned().ok_or_else(|| {
        let mut known: Vec<&str> = MATERIALS.keys().copied().collect();
        known.sort();
        format!(
            "Unknown wall material '{}'. Available materials: {}",
            name,
            known.join(", ")
        )
    })
}
