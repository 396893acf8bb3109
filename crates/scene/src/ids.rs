//! Id generation for scenes and hotspots.

use foundation::Millis;

use crate::model::Scene;

/// Slug used as a scene id: lower-cased, whitespace runs collapsed to `-`,
/// everything outside `[a-z0-9-]` dropped.
///
/// Returns `None` for a blank name or one with no usable characters.
pub fn scene_id_from_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return None;
    }
    let lowered = name.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            out.push(c);
        }
    }
    if out.is_empty() { None } else { Some(out) }
}

/// `hs-<scene>-<millis>`, the id shape new hotspots get.
pub fn hotspot_id(scene_id: &str, at: Millis) -> String {
    format!("hs-{scene_id}-{at}")
}

/// Like [`hotspot_id`], with a numeric suffix when the scene already has that id
/// (two hotspots created within the same millisecond).
pub fn unique_hotspot_id(scene: &Scene, at: Millis) -> String {
    let base = hotspot_id(&scene.id, at);
    if !scene.has_hotspot(&base) {
        return base;
    }
    (1u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !scene.has_hotspot(candidate))
        .unwrap_or(base)
}
