//! Toolbar icon state.

use devbar_host::IconSpec;

const ICON_SIZES: [u32; 2] = [19, 38];

/// Icon bitmaps for the enabled or disabled toolbar state.
pub fn icon_spec(enabled: bool) -> IconSpec {
    let suffix = if enabled { "" } else { "-disabled" };
    IconSpec {
        path: ICON_SIZES
            .iter()
            .map(|size| (*size, format!("assets/images/icon-{size}{suffix}.png")))
            .collect(),
    }
}
