//! Feature aggregation — flattens item attributes into one text blob for prompting.

use crate::models::item::ItemFeatures;

/// `title brand category[ visual...]`. Absent fields contribute empty strings,
/// so separators stay in place. No length cap; the oracle boundary truncates.
pub fn aggregate_features(item: &ItemFeatures) -> String {
    let mut text = format!(
        "{} {} {}",
        item.title,
        item.brand.as_deref().unwrap_or_default(),
        item.category.as_deref().unwrap_or_default()
    );
    if let Some(visual) = &item.visual_attributes {
        text.push(' ');
        text.push_str(&visual.join(" "));
    }
    text
}
