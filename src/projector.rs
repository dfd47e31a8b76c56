//! Projects per-type indexes through a viewport into the displayed feature list.

use crate::marker::{DisplayedFeature, Feature};
use crate::partition::TypeIndexes;
use crate::viewport::Viewport;

/// Query every index at `viewport`, tag each result with its type, and
/// append the passthrough features.
///
/// Types are visited in first-seen order and each index answers in level
/// order, so identical inputs always produce an identical list.
pub fn project_clusters(
    indexes: &TypeIndexes,
    passthrough: &[Feature],
    viewport: &Viewport,
) -> Vec<DisplayedFeature> {
    let mut displayed = Vec::new();

    for (marker_type, index) in indexes.iter() {
        let features = index.clusters(&viewport.bbox, viewport.zoom);
        log::debug!(
            "Type '{}' projects to {} features at zoom {}",
            marker_type,
            features.len(),
            viewport.zoom
        );
        displayed.extend(
            features
                .into_iter()
                .map(|feature| DisplayedFeature::new(Some(marker_type.to_string()), feature)),
        );
    }

    displayed.extend(
        passthrough
            .iter()
            .cloned()
            .map(|feature| DisplayedFeature::new(None, feature)),
    );

    displayed
}
