//! Exporting the current selection as a reusable fragment.

use serde::{Deserialize, Serialize};

use crate::canvas::object::CanvasObject;
use crate::export::exporter::export_layer;
use crate::foundation::core::{Rect, Vec2};
use crate::foundation::ids;
use crate::layer::model::Layer;
use crate::layer::types::LayerType;

/// What a [`Component`] was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    /// One plain object.
    Single,
    /// A group or several objects.
    Mixed,
}

/// A standalone layer fragment for copy/paste-as-asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Single object or mixed content.
    pub category: ComponentCategory,
    /// Distinct leaf types inside the fragment.
    pub types: Vec<LayerType>,
    /// Frame-relative layer; several objects arrive wrapped in a group.
    pub layer: Layer,
}

/// Build a component from selected objects (z-order). `None` when nothing is selected.
pub fn build_component(selected: &[&CanvasObject], frame_offset: Vec2) -> Option<Component> {
    let (first, rest) = selected.split_first()?;

    let mut types = Vec::new();
    for obj in selected {
        obj.leaf_types(&mut types);
    }

    if rest.is_empty() {
        let category = if first.layer_type().is_container() {
            ComponentCategory::Mixed
        } else {
            ComponentCategory::Single
        };
        let mut layer = export_layer(&first.to_layer(), frame_offset);
        clear_clips(&mut layer);
        return Some(Component {
            category,
            types,
            layer,
        });
    }

    let bounds = selected
        .iter()
        .map(|o| o.bounding_box())
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO);
    let members = selected
        .iter()
        .map(|o| {
            let mut layer = o.to_layer();
            layer.base.left = Some(layer.base.left() - bounds.x0);
            layer.base.top = Some(layer.base.top() - bounds.y0);
            clear_clips(&mut layer);
            layer
        })
        .collect();
    let group = Layer::group(members)
        .with_id(ids::new_id())
        .at(bounds.x0 - frame_offset.x, bounds.y0 - frame_offset.y)
        .sized(bounds.width(), bounds.height());

    Some(Component {
        category: ComponentCategory::Mixed,
        types,
        layer: group,
    })
}

fn clear_clips(layer: &mut Layer) {
    layer.base.clip_path = None;
    if let Some(children) = layer.children_mut() {
        for child in children {
            clear_clips(child);
        }
    }
}
