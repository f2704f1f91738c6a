use crate::{
    core::{geo::Point, viewport::Viewport},
    data::table::TableRow,
    layers::base::LayerTrait,
    prelude::HashMap,
    MapError, Result,
};

/// Manages layers for the map, handling ordering and hit-testing
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Layer IDs sorted by z-index, bottom first
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer to the manager; ids must be unique
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(Box::new(MapError::Layer(format!(
                "layer `{}` already exists",
                layer_id
            ))));
        }
        let z_index = layer.z_index();
        self.layers.insert(layer_id.clone(), layer);

        // render_order stays sorted; equal z-indexes keep insertion order
        let insert_pos = self.render_order.partition_point(|id| {
            self.layers
                .get(id)
                .map_or(false, |l| l.z_index() <= z_index)
        });
        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Gets a mutable reference to a layer by ID
    pub fn get_layer_mut(&mut self, layer_id: &str) -> Option<&mut (dyn LayerTrait + 'static)> {
        self.layers.get_mut(layer_id).map(|l| l.as_mut())
    }

    /// Lists layer IDs, bottom first
    pub fn list_layers(&self) -> Vec<String> {
        self.render_order.clone()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Finds the topmost visible, interactive layer with a feature under the pixel
    pub fn hit_test(&self, viewport: &Viewport, pixel: &Point) -> Option<(String, TableRow)> {
        self.render_order.iter().rev().find_map(|id| {
            let layer = self.layers.get(id)?;
            if !layer.is_visible() || !layer.is_interactive() {
                return None;
            }
            layer
                .feature_at(viewport, pixel)
                .map(|row| (id.clone(), row))
        })
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
