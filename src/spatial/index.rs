use crate::core::geo::{LatLng, LatLngBounds};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A point item that can be indexed via an R-tree, stored in (lng, lat) space
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub position: LatLng,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(position: LatLng, data: T) -> Self {
        Self { position, data }
    }

    fn coords(&self) -> [f64; 2] {
        [self.position.lng, self.position.lat]
    }
}

impl<T: PartialEq> PartialEq for SpatialItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.data == other.data
    }
}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords())
    }
}

impl<T> PointDistance for SpatialItem<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let [x, y] = self.coords();
        let dx = x - point[0];
        let dy = y - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree index of geographic points
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
}

impl<T> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
        }
    }

    /// Builds the tree in one pass, which packs it better than repeated inserts
    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        Self {
            rtree: RTree::bulk_load(items),
        }
    }

    pub fn insert(&mut self, item: SpatialItem<T>) {
        self.rtree.insert(item);
    }

    /// Items inside the given geographic box; a box crossing the
    /// antimeridian is searched as its two halves
    pub fn query(&self, bounds: &LatLngBounds) -> Vec<&SpatialItem<T>> {
        let (south, north) = (bounds.south_west.lat, bounds.north_east.lat);
        let spans = if bounds.crosses_antimeridian() {
            vec![
                (bounds.south_west.lng, 180.0),
                (-180.0, bounds.north_east.lng),
            ]
        } else {
            vec![(bounds.south_west.lng, bounds.north_east.lng)]
        };

        spans
            .into_iter()
            .flat_map(|(west, east)| {
                let envelope = AABB::from_corners([west, south], [east, north]);
                self.rtree.locate_in_envelope(&envelope)
            })
            .collect()
    }

    /// Item closest to the position in (lng, lat) space
    pub fn nearest(&self, position: &LatLng) -> Option<&SpatialItem<T>> {
        self.rtree.nearest_neighbor(&[position.lng, position.lat])
    }

    pub fn all_items(&self) -> impl Iterator<Item = &SpatialItem<T>> {
        self.rtree.iter()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn clear(&mut self) {
        self.rtree = RTree::new();
    }

    /// Bounds enclosing every item
    pub fn bounds(&self) -> Option<LatLngBounds> {
        if self.is_empty() {
            return None;
        }
        let envelope = self.rtree.root().envelope();
        Some(LatLngBounds::from_coords(
            envelope.lower()[1],
            envelope.lower()[0],
            envelope.upper()[1],
            envelope.upper()[0],
        ))
    }
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
