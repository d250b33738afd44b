//! Connected-component labelling of binary masks.
//!
//! Labelling runs in two sweeps. The first assigns provisional labels from
//! the already visited (causal) neighbours and records label equivalences in
//! a lookup table. The second resolves every provisional label to the root
//! of its equivalence chain, maps roots to compact indices in order of first
//! appearance and accumulates per-component mass and coordinate sums.
//!
//! Known limits:
//! - The outermost row and column on every side are never labelled.
//! - Labels are 16 bit and [`MAX_IDX`] is the "no cluster" value, so at
//!   most 65535 components exist. Once the label space is used up, further
//!   components are left unlabelled instead of failing.

use std::ops::Deref;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::binary_image::BinaryImage;
use crate::image::GenericImage;
use crate::pixel::{Mono16, Plant};

/// Label value meaning "no cluster".
pub const MAX_IDX: u16 = u16::MAX;
/// Upper bound on the number of clusters.
pub const MAX_CLUSTERS: usize = MAX_IDX as usize;

/// Causal neighbourhood used while labelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Up and left neighbours; diagonal pixels are separate components.
    #[default]
    Four,
    /// Upper-left, up, upper-right and left neighbours.
    Eight,
}

impl Connectivity {
    fn neighbours(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &[(0, -1), (-1, 0)],
            Connectivity::Eight => &[(-1, -1), (0, -1), (1, -1), (-1, 0)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterItem {
    pub id: u16,
    pub mass: u64,
    pub sum_x: u64,
    pub sum_y: u64,
    pub cx: u32,
    pub cy: u32,
    pub fcx: f64,
    pub fcy: f64,
    // Merge bookkeeping, only meaningful inside merge_nearby_clusters.
    used: bool,
    parent: usize,
}

impl ClusterItem {
    fn start(id: u16, mass: u64, x: u32, y: u32) -> Self {
        Self {
            id,
            mass,
            sum_x: mass * x as u64,
            sum_y: mass * y as u64,
            parent: id as usize,
            ..Self::default()
        }
    }

    fn accumulate(&mut self, mass: u64, x: u32, y: u32) {
        self.mass += mass;
        self.sum_x += mass * x as u64;
        self.sum_y += mass * y as u64;
    }

    fn absorb(&mut self, other: &ClusterItem) {
        self.mass += other.mass;
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
    }

    /// Derives the centroids from the sums. No-op for zero mass.
    pub fn calculate_center(&mut self) {
        if self.mass > 0 {
            self.cx = (self.sum_x / self.mass) as u32;
            self.cy = (self.sum_y / self.mass) as u32;
            self.fcx = self.sum_x as f64 / self.mass as f64;
            self.fcy = self.sum_y as f64 / self.mass as f64;
        }
    }

    pub fn distance_to(&self, other: &ClusterItem) -> f64 {
        (self.fcx - other.fcx).hypot(self.fcy - other.fcy)
    }
}

/// Label image plus the clusters found in it.
///
/// After a successful run every labelled pixel holds the index of its
/// cluster in [`clusters`](Cluster::clusters), and every other pixel holds
/// [`MAX_IDX`].
#[derive(Debug, Clone)]
pub struct Cluster {
    labels: GenericImage<u16, 1>,
    items: Vec<ClusterItem>,
    equivalence: Vec<u16>,
    connectivity: Connectivity,
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

impl Cluster {
    pub fn new() -> Self {
        Self::with_connectivity(Connectivity::default())
    }

    pub fn with_connectivity(connectivity: Connectivity) -> Self {
        Self {
            labels: GenericImage::new(),
            items: Vec::new(),
            equivalence: vec![MAX_IDX; MAX_IDX as usize + 1],
            connectivity,
        }
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn set_connectivity(&mut self, connectivity: Connectivity) {
        self.connectivity = connectivity;
    }

    /// Labels `mask`, counting every set pixel with weight 1. Returns the
    /// number of clusters.
    pub fn clusterize(&mut self, mask: &BinaryImage) -> u16 {
        self.label(mask);
        self.extract::<u8>(mask)
    }

    /// Labels `mask` and weights each pixel by the co-located value of
    /// `mass`. Clusters whose pixels all weigh zero are kept with zero mass.
    pub fn clusterize_mask<T: Plant>(&mut self, mass: &GenericImage<T, 1>, mask: &BinaryImage) -> u16 {
        assert_eq!(
            mass.dimensions(),
            mask.dimensions(),
            "mass image and mask must have the same size"
        );
        self.label(mask);
        self.extract(mass)
    }

    pub fn clusters_amount(&self) -> u16 {
        self.items.len() as u16
    }

    pub fn cluster(&self, idx: u16) -> &ClusterItem {
        &self.items[idx as usize]
    }

    pub fn clusters(&self) -> &[ClusterItem] {
        &self.items
    }

    /// Cluster index at `(x, y)`, `None` for unlabelled pixels.
    pub fn label_at(&self, x: u32, y: u32) -> Option<u16> {
        match self.labels.get_plant(x, y, 0) {
            MAX_IDX => None,
            idx => Some(idx),
        }
    }

    fn label(&mut self, mask: &BinaryImage) {
        let (width, height) = mask.dimensions();
        self.labels.create_filled(width, height, Mono16::from(MAX_IDX));
        self.items.clear();
        self.equivalence.fill(MAX_IDX);

        let w = width as usize;
        let offsets: Vec<isize> = self
            .connectivity
            .neighbours()
            .iter()
            .map(|&(dx, dy)| dy as isize * w as isize + dx as isize)
            .collect();
        let mut next: u16 = 0;
        let mut saturated = false;
        let mut neighbour_labels = [MAX_IDX; 4];

        for y in 1..height.saturating_sub(1) {
            let mut center = self.labels.cursor_at_mut(1, y);
            let mut src = mask.cursor_at(1, y);
            for _ in 1..width.saturating_sub(1) {
                if mask[src][0] > 0 {
                    let neighbour_labels = &mut neighbour_labels[..offsets.len()];
                    for (label, &offset) in neighbour_labels.iter_mut().zip(&offsets) {
                        *label = self.labels[center.offset(offset)][0];
                    }

                    let mut c = neighbour_labels.iter().copied().min().unwrap_or(MAX_IDX);
                    for &other in neighbour_labels.iter() {
                        if other != c && other != MAX_IDX {
                            while self.equivalence[c as usize] != c {
                                c = self.equivalence[c as usize];
                            }
                            self.equivalence[other as usize] = c;
                        }
                    }

                    if c < MAX_IDX {
                        self.labels[center][0] = c;
                    } else if next < MAX_IDX {
                        self.labels[center][0] = next;
                        self.equivalence[next as usize] = next;
                        next += 1;
                    } else if !saturated {
                        saturated = true;
                        warn!(
                            "Cluster label space exhausted at ({}, {}); further components stay unlabelled",
                            center.index() % w,
                            y
                        );
                    }
                }
                center.step();
                src.step();
            }
        }
        debug!("Labelled {}x{} mask with {} provisional labels", width, height, next);
    }

    fn root(&self, mut label: u16) -> u16 {
        while self.equivalence[label as usize] != label {
            label = self.equivalence[label as usize];
        }
        label
    }

    fn extract<T: Plant>(&mut self, mass: &GenericImage<T, 1>) -> u16 {
        let mut index_of_root = vec![MAX_IDX; MAX_IDX as usize + 1];
        let width = self.labels.width();
        let mut cursor = self.labels.begin_mut();
        let mut weights = mass.begin();
        let end = self.labels.end_mut();
        let mut pos = 0usize;

        while cursor != end {
            let label = self.labels[cursor][0];
            if label != MAX_IDX {
                let x = (pos % width as usize) as u32;
                let y = (pos / width as usize) as u32;
                let p = mass[weights][0].to_u64();
                let root = self.root(label);
                let idx = match index_of_root[root as usize] {
                    MAX_IDX => {
                        let idx = self.items.len() as u16;
                        index_of_root[root as usize] = idx;
                        self.items.push(ClusterItem::start(idx, p, x, y));
                        idx
                    }
                    idx => {
                        self.items[idx as usize].accumulate(p, x, y);
                        idx
                    }
                };
                self.labels[cursor][0] = idx;
            }
            cursor.step();
            weights.step();
            pos += 1;
        }

        for item in &mut self.items {
            item.calculate_center();
        }
        self.items.len() as u16
    }

    /// Merges clusters whose floating centroids are closer than `distance`
    /// and returns the new cluster count.
    ///
    /// Pairs are visited in index order. A pair of untouched clusters merges
    /// into its first member; a pair with one merged member folds the other
    /// into that member's root; a pair whose members are both merged already
    /// is skipped, so chains spanning two earlier merges stay apart within a
    /// single call. Distances are taken between the centroids as they were
    /// before the call.
    pub fn merge_nearby_clusters(&mut self, distance: f64) -> u16 {
        let n = self.items.len();
        for (i, item) in self.items.iter_mut().enumerate() {
            item.used = false;
            item.parent = i;
        }
        let centers: Vec<(f64, f64)> = self.items.iter().map(|c| (c.fcx, c.fcy)).collect();

        for i in 0..n {
            for j in i + 1..n {
                let d = (centers[i].0 - centers[j].0).hypot(centers[i].1 - centers[j].1);
                // NaN distances merge nothing.
                if !(d < distance) {
                    continue;
                }
                match (self.items[i].used, self.items[j].used) {
                    (false, false) => {
                        self.items[i].used = true;
                        self.fold_into(i, j);
                    }
                    (true, false) => {
                        let root = self.merge_root(i);
                        self.fold_into(root, j);
                    }
                    (false, true) => {
                        let root = self.merge_root(j);
                        self.fold_into(root, i);
                    }
                    (true, true) => {}
                }
            }
        }

        let mut new_index = vec![MAX_IDX; n];
        let mut survivors = Vec::with_capacity(n);
        for (i, item) in self.items.iter().enumerate() {
            if item.parent == i {
                new_index[i] = survivors.len() as u16;
                let mut survivor = item.clone();
                survivor.calculate_center();
                survivors.push(survivor);
            }
        }
        for i in 0..n {
            if new_index[i] == MAX_IDX {
                new_index[i] = new_index[self.merge_root(i)];
            }
        }
        for (idx, item) in survivors.iter_mut().enumerate() {
            item.id = idx as u16;
            item.used = false;
            item.parent = idx;
        }
        self.items = survivors;

        for label in self.labels.data_mut() {
            if *label != MAX_IDX {
                *label = new_index[*label as usize];
            }
        }
        debug!("Merged {} clusters into {} (distance {})", n, self.items.len(), distance);
        self.items.len() as u16
    }

    fn merge_root(&self, mut idx: usize) -> usize {
        while self.items[idx].parent != idx {
            idx = self.items[idx].parent;
        }
        idx
    }

    fn fold_into(&mut self, root: usize, other: usize) {
        let absorbed = self.items[other].clone();
        self.items[root].absorb(&absorbed);
        self.items[other].used = true;
        self.items[other].parent = root;
    }
}

impl Deref for Cluster {
    type Target = GenericImage<u16, 1>;

    fn deref(&self) -> &Self::Target {
        &self.labels
    }
}
