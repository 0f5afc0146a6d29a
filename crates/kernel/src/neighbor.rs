//! Uniform-grid spatial hash for neighbor search with per-axis periodicity.
//!
//! Uses sorted-index + cell-offset arrays rather than `HashMap` so the data
//! layout stays flat and cache friendly. Periodic axes wrap both the cell
//! neighborhood and the displacement vector (minimal-image convention), which
//! is how the channel emulates an infinite domain along the streamwise and
//! spanwise directions.

/// Which axes of the domain wrap around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Periodicity {
    /// Wrap along x.
    pub x: bool,
    /// Wrap along y.
    pub y: bool,
    /// Wrap along z.
    pub z: bool,
}

impl Periodicity {
    /// No periodic axes.
    pub fn none() -> Self {
        Self::default()
    }

    /// Periodic along x and z, bounded along y (channel flow).
    pub fn streamwise_spanwise() -> Self {
        Self {
            x: true,
            y: false,
            z: true,
        }
    }

    fn axis(&self, a: usize) -> bool {
        match a {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

/// Uniform-grid spatial hash for O(1) neighbor cell lookup.
///
/// The grid covers a fixed axis-aligned domain. Cell size should equal the
/// kernel support radius (2h) so that for any point the 27 (3x3x3) adjacent
/// cells contain all potential neighbors within distance 2h.
pub struct NeighborGrid {
    cell_size: f32,
    grid_min: [f32; 3],
    extent: [f32; 3],
    grid_dims: [u32; 3],
    periodicity: Periodicity,
    /// Cell index for each particle (parallel to particle arrays).
    cell_indices: Vec<u32>,
    /// Particle indices sorted by cell index.
    sorted_indices: Vec<u32>,
    /// Start offset in `sorted_indices` for each cell.
    cell_offsets: Vec<u32>,
    /// Number of particles in each cell.
    cell_counts: Vec<u32>,
}

impl NeighborGrid {
    /// Create a new neighbor grid covering `[domain_min, domain_max]`.
    ///
    /// `cell_size` should be set to the kernel support radius (typically 2h).
    /// On periodic axes, positions passed to [`NeighborGrid::update`] must
    /// already be wrapped into the domain.
    pub fn new(
        cell_size: f32,
        domain_min: [f32; 3],
        domain_max: [f32; 3],
        periodicity: Periodicity,
    ) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        let extent = [
            domain_max[0] - domain_min[0],
            domain_max[1] - domain_min[1],
            domain_max[2] - domain_min[2],
        ];
        let dims = [
            (extent[0] / cell_size).floor().max(1.0) as u32,
            (extent[1] / cell_size).floor().max(1.0) as u32,
            (extent[2] / cell_size).floor().max(1.0) as u32,
        ];
        let total_cells = (dims[0] as usize) * (dims[1] as usize) * (dims[2] as usize);
        Self {
            cell_size,
            grid_min: domain_min,
            extent,
            grid_dims: dims,
            periodicity,
            cell_indices: Vec::new(),
            sorted_indices: Vec::new(),
            cell_offsets: vec![0; total_cells],
            cell_counts: vec![0; total_cells],
        }
    }

    /// Total number of cells in the grid.
    pub fn total_cells(&self) -> usize {
        (self.grid_dims[0] as usize)
            * (self.grid_dims[1] as usize)
            * (self.grid_dims[2] as usize)
    }

    /// Wrap a position into the domain along the periodic axes.
    ///
    /// Non-periodic components are returned unchanged.
    pub fn wrap_point(&self, p: [f32; 3]) -> [f32; 3] {
        let mut wrapped = p;
        for a in 0..3 {
            if self.periodicity.axis(a) {
                wrapped[a] = self.grid_min[a]
                    + (p[a] - self.grid_min[a]).rem_euclid(self.extent[a]);
            }
        }
        wrapped
    }

    /// Apply the minimal-image convention to a displacement component.
    #[inline]
    fn minimal_image(&self, mut d: f32, axis: usize) -> f32 {
        if self.periodicity.axis(axis) {
            let l = self.extent[axis];
            if d > 0.5 * l {
                d -= l;
            } else if d < -0.5 * l {
                d += l;
            }
        }
        d
    }

    /// Map a world-space position to a cell (cx, cy, cz).
    ///
    /// Periodic axes wrap; bounded axes clamp to the grid.
    #[inline]
    fn pos_to_cell(&self, px: f32, py: f32, pz: f32) -> (u32, u32, u32) {
        let p = [px, py, pz];
        let mut cell = [0u32; 3];
        for a in 0..3 {
            let c = ((p[a] - self.grid_min[a]) / self.cell_size).floor() as i64;
            let n = self.grid_dims[a] as i64;
            cell[a] = if self.periodicity.axis(a) {
                c.rem_euclid(n) as u32
            } else {
                c.clamp(0, n - 1) as u32
            };
        }
        (cell[0], cell[1], cell[2])
    }

    /// Flat cell index from (cx, cy, cz).
    #[inline]
    fn cell_hash(&self, cx: u32, cy: u32, cz: u32) -> u32 {
        cx + cy * self.grid_dims[0] + cz * self.grid_dims[0] * self.grid_dims[1]
    }

    /// The 1D neighbor cell coordinates around `c` along one axis, with
    /// periodic wrap and deduplication (a periodic axis with fewer than
    /// three cells would otherwise visit the same cell twice).
    fn axis_neighbors(&self, c: u32, axis: usize) -> ([u32; 3], usize) {
        let n = self.grid_dims[axis] as i64;
        let mut out = [0u32; 3];
        let mut count = 0;
        for d in -1i64..=1 {
            let nc = c as i64 + d;
            let wrapped = if self.periodicity.axis(axis) {
                nc.rem_euclid(n)
            } else {
                if nc < 0 || nc >= n {
                    continue;
                }
                nc
            } as u32;
            if !out[..count].contains(&wrapped) {
                out[count] = wrapped;
                count += 1;
            }
        }
        (out, count)
    }

    /// Rebuild the grid from current particle positions.
    ///
    /// The three slices must all have the same length (one entry per particle).
    pub fn update(&mut self, x: &[f32], y: &[f32], z: &[f32]) {
        let n = x.len();
        debug_assert_eq!(n, y.len());
        debug_assert_eq!(n, z.len());

        let total_cells = self.total_cells();

        // --- 1. Compute cell index for each particle ---
        self.cell_indices.resize(n, 0);
        for i in 0..n {
            let (cx, cy, cz) = self.pos_to_cell(x[i], y[i], z[i]);
            self.cell_indices[i] = self.cell_hash(cx, cy, cz);
        }

        // --- 2. Count particles per cell ---
        self.cell_counts.clear();
        self.cell_counts.resize(total_cells, 0);
        for &ci in &self.cell_indices {
            self.cell_counts[ci as usize] += 1;
        }

        // --- 3. Prefix-sum to get cell offsets ---
        self.cell_offsets.clear();
        self.cell_offsets.resize(total_cells, 0);
        let mut running = 0u32;
        for c in 0..total_cells {
            self.cell_offsets[c] = running;
            running += self.cell_counts[c];
        }

        // --- 4. Scatter particle indices into sorted order ---
        self.sorted_indices.resize(n, 0);
        let mut write_heads: Vec<u32> = self.cell_offsets.clone();
        for i in 0..n {
            let ci = self.cell_indices[i] as usize;
            let pos = write_heads[ci] as usize;
            self.sorted_indices[pos] = i as u32;
            write_heads[ci] += 1;
        }
    }

    /// Particle indices in cell order, as built by the last
    /// [`NeighborGrid::update`]. Used for cell-order particle sorting.
    pub fn cell_order(&self) -> &[u32] {
        &self.sorted_indices
    }

    /// Iterate over all neighbors of the point `(px, py, pz)` within `radius`.
    ///
    /// For each candidate, the closure `f` is invoked with
    /// `(j, dx, dy, dz, r)` where `(dx, dy, dz)` is the minimal-image
    /// displacement from particle `j` to the query point and `r` its norm.
    /// `skip` suppresses one particle index (the query particle itself);
    /// pass `usize::MAX` for free-point queries.
    #[allow(clippy::too_many_arguments)]
    fn for_each_near<F>(
        &self,
        px: f32,
        py: f32,
        pz: f32,
        skip: usize,
        x: &[f32],
        y: &[f32],
        z: &[f32],
        radius: f32,
        mut f: F,
    ) where
        F: FnMut(usize, f32, f32, f32, f32),
    {
        let (cx, cy, cz) = self.pos_to_cell(px, py, pz);
        let radius_sq = radius * radius;

        let (xs, nx) = self.axis_neighbors(cx, 0);
        let (ys, ny) = self.axis_neighbors(cy, 1);
        let (zs, nz) = self.axis_neighbors(cz, 2);

        for &ncz in &zs[..nz] {
            for &ncy in &ys[..ny] {
                for &ncx in &xs[..nx] {
                    let cell = self.cell_hash(ncx, ncy, ncz) as usize;
                    let start = self.cell_offsets[cell] as usize;
                    let count = self.cell_counts[cell] as usize;

                    for s in start..start + count {
                        let j = self.sorted_indices[s] as usize;
                        if j == skip {
                            continue;
                        }
                        let dx = self.minimal_image(px - x[j], 0);
                        let dy = self.minimal_image(py - y[j], 1);
                        let dz = self.minimal_image(pz - z[j], 2);
                        let dist_sq = dx * dx + dy * dy + dz * dz;
                        if dist_sq <= radius_sq {
                            f(j, dx, dy, dz, dist_sq.sqrt());
                        }
                    }
                }
            }
        }
    }

    /// Iterate over all neighbors of `particle_idx` within `radius`.
    ///
    /// The closure receives `(j, dx, dy, dz, r)`: the neighbor index, the
    /// minimal-image displacement from `j` to `particle_idx`, and the
    /// distance. Callers should never recompute displacements themselves,
    /// otherwise they would miss the periodic image.
    pub fn for_each_neighbor<F>(
        &self,
        particle_idx: usize,
        x: &[f32],
        y: &[f32],
        z: &[f32],
        radius: f32,
        f: F,
    ) where
        F: FnMut(usize, f32, f32, f32, f32),
    {
        self.for_each_near(
            x[particle_idx],
            y[particle_idx],
            z[particle_idx],
            particle_idx,
            x,
            y,
            z,
            radius,
            f,
        );
    }

    /// Iterate over all particles within `radius` of an arbitrary point.
    ///
    /// Used for wall-pressure mirroring and observer interpolation, where the
    /// query location is not itself a particle of this grid.
    pub fn for_each_neighbor_of_point<F>(
        &self,
        point: [f32; 3],
        x: &[f32],
        y: &[f32],
        z: &[f32],
        radius: f32,
        f: F,
    ) where
        F: FnMut(usize, f32, f32, f32, f32),
    {
        let p = self.wrap_point(point);
        self.for_each_near(p[0], p[1], p[2], usize::MAX, x, y, z, radius, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_neighbors(
        grid: &NeighborGrid,
        i: usize,
        x: &[f32],
        y: &[f32],
        z: &[f32],
        radius: f32,
    ) -> Vec<usize> {
        let mut neighbors = Vec::new();
        grid.for_each_neighbor(i, x, y, z, radius, |j, _, _, _, _| neighbors.push(j));
        neighbors.sort_unstable();
        neighbors
    }

    #[test]
    fn empty_grid() {
        let grid = NeighborGrid::new(0.1, [0.0; 3], [1.0; 3], Periodicity::none());
        assert_eq!(grid.total_cells(), 10 * 10 * 10);
    }

    #[test]
    fn single_particle_no_neighbors() {
        let mut grid = NeighborGrid::new(0.2, [0.0; 3], [1.0; 3], Periodicity::none());
        let x = [0.5];
        let y = [0.5];
        let z = [0.5];
        grid.update(&x, &y, &z);
        assert!(collect_neighbors(&grid, 0, &x, &y, &z, 0.2).is_empty());
    }

    #[test]
    fn two_close_particles() {
        let mut grid = NeighborGrid::new(0.2, [0.0; 3], [1.0; 3], Periodicity::none());
        let x = [0.5, 0.51];
        let y = [0.5, 0.5];
        let z = [0.5, 0.5];
        grid.update(&x, &y, &z);

        assert_eq!(collect_neighbors(&grid, 0, &x, &y, &z, 0.2), vec![1]);
        assert_eq!(collect_neighbors(&grid, 1, &x, &y, &z, 0.2), vec![0]);
    }

    #[test]
    fn two_far_particles() {
        let mut grid = NeighborGrid::new(0.2, [0.0; 3], [1.0; 3], Periodicity::none());
        let x = [0.1, 0.9];
        let y = [0.1, 0.9];
        let z = [0.1, 0.9];
        grid.update(&x, &y, &z);
        assert!(collect_neighbors(&grid, 0, &x, &y, &z, 0.2).is_empty());
    }

    #[test]
    fn particles_across_cell_boundary() {
        let cell_size = 0.2;
        let mut grid = NeighborGrid::new(cell_size, [0.0; 3], [1.0; 3], Periodicity::none());
        let x = [0.19, 0.21];
        let y = [0.5, 0.5];
        let z = [0.5, 0.5];
        grid.update(&x, &y, &z);
        assert_eq!(collect_neighbors(&grid, 0, &x, &y, &z, cell_size), vec![1]);
    }

    #[test]
    fn periodic_seam_neighbors() {
        // Two particles on opposite sides of the periodic x seam are close
        // through the boundary, far through the interior.
        let periodicity = Periodicity {
            x: true,
            y: false,
            z: false,
        };
        let mut grid = NeighborGrid::new(0.2, [0.0; 3], [1.0; 3], periodicity);
        let x = [0.05, 0.95];
        let y = [0.5, 0.5];
        let z = [0.5, 0.5];
        grid.update(&x, &y, &z);

        assert_eq!(collect_neighbors(&grid, 0, &x, &y, &z, 0.2), vec![1]);

        // Minimal-image displacement should cross the seam: x0 - x1 = -0.9
        // wraps to +0.1.
        let mut seen = None;
        grid.for_each_neighbor(0, &x, &y, &z, 0.2, |j, dx, _, _, r| {
            seen = Some((j, dx, r));
        });
        let (j, dx, r) = seen.expect("neighbor across the seam");
        assert_eq!(j, 1);
        assert!((dx - 0.1).abs() < 1.0e-6, "dx = {dx}");
        assert!((r - 0.1).abs() < 1.0e-6, "r = {r}");
    }

    #[test]
    fn non_periodic_seam_is_closed() {
        let mut grid = NeighborGrid::new(0.2, [0.0; 3], [1.0; 3], Periodicity::none());
        let x = [0.05, 0.95];
        let y = [0.5, 0.5];
        let z = [0.5, 0.5];
        grid.update(&x, &y, &z);
        assert!(collect_neighbors(&grid, 0, &x, &y, &z, 0.2).is_empty());
    }

    #[test]
    fn point_query_finds_particles() {
        let mut grid = NeighborGrid::new(0.2, [0.0; 3], [1.0; 3], Periodicity::none());
        let x = [0.5, 0.52, 0.9];
        let y = [0.5, 0.5, 0.9];
        let z = [0.5, 0.5, 0.9];
        grid.update(&x, &y, &z);

        let mut found = Vec::new();
        grid.for_each_neighbor_of_point([0.51, 0.5, 0.5], &x, &y, &z, 0.1, |j, _, _, _, _| {
            found.push(j)
        });
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn point_query_wraps_periodic_axes() {
        // A query point outside the periodic domain wraps inside.
        let periodicity = Periodicity {
            x: true,
            y: false,
            z: false,
        };
        let mut grid = NeighborGrid::new(0.2, [0.0; 3], [1.0; 3], periodicity);
        let x = [0.05];
        let y = [0.5];
        let z = [0.5];
        grid.update(&x, &y, &z);

        let mut found = Vec::new();
        grid.for_each_neighbor_of_point([-0.05, 0.5, 0.5], &x, &y, &z, 0.2, |j, _, _, _, _| {
            found.push(j)
        });
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn wrap_point_only_touches_periodic_axes() {
        let periodicity = Periodicity {
            x: true,
            y: false,
            z: true,
        };
        let grid = NeighborGrid::new(0.2, [0.0, -0.5, 0.0], [1.0, 0.5, 1.0], periodicity);
        let wrapped = grid.wrap_point([1.25, 0.7, -0.1]);
        assert!((wrapped[0] - 0.25).abs() < 1.0e-6);
        assert!((wrapped[1] - 0.7).abs() < 1.0e-6); // untouched
        assert!((wrapped[2] - 0.9).abs() < 1.0e-6);
    }

    #[test]
    fn cell_order_is_a_permutation() {
        let mut grid = NeighborGrid::new(0.25, [0.0; 3], [1.0; 3], Periodicity::none());
        let x = [0.9, 0.1, 0.5, 0.3];
        let y = [0.9, 0.1, 0.5, 0.3];
        let z = [0.9, 0.1, 0.5, 0.3];
        grid.update(&x, &y, &z);

        let mut order: Vec<u32> = grid.cell_order().to_vec();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
        // Low cells come first: particle 1 is in the lowest cell.
        assert_eq!(grid.cell_order()[0], 1);
    }
}
