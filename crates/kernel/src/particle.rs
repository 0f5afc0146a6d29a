//! Particle data structures using struct-of-arrays layout for SIMD-friendly sweeps.

/// Struct-of-arrays fluid particle storage.
///
/// All arrays are parallel: index `i` across every array refers to the same
/// particle. Separate x/y/z arrays (rather than a Vec3 type) are used
/// deliberately so the per-operator loops stay flat and vectorizable.
#[derive(Debug, Clone)]
pub struct ParticleArrays {
    // ---- Positions ----
    /// X positions (streamwise)
    pub x: Vec<f32>,
    /// Y positions (wall-normal)
    pub y: Vec<f32>,
    /// Z positions (spanwise)
    pub z: Vec<f32>,

    // ---- Velocities ----
    /// X velocities
    pub vx: Vec<f32>,
    /// Y velocities
    pub vy: Vec<f32>,
    /// Z velocities
    pub vz: Vec<f32>,

    // ---- Accelerations (pressure relaxation scratch) ----
    /// X accelerations
    pub ax: Vec<f32>,
    /// Y accelerations
    pub ay: Vec<f32>,
    /// Z accelerations
    pub az: Vec<f32>,

    // ---- Scalar fields ----
    /// Density
    pub density: Vec<f32>,
    /// Pressure
    pub pressure: Vec<f32>,
    /// Particle mass
    pub mass: Vec<f32>,
}

impl ParticleArrays {
    /// Create an empty particle collection with no particles allocated.
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            vx: Vec::new(),
            vy: Vec::new(),
            vz: Vec::new(),
            ax: Vec::new(),
            ay: Vec::new(),
            az: Vec::new(),
            density: Vec::new(),
            pressure: Vec::new(),
            mass: Vec::new(),
        }
    }

    /// Return the number of particles currently stored.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Return `true` if there are no particles.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Append a single particle with the given position, mass, density, and
    /// initial velocity. Acceleration and pressure start at zero.
    pub fn push_particle(
        &mut self,
        px: f32,
        py: f32,
        pz: f32,
        mass: f32,
        density: f32,
        velocity: [f32; 3],
    ) {
        self.x.push(px);
        self.y.push(py);
        self.z.push(pz);
        self.vx.push(velocity[0]);
        self.vy.push(velocity[1]);
        self.vz.push(velocity[2]);
        self.ax.push(0.0);
        self.ay.push(0.0);
        self.az.push(0.0);
        self.density.push(density);
        self.pressure.push(0.0);
        self.mass.push(mass);
    }

    /// Reorder all arrays by the given permutation: entry `i` of every new
    /// array is old entry `order[i]`.
    ///
    /// Used by cell-order particle sorting to restore memory locality after
    /// particles have drifted. `order` must be a permutation of `0..len()`.
    pub fn reorder(&mut self, order: &[u32]) {
        debug_assert_eq!(order.len(), self.len());

        fn permute(values: &mut Vec<f32>, order: &[u32]) {
            let reordered: Vec<f32> = order.iter().map(|&i| values[i as usize]).collect();
            *values = reordered;
        }

        permute(&mut self.x, order);
        permute(&mut self.y, order);
        permute(&mut self.z, order);
        permute(&mut self.vx, order);
        permute(&mut self.vy, order);
        permute(&mut self.vz, order);
        permute(&mut self.ax, order);
        permute(&mut self.ay, order);
        permute(&mut self.az, order);
        permute(&mut self.density, order);
        permute(&mut self.pressure, order);
        permute(&mut self.mass, order);
    }
}

impl Default for ParticleArrays {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_particle_arrays() {
        let pa = ParticleArrays::new();
        assert_eq!(pa.len(), 0);
        assert!(pa.is_empty());
    }

    #[test]
    fn push_and_len() {
        let mut pa = ParticleArrays::new();
        pa.push_particle(1.0, 2.0, 3.0, 0.001, 1000.0, [0.5, 0.0, 0.0]);
        assert_eq!(pa.len(), 1);
        assert!(!pa.is_empty());
        assert_eq!(pa.x[0], 1.0);
        assert_eq!(pa.y[0], 2.0);
        assert_eq!(pa.z[0], 3.0);
        assert_eq!(pa.mass[0], 0.001);
        assert_eq!(pa.density[0], 1000.0);
        assert_eq!(pa.vx[0], 0.5);
        assert_eq!(pa.vy[0], 0.0);
        // Acceleration and pressure start at zero
        assert_eq!(pa.ax[0], 0.0);
        assert_eq!(pa.pressure[0], 0.0);
    }

    #[test]
    fn reorder_permutes_all_arrays() {
        let mut pa = ParticleArrays::new();
        pa.push_particle(0.0, 0.0, 0.0, 1.0, 100.0, [0.0, 0.0, 0.0]);
        pa.push_particle(1.0, 1.0, 1.0, 2.0, 200.0, [1.0, 0.0, 0.0]);
        pa.push_particle(2.0, 2.0, 2.0, 3.0, 300.0, [2.0, 0.0, 0.0]);

        pa.reorder(&[2, 0, 1]);

        assert_eq!(pa.x, vec![2.0, 0.0, 1.0]);
        assert_eq!(pa.mass, vec![3.0, 1.0, 2.0]);
        assert_eq!(pa.density, vec![300.0, 100.0, 200.0]);
        assert_eq!(pa.vx, vec![2.0, 0.0, 1.0]);
    }
}
