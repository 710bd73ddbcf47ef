use crate::Vec3;

/// Orthonormal frame built around a unit axis.
///
/// Local coordinates are `(x, y, z)` with `z` along the axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Basis {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Basis {
    /// Build a frame around `n` (branchless construction, Duff et al. 2017).
    ///
    /// `n` is normalized first; a zero vector falls back to +Z.
    pub fn from_normal(n: Vec3) -> Self {
        let n = n.try_normalize().unwrap_or(Vec3::Z);
        let sign = if n.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        let tangent = Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let bitangent = Vec3::new(b, sign + n.y * n.y * a, -n.y);

        Self {
            tangent,
            bitangent,
            normal: n,
        }
    }

    /// Map a vector from local frame coordinates to world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local.x * self.tangent + local.y * self.bitangent + local.z * self.normal
    }
}
