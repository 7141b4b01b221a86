//! Node reads under an edge policy.

use crate::config::{EdgePolicy, GridDims};
use crate::error::PointError;
use crate::storage::VelocityStore;
use crate::types::PropertiesRecord;

/// Reads grid nodes as property records.
#[derive(Debug, Clone, Copy)]
pub struct PropertySampler<'a> {
    store: &'a VelocityStore,
    dims: GridDims,
    policy: EdgePolicy,
}

impl<'a> PropertySampler<'a> {
    pub fn new(store: &'a VelocityStore, dims: GridDims, policy: EdgePolicy) -> Self {
        Self {
            store,
            dims,
            policy,
        }
    }

    /// Read node `(x, y, z)`. Only `vp` comes from storage.
    pub fn read_node(&self, x: i64, y: i64, z: i64) -> Result<PropertiesRecord, PointError> {
        let index = match self.policy {
            EdgePolicy::Unchecked => self.dims.linear_index(x, y, z),
            EdgePolicy::Clamp => {
                let clamp = |v: i64, n: usize| v.clamp(0, n as i64 - 1);
                self.dims.linear_index(
                    clamp(x, self.dims.nx),
                    clamp(y, self.dims.ny),
                    clamp(z, self.dims.nz),
                )
            }
            EdgePolicy::Reject => {
                if !self.dims.contains(x, y, z) {
                    return Err(PointError::EdgeNeighbor { x, y, z });
                }
                self.dims.linear_index(x, y, z)
            }
        };

        // Past either end of the array, or beyond any representable index,
        // reads as a zero pad.
        let index = match index.and_then(|i| usize::try_from(i).ok()) {
            Some(i) if i < self.store.len() => i,
            _ => return Ok(PropertiesRecord::from_vp(0.0)),
        };
        let vp = self.store.read(index)?;
        Ok(PropertiesRecord::from_vp(f64::from(vp)))
    }

    /// Read the four nodes of layer `z` starting at `(x, y)`.
    pub fn read_plane(&self, x: i64, y: i64, z: i64) -> Result<[PropertiesRecord; 4], PointError> {
        Ok([
            self.read_node(x, y, z)?,
            self.read_node(x + 1, y, z)?,
            self.read_node(x, y + 1, z)?,
            self.read_node(x + 1, y + 1, z)?,
        ])
    }

    /// Read layer `z` and layer `z - 1` around `(x, y)`.
    pub fn read_cell(&self, x: i64, y: i64, z: i64) -> Result<[PropertiesRecord; 8], PointError> {
        let [a0, a1, a2, a3] = self.read_plane(x, y, z)?;
        let [b0, b1, b2, b3] = self.read_plane(x, y, z - 1)?;
        Ok([a0, a1, a2, a3, b0, b1, b2, b3])
    }
}
