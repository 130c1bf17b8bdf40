//! Cosmetic control-surface animation.
//!
//! A visual model lists its named nodes once when it is loaded; the rig
//! keeps a typed slot -> node map from that single pass. Per frame the
//! flight model supplies deflections and the rig turns them into node
//! rotations. Models without some or all surfaces simply skip them.

use std::collections::HashMap;

use glam::{Quat, Vec3};

/// Maximum aileron travel (radians).
const AILERON_TRAVEL: f32 = 0.35;
const ELEVATOR_TRAVEL: f32 = 0.3;
const RUDDER_TRAVEL: f32 = 0.25;

/// Renderer-side node identifier. Never inspected by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSurface {
    LeftAileron,
    RightAileron,
    Elevator,
    Rudder,
}

impl ControlSurface {
    pub const ALL: [ControlSurface; 4] = [
        ControlSurface::LeftAileron,
        ControlSurface::RightAileron,
        ControlSurface::Elevator,
        ControlSurface::Rudder,
    ];

    /// Match a node name from a model file. Case-insensitive.
    fn matches(self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        match self {
            ControlSurface::LeftAileron => {
                name.contains("aileron") && (name.contains("left") || name.ends_with("_l"))
            }
            ControlSurface::RightAileron => {
                name.contains("aileron") && (name.contains("right") || name.ends_with("_r"))
            }
            ControlSurface::Elevator => name.contains("elevator"),
            ControlSurface::Rudder => name.contains("rudder"),
        }
    }

    /// Hinge axis in model space.
    fn hinge(self) -> Vec3 {
        match self {
            ControlSurface::LeftAileron | ControlSurface::RightAileron | ControlSurface::Elevator => {
                Vec3::X
            }
            ControlSurface::Rudder => Vec3::Y,
        }
    }
}

/// Surface angles for one frame (radians).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlDeflections {
    pub aileron: f32,
    pub elevator: f32,
    pub rudder: f32,
}

impl ControlDeflections {
    /// Build from signed control axes in -1..=1.
    pub fn from_axes(pitch: f32, roll: f32, yaw: f32) -> Self {
        Self {
            aileron: roll * AILERON_TRAVEL,
            elevator: -pitch * ELEVATOR_TRAVEL,
            rudder: yaw * RUDDER_TRAVEL,
        }
    }

    fn angle_for(&self, surface: ControlSurface) -> f32 {
        match surface {
            ControlSurface::LeftAileron => self.aileron,
            ControlSurface::RightAileron => -self.aileron,
            ControlSurface::Elevator => self.elevator,
            ControlSurface::Rudder => self.rudder,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ControlSurfaceRig {
    slots: HashMap<ControlSurface, NodeHandle>,
}

impl ControlSurfaceRig {
    /// Resolve slots from a model's node list. The first matching node wins.
    pub fn resolve<'a>(nodes: impl IntoIterator<Item = (&'a str, NodeHandle)>) -> Self {
        let mut slots = HashMap::new();
        for (name, handle) in nodes {
            for surface in ControlSurface::ALL {
                if surface.matches(name) {
                    slots.entry(surface).or_insert(handle);
                }
            }
        }
        log::debug!("Control-surface rig resolved {} slot(s)", slots.len());
        Self { slots }
    }

    pub fn node(&self, surface: ControlSurface) -> Option<NodeHandle> {
        self.slots.get(&surface).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Local rotations for every bound surface.
    pub fn poses(&self, deflections: &ControlDeflections) -> Vec<(NodeHandle, Quat)> {
        ControlSurface::ALL
            .iter()
            .filter_map(|&surface| {
                let node = self.node(surface)?;
                let angle = deflections.angle_for(surface);
                Some((node, Quat::from_axis_angle(surface.hinge(), angle)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_rig() -> ControlSurfaceRig {
        ControlSurfaceRig::resolve([
            ("Fuselage", NodeHandle(0)),
            ("Aileron_Left", NodeHandle(1)),
            ("aileron_r", NodeHandle(2)),
            ("Tail_Elevator", NodeHandle(3)),
            ("Rudder", NodeHandle(4)),
        ])
    }

    #[test]
    fn resolves_named_nodes_once() {
        let rig = full_rig();
        assert_eq!(rig.node(ControlSurface::LeftAileron), Some(NodeHandle(1)));
        assert_eq!(rig.node(ControlSurface::RightAileron), Some(NodeHandle(2)));
        assert_eq!(rig.node(ControlSurface::Elevator), Some(NodeHandle(3)));
        assert_eq!(rig.node(ControlSurface::Rudder), Some(NodeHandle(4)));
    }

    #[test]
    fn missing_surfaces_are_skipped() {
        let rig = ControlSurfaceRig::resolve([("Rudder", NodeHandle(9))]);
        let poses = rig.poses(&ControlDeflections::from_axes(1.0, 1.0, 1.0));
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].0, NodeHandle(9));
        assert!(ControlSurfaceRig::resolve([("Wing", NodeHandle(0))]).is_empty());
    }

    #[test]
    fn ailerons_deflect_opposite() {
        let rig = full_rig();
        let poses = rig.poses(&ControlDeflections::from_axes(0.0, 1.0, 0.0));
        let left = poses.iter().find(|(n, _)| *n == NodeHandle(1)).unwrap().1;
        let right = poses.iter().find(|(n, _)| *n == NodeHandle(2)).unwrap().1;
        let (_, left_angle) = left.to_axis_angle();
        let (_, right_angle) = right.to_axis_angle();
        assert!((left_angle - AILERON_TRAVEL).abs() < 1e-5);
        assert!((right_angle - AILERON_TRAVEL).abs() < 1e-5);
        assert!((left * Vec3::Z).y * (right * Vec3::Z).y < 0.0);
    }

    #[test]
    fn neutral_input_centres_surfaces() {
        assert_eq!(ControlDeflections::from_axes(0.0, 0.0, 0.0), ControlDeflections::default());
    }
}
