//! Poses: a position plus an orientation, optionally relative to a parent pose.

use smallvec::SmallVec;

use super::frame::{child, EuclideanFrame, GeoFrame};
use super::orientation::{orientation_rotation, set_eye, YawPitchRollOrientation};
use super::position::{position_state, EuclideanPosition, GeoPosition, PositionState};
use crate::core::{names, ItemId, Model, Payload};
use crate::util::{DMat4, DQuat, DVec3, Result};
use crate::Error;

/// Derived state of a pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseState {
    pub position: PositionState,
    /// Additional rotation followed by the orientation.
    pub relative_rotation: DQuat,
    pub absolute_position: DVec3,
    pub absolute_rotation: DQuat,
}

impl Default for PoseState {
    fn default() -> Self {
        Self {
            position: PositionState::default(),
            relative_rotation: DQuat::IDENTITY,
            absolute_position: DVec3::ZERO,
            absolute_rotation: DQuat::IDENTITY,
        }
    }
}

impl PoseState {
    pub fn relative_position(&self) -> DVec3 {
        self.position.relative
    }

    pub fn relative_matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.relative_rotation, self.position.relative)
    }

    pub fn absolute_matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.absolute_rotation, self.absolute_position)
    }
}

/// Payload of pose items.
#[derive(Debug)]
pub struct PoseData {
    position: ItemId,
    orientation: ItemId,
    parent: Option<ItemId>,
    state: PoseState,
}

impl PoseData {
    pub(crate) fn dependencies(&self) -> SmallVec<[ItemId; 2]> {
        self.parent.into_iter().collect()
    }

    pub(crate) fn refresh(&mut self, model: &Model) -> Result<()> {
        let position = position_state(model, self.position)?;
        let rotation = orientation_rotation(model, self.orientation)?;
        let relative_rotation = position.additional_quat() * rotation;

        let (parent_position, parent_rotation) = match self.parent {
            Some(parent) if model.contains(parent) => {
                let state = pose_state(model, parent)?;
                (state.absolute_position, state.absolute_rotation)
            }
            _ => (DVec3::ZERO, DQuat::IDENTITY),
        };
        self.state = PoseState {
            position,
            relative_rotation,
            absolute_position: parent_position + parent_rotation * position.relative,
            absolute_rotation: (parent_rotation * relative_rotation).normalize(),
        };
        Ok(())
    }
}

/// Cached state of any pose item (valid after its last update).
pub fn pose_state(model: &Model, id: ItemId) -> Result<PoseState> {
    match model.payload(id)? {
        Payload::Pose(p) => Ok(p.state),
        _ => Err(Error::TypeMismatch {
            expected: names::POSE.to_string(),
            actual: model.type_name(id)?.to_string(),
        }),
    }
}

/// Handle to a pose item and its `position`/`orientation` children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pose {
    id: ItemId,
    position: ItemId,
    orientation: ItemId,
}

impl Pose {
    /// Create a pose with a Euclidean position and a yaw/pitch/roll orientation.
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, frame: &EuclideanFrame) -> Result<Self> {
        Self::create_with(
            model,
            parent,
            names::POSE,
            name,
            |model, id| Ok(EuclideanPosition::create(model, Some(id), "position", frame)?.id()),
            |model, id| Ok(YawPitchRollOrientation::create(model, Some(id), "orientation")?.id()),
        )
    }

    /// Create a pose whose children are built by the given constructors.
    ///
    /// Each constructor receives the pose id and must create its item as a child of it.
    pub fn create_with(
        model: &mut Model,
        parent: Option<ItemId>,
        type_name: &str,
        name: &str,
        position: impl FnOnce(&mut Model, ItemId) -> Result<ItemId>,
        orientation: impl FnOnce(&mut Model, ItemId) -> Result<ItemId>,
    ) -> Result<Self> {
        let id = model.create(parent, type_name, name)?;
        let position = position(model, id)?;
        let orientation = orientation(model, id)?;
        model.require_type(position, names::POSITION)?;
        model.require_type(orientation, names::ORIENTATION)?;
        set_eye(model, orientation, Some(position))?;

        *model.payload_mut(id)? = Payload::Pose(PoseData {
            position,
            orientation,
            parent: None,
            state: PoseState::default(),
        });
        model.invalidate(id)?;
        Ok(Self { id, position, orientation })
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        match model.payload(id)? {
            Payload::Pose(p) => Ok(Self {
                id,
                position: p.position,
                orientation: p.orientation,
            }),
            _ => Err(Error::TypeMismatch {
                expected: names::POSE.to_string(),
                actual: model.type_name(id)?.to_string(),
            }),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn position(&self) -> ItemId {
        self.position
    }

    pub fn orientation(&self) -> ItemId {
        self.orientation
    }

    pub fn parent(&self, model: &Model) -> Result<Option<ItemId>> {
        match model.payload(self.id)? {
            Payload::Pose(p) => Ok(p.parent),
            _ => Ok(None),
        }
    }

    /// Make this pose relative to another pose (or absolute with `None`).
    ///
    /// The parent is linked, so invalidating it invalidates this pose.
    pub fn set_parent(&self, model: &mut Model, parent: Option<Pose>) -> Result<()> {
        if let Some(new) = parent {
            let mut ancestor = Some(new);
            while let Some(a) = ancestor {
                if a.id == self.id {
                    return Err(Error::InvalidParent {
                        child: model.path(self.id),
                        expected: "a pose outside its own parent chain".to_string(),
                        actual: model.path(new.id),
                    });
                }
                ancestor = a.parent(model)?.map(|id| Pose::from_item(model, id)).transpose()?;
            }
        }
        if let Some(old) = self.parent(model)? {
            model.unlink(old, self.id)?;
        }
        if let Some(new) = parent {
            model.link(new.id, self.id)?;
        }
        if let Payload::Pose(p) = model.payload_mut(self.id)? {
            p.parent = parent.map(|p| p.id);
        }
        model.invalidate(self.id)
    }

    pub fn state(&self, model: &Model) -> Result<PoseState> {
        pose_state(model, self.id)
    }
}

/// Geodetic pose: a [`GeoPosition`] and a [`YawPitchRollOrientation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeoPose {
    pub pose: Pose,
    pub position: GeoPosition,
    pub orientation: YawPitchRollOrientation,
}

impl GeoPose {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, frame: &GeoFrame) -> Result<Self> {
        let pose = Pose::create_with(
            model,
            parent,
            names::GEO_POSE,
            name,
            |model, id| Ok(GeoPosition::create(model, Some(id), "position", frame)?.id()),
            |model, id| Ok(YawPitchRollOrientation::create(model, Some(id), "orientation")?.id()),
        )?;
        Self::from_item(model, pose.id())
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::GEO_POSE)?;
        Ok(Self {
            pose: Pose::from_item(model, id)?,
            position: GeoPosition::from_item(model, child(model, id, "position")?)?,
            orientation: YawPitchRollOrientation::from_item(model, child(model, id, "orientation")?)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.pose.id()
    }

    pub fn state(&self, model: &Model) -> Result<PoseState> {
        self.pose.state(model)
    }
}
