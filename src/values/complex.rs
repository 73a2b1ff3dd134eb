//! Composite values built from simple components.
//!
//! A complex item is a plain item whose children are its components, so dirty
//! tracking, serialization and the `is_default`/`is_undefined` reductions come from the
//! generic item machinery.

use crate::core::{names, ItemId, Model};
use crate::util::{euler_order, DQuat, DVec3, EulerRot, Result};
use crate::values::{Angle, Number, Text};
use crate::Error;

/// 3-component vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Vector {
    id: ItemId,
    pub x: Number,
    pub y: Number,
    pub z: Number,
}

impl Vector {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, default: DVec3) -> Result<Self> {
        let id = model.create(parent, names::VECTOR, name)?;
        Ok(Self {
            id,
            x: Number::create(model, Some(id), "x", default.x)?,
            y: Number::create(model, Some(id), "y", default.y)?,
            z: Number::create(model, Some(id), "z", default.z)?,
        })
    }

    /// Wrap an existing vector item.
    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::VECTOR)?;
        Ok(Self {
            id,
            x: Number::from_item(model, component(model, id, "x")?)?,
            y: Number::from_item(model, component(model, id, "y")?)?,
            z: Number::from_item(model, component(model, id, "z")?)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn get(&self, model: &Model) -> Result<DVec3> {
        Ok(DVec3::new(self.x.get(model)?, self.y.get(model)?, self.z.get(model)?))
    }

    pub fn set(&self, model: &mut Model, v: DVec3) -> Result<()> {
        self.x.set(model, v.x)?;
        self.y.set(model, v.y)?;
        self.z.set(model, v.z)
    }
}

/// RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    id: ItemId,
    pub r: Number,
    pub g: Number,
    pub b: Number,
    pub a: Number,
}

impl Color {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, rgba: [f64; 4]) -> Result<Self> {
        let id = model.create(parent, names::COLOR, name)?;
        Ok(Self {
            id,
            r: Number::create_ranged(model, Some(id), "r", rgba[0], 0.0, 1.0)?,
            g: Number::create_ranged(model, Some(id), "g", rgba[1], 0.0, 1.0)?,
            b: Number::create_ranged(model, Some(id), "b", rgba[2], 0.0, 1.0)?,
            a: Number::create_ranged(model, Some(id), "a", rgba[3], 0.0, 1.0)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn get(&self, model: &Model) -> Result<[f64; 4]> {
        Ok([
            self.r.get(model)?,
            self.g.get(model)?,
            self.b.get(model)?,
            self.a.get(model)?,
        ])
    }

    pub fn set(&self, model: &mut Model, rgba: [f64; 4]) -> Result<()> {
        self.r.set(model, rgba[0])?;
        self.g.set(model, rgba[1])?;
        self.b.set(model, rgba[2])?;
        self.a.set(model, rgba[3])
    }

    /// Color as `f32` channels for materials.
    pub fn get_f32(&self, model: &Model) -> Result<[f32; 4]> {
        Ok(self.get(model)?.map(|c| c as f32))
    }

    /// Set from `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn set_hex(&self, model: &mut Model, hex: &str) -> Result<()> {
        let rgba = parse_hex(hex).ok_or_else(|| Error::invalid(hex, "not a hex color"))?;
        self.set(model, rgba)
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(&self, model: &Model) -> Result<String> {
        let c = self.get(model)?.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
        Ok(format!("#{:02x}{:02x}{:02x}{:02x}", c[0], c[1], c[2], c[3]))
    }
}

/// Parse a CSS-style hex color into RGBA components.
pub fn parse_hex(hex: &str) -> Option<[f64; 4]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0);
    match digits.len() {
        3 => {
            let mut out = [1.0; 4];
            for (i, c) in digits.chars().enumerate() {
                out[i] = channel(&format!("{c}{c}"))?;
            }
            Some(out)
        }
        6 | 8 => {
            let mut out = [1.0; 4];
            for i in 0..digits.len() / 2 {
                out[i] = channel(&digits[i * 2..i * 2 + 2])?;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Tait–Bryan angles with an explicit rotation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Euler {
    id: ItemId,
    pub x: Angle,
    pub y: Angle,
    pub z: Angle,
    pub order: Text,
}

/// Accepted Euler orders.
pub const EULER_ORDERS: &[&str] = &["XYZ", "XZY", "YXZ", "YZX", "ZXY", "ZYX"];

impl Euler {
    /// Create with angles in degrees.
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, degrees: DVec3, order: &str) -> Result<Self> {
        let id = model.create(parent, names::EULER, name)?;
        Ok(Self {
            id,
            x: Angle::create(model, Some(id), "x", degrees.x)?,
            y: Angle::create(model, Some(id), "y", degrees.y)?,
            z: Angle::create(model, Some(id), "z", degrees.z)?,
            order: Text::create_choice(model, Some(id), "order", order, EULER_ORDERS)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Angles in radians.
    pub fn radians(&self, model: &Model) -> Result<DVec3> {
        Ok(DVec3::new(
            self.x.radians(model)?,
            self.y.radians(model)?,
            self.z.radians(model)?,
        ))
    }

    pub fn order(&self, model: &Model) -> Result<EulerRot> {
        let name = self.order.get(model)?;
        euler_order(&name).ok_or_else(|| Error::invalid("order", format!("unknown Euler order '{name}'")))
    }

    /// Rotation applying the angles in the stored order (intrinsic).
    pub fn to_quat(&self, model: &Model) -> Result<DQuat> {
        let r = self.radians(model)?;
        let order = self.order(model)?;
        let [a, b, c] = order_components(order, r);
        Ok(DQuat::from_euler(order, a, b, c))
    }
}

/// Pick (first, second, third) angles for an order from per-axis angles.
pub(crate) fn order_components(order: EulerRot, r: DVec3) -> [f64; 3] {
    match order {
        EulerRot::XZY => [r.x, r.z, r.y],
        EulerRot::YXZ => [r.y, r.x, r.z],
        EulerRot::YZX => [r.y, r.z, r.x],
        EulerRot::ZXY => [r.z, r.x, r.y],
        EulerRot::ZYX => [r.z, r.y, r.x],
        _ => [r.x, r.y, r.z],
    }
}

/// Quaternion, identity by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Quaternion {
    id: ItemId,
    pub x: Number,
    pub y: Number,
    pub z: Number,
    pub w: Number,
}

impl Quaternion {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, default: DQuat) -> Result<Self> {
        let id = model.create(parent, names::QUATERNION, name)?;
        Ok(Self {
            id,
            x: Number::create(model, Some(id), "x", default.x)?,
            y: Number::create(model, Some(id), "y", default.y)?,
            z: Number::create(model, Some(id), "z", default.z)?,
            w: Number::create(model, Some(id), "w", default.w)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Normalized rotation; a zero quaternion reads as identity.
    pub fn get(&self, model: &Model) -> Result<DQuat> {
        let q = DQuat::from_xyzw(
            self.x.get(model)?,
            self.y.get(model)?,
            self.z.get(model)?,
            self.w.get(model)?,
        );
        Ok(if q.length_squared() > 0.0 { q.normalize() } else { DQuat::IDENTITY })
    }

    pub fn set(&self, model: &mut Model, q: DQuat) -> Result<()> {
        self.x.set(model, q.x)?;
        self.y.set(model, q.y)?;
        self.z.set(model, q.z)?;
        self.w.set(model, q.w)
    }
}

fn component(model: &Model, id: ItemId, name: &str) -> Result<ItemId> {
    model
        .child_by_name(id, name)
        .ok_or_else(|| Error::serialization(model.path(id), format!("missing component '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_roundtrip_and_default() {
        let mut model = Model::new();
        let v = Vector::create(&mut model, None, "v", DVec3::new(1.0, 2.0, 3.0)).unwrap();
        assert!(model.is_default(v.id()).unwrap());
        v.set(&mut model, DVec3::new(1.0, 5.0, 3.0)).unwrap();
        assert!(!model.is_default(v.id()).unwrap());
        assert_eq!(v.get(&model).unwrap(), DVec3::new(1.0, 5.0, 3.0));
        assert!(!model.is_undefined(v.id()).unwrap());

        let again = Vector::from_item(&model, v.id()).unwrap();
        assert_eq!(again, v);
    }

    #[test]
    fn test_color_hex() {
        let mut model = Model::new();
        let c = Color::create(&mut model, None, "c", [1.0, 1.0, 1.0, 1.0]).unwrap();
        c.set_hex(&mut model, "#ff8000").unwrap();
        assert_eq!(c.to_hex(&model).unwrap(), "#ff8000ff");
        assert!(c.set_hex(&mut model, "#zz").is_err());
        assert!(c.r.set(&mut model, 1.5).is_err());
        assert_eq!(parse_hex("#fff"), Some([1.0; 4]));
    }

    #[test]
    fn test_euler_order_validation() {
        let mut model = Model::new();
        let e = Euler::create(&mut model, None, "e", DVec3::new(0.0, 90.0, 0.0), "XYZ").unwrap();
        assert!(e.order.set(&mut model, "XXZ").is_err());
        let q = e.to_quat(&model).unwrap();
        assert!((q * DVec3::Z).abs_diff_eq(DVec3::X, 1e-12));

        e.order.set(&mut model, "YXZ").unwrap();
        assert_eq!(e.order(&model).unwrap(), EulerRot::YXZ);
    }

    #[test]
    fn test_quaternion_normalizes() {
        let mut model = Model::new();
        let q = Quaternion::create(&mut model, None, "q", DQuat::IDENTITY).unwrap();
        q.set(&mut model, DQuat::from_xyzw(0.0, 0.0, 0.0, 2.0)).unwrap();
        assert_eq!(q.get(&model).unwrap(), DQuat::IDENTITY);
        q.set(&mut model, DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0)).unwrap();
        assert_eq!(q.get(&model).unwrap(), DQuat::IDENTITY);
    }
}
