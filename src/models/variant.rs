use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit offset of the tunic field inside the equipment bitfield.
pub const TUNIC_FIELD_SHIFT: u32 = 8;

/// Width mask of the tunic field once shifted down.
pub const TUNIC_FIELD_MASK: u16 = 0b11;

/// Age category of the player character.
///
/// Only [`AgeState::Mature`] supports tunic variants. The young model is
/// built and maintained entirely by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeState {
    Young,
    Mature,
}

impl AgeState {
    pub fn is_mature(self) -> bool {
        matches!(self, AgeState::Mature)
    }
}

/// Visual body variant of the mature character model.
///
/// `NotApplicable` is a sentinel, not a fourth body: it means the character
/// is not mature and the variant concept does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Default,
    AlternateA,
    AlternateB,
    NotApplicable,
}

impl Variant {
    /// Map a raw 2-bit tunic field to a variant.
    ///
    /// Field value 1 has no body of its own in the host data and falls back
    /// to [`Variant::Default`].
    pub fn from_field(field: u16) -> Self {
        match field & TUNIC_FIELD_MASK {
            2 => Variant::AlternateA,
            3 => Variant::AlternateB,
            _ => Variant::Default,
        }
    }

    /// Raw field value written by the host when this variant is equipped.
    ///
    /// Returns `None` for [`Variant::NotApplicable`].
    pub fn field_value(self) -> Option<u16> {
        match self {
            Variant::Default => Some(0),
            Variant::AlternateA => Some(2),
            Variant::AlternateB => Some(3),
            Variant::NotApplicable => None,
        }
    }

    pub fn is_applicable(self) -> bool {
        !matches!(self, Variant::NotApplicable)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::Default => "default",
            Variant::AlternateA => "alternate-a",
            Variant::AlternateB => "alternate-b",
            Variant::NotApplicable => "n/a",
        };
        f.write_str(name)
    }
}

/// Extract the raw tunic field from an equipment bitfield.
pub fn tunic_field(equipment_bits: u16) -> u16 {
    (equipment_bits >> TUNIC_FIELD_SHIFT) & TUNIC_FIELD_MASK
}

/// Replace the tunic field of an equipment bitfield, leaving other bits alone.
pub fn with_tunic_field(equipment_bits: u16, field: u16) -> u16 {
    let cleared = equipment_bits & !(TUNIC_FIELD_MASK << TUNIC_FIELD_SHIFT);
    cleared | ((field & TUNIC_FIELD_MASK) << TUNIC_FIELD_SHIFT)
}

/// Derive the variant the model should currently show.
///
/// Total over its inputs: non-mature ages always yield
/// [`Variant::NotApplicable`] regardless of the equipment bits.
pub fn derive_desired_variant(age: AgeState, equipment_bits: u16) -> Variant {
    if !age.is_mature() {
        return Variant::NotApplicable;
    }
    Variant::from_field(tunic_field(equipment_bits))
}

/// Archive indices of the mature body models, one per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyResourceIndices {
    #[serde(default = "default_body_index")]
    pub default: u32,

    #[serde(default = "default_alternate_a_index")]
    pub alternate_a: u32,

    #[serde(default = "default_alternate_b_index")]
    pub alternate_b: u32,
}

impl Default for BodyResourceIndices {
    fn default() -> Self {
        Self {
            default: default_body_index(),
            alternate_a: default_alternate_a_index(),
            alternate_b: default_alternate_b_index(),
        }
    }
}

fn default_body_index() -> u32 {
    0
}

fn default_alternate_a_index() -> u32 {
    4
}

fn default_alternate_b_index() -> u32 {
    5
}

impl BodyResourceIndices {
    /// Archive index backing `variant`, or `None` for the sentinel.
    pub fn index_for(&self, variant: Variant) -> Option<u32> {
        match variant {
            Variant::Default => Some(self.default),
            Variant::AlternateA => Some(self.alternate_a),
            Variant::AlternateB => Some(self.alternate_b),
            Variant::NotApplicable => None,
        }
    }

    pub fn is_body_index(&self, index: u32) -> bool {
        index == self.default || index == self.alternate_a || index == self.alternate_b
    }

    /// Rewrite a host request for a mature body model so it loads the body of
    /// the currently equipped tunic.
    ///
    /// Requests for non-body indices, or made while young, pass through.
    pub fn redirect(&self, age: AgeState, equipment_bits: u16, requested: u32) -> u32 {
        if !age.is_mature() || !self.is_body_index(requested) {
            return requested;
        }
        self.index_for(derive_desired_variant(age, equipment_bits))
            .unwrap_or(requested)
    }
}
