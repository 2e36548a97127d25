use super::variant::{AgeState, Variant};
use serde::{Deserialize, Serialize};

/// A scripted play session replayed against the simulated host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    #[serde(default = "default_age")]
    pub age: AgeState,

    #[serde(default)]
    pub equipment_bits: u16,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Run whole frames through the actor's update hook
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    OpenMenu,
    CloseMenu,

    /// Write the raw 2-bit tunic field and apply equipment
    Equip { tunic: u16 },

    SetAge { age: AgeState },

    /// Remove the archive entry backing a variant
    DropResource { variant: Variant },
}

fn default_age() -> AgeState {
    AgeState::Mature
}

fn default_tick_count() -> u32 {
    1
}

impl Scenario {
    /// Built-in session used when no scenario file is given: swap tunics in
    /// the pause menu, then once more during gameplay.
    pub fn menu_swap() -> Self {
        Self {
            name: "menu-swap".to_string(),
            age: AgeState::Mature,
            equipment_bits: 0,
            steps: vec![
                Step::Tick { count: 3 },
                Step::OpenMenu,
                Step::Tick { count: 2 },
                Step::Equip { tunic: 2 },
                Step::Equip { tunic: 3 },
                Step::Tick { count: 2 },
                Step::CloseMenu,
                Step::Tick { count: 3 },
                Step::Equip { tunic: 2 },
                Step::Tick { count: 1 },
            ],
        }
    }
}
