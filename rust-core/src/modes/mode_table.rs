use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry group a mode belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModeGroup {
    #[serde(rename = "fourc")]
    FourCircle,
    #[serde(rename = "fivecFixedGamma")]
    FiveCircleFixedGamma,
    #[serde(rename = "fivecFixedAlpha")]
    FiveCircleFixedAlpha,
    #[serde(rename = "zaxis")]
    ZAxis,
}

impl ModeGroup {
    pub fn name(&self) -> &'static str {
        match self {
            ModeGroup::FourCircle => "fourc",
            ModeGroup::FiveCircleFixedGamma => "fivecFixedGamma",
            ModeGroup::FiveCircleFixedAlpha => "fivecFixedAlpha",
            ModeGroup::ZAxis => "zaxis",
        }
    }
}

impl fmt::Display for ModeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The sample-side condition a mode adds on top of its detector constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleCondition {
    /// Fixed angle between the incident beam and the reference
    FixedOmegaWidth,
    BetaEqual,
    BetaIn,
    BetaOut,
    Azimuth,
    Phi,
}

/// Static description of one mode. Ids are stable and sparse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mode {
    pub id: u32,
    pub name: &'static str,
    pub group: ModeGroup,
    pub description: &'static str,
    /// Parameter names a caller supplies, before removing hardware-fixed axes
    pub parameters: &'static [&'static str],
    pub condition: SampleCondition,
    pub implemented: bool,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>2} {:<10} {}", self.id, self.name, self.description)
    }
}

pub static MODES: [Mode; 15] = [
    // Four-circle with the incidence and detector-elevation circles held
    Mode {
        id: 0,
        name: "4cFixedw",
        group: ModeGroup::FourCircle,
        description: "four-circle, fixed omega-width (blw)",
        parameters: &["alpha", "gamma", "blw"],
        condition: SampleCondition::FixedOmegaWidth,
        implemented: false,
    },
    Mode {
        id: 1,
        name: "4cBeq",
        group: ModeGroup::FourCircle,
        description: "four-circle, betain = betaout",
        parameters: &["alpha", "gamma"],
        condition: SampleCondition::BetaEqual,
        implemented: true,
    },
    Mode {
        id: 2,
        name: "4cBin",
        group: ModeGroup::FourCircle,
        description: "four-circle, fixed betain",
        parameters: &["alpha", "gamma", "betain"],
        condition: SampleCondition::BetaIn,
        implemented: true,
    },
    Mode {
        id: 3,
        name: "4cBout",
        group: ModeGroup::FourCircle,
        description: "four-circle, fixed betaout",
        parameters: &["alpha", "gamma", "betaout"],
        condition: SampleCondition::BetaOut,
        implemented: true,
    },
    Mode {
        id: 4,
        name: "4cAzimuth",
        group: ModeGroup::FourCircle,
        description: "four-circle, fixed reference azimuth",
        parameters: &["alpha", "gamma", "azimuth"],
        condition: SampleCondition::Azimuth,
        implemented: true,
    },
    Mode {
        id: 5,
        name: "4cPhi",
        group: ModeGroup::FourCircle,
        description: "four-circle, fixed phi",
        parameters: &["alpha", "gamma", "phi"],
        condition: SampleCondition::Phi,
        implemented: true,
    },
    // Five-circle, detector elevation fixed, alpha follows betain
    Mode {
        id: 10,
        name: "5cgBeq",
        group: ModeGroup::FiveCircleFixedGamma,
        description: "fixed gamma, alpha = betain, betain = betaout",
        parameters: &["gamma"],
        condition: SampleCondition::BetaEqual,
        implemented: true,
    },
    Mode {
        id: 11,
        name: "5cgBin",
        group: ModeGroup::FiveCircleFixedGamma,
        description: "fixed gamma, alpha = betain, fixed betain",
        parameters: &["gamma", "betain"],
        condition: SampleCondition::BetaIn,
        implemented: true,
    },
    Mode {
        id: 12,
        name: "5cgBout",
        group: ModeGroup::FiveCircleFixedGamma,
        description: "fixed gamma, alpha = betain, fixed betaout",
        parameters: &["gamma", "betaout"],
        condition: SampleCondition::BetaOut,
        implemented: true,
    },
    // Five-circle, incidence fixed, gamma follows betaout
    Mode {
        id: 13,
        name: "5caBeq",
        group: ModeGroup::FiveCircleFixedAlpha,
        description: "fixed alpha, gamma = betaout, betain = betaout",
        parameters: &["alpha"],
        condition: SampleCondition::BetaEqual,
        implemented: true,
    },
    Mode {
        id: 14,
        name: "5caBin",
        group: ModeGroup::FiveCircleFixedAlpha,
        description: "fixed alpha, gamma = betaout, fixed betain",
        parameters: &["alpha", "betain"],
        condition: SampleCondition::BetaIn,
        implemented: true,
    },
    Mode {
        id: 15,
        name: "5caBout",
        group: ModeGroup::FiveCircleFixedAlpha,
        description: "fixed alpha, gamma = betaout, fixed betaout",
        parameters: &["alpha", "betaout"],
        condition: SampleCondition::BetaOut,
        implemented: true,
    },
    // Six-circle z-axis, reference along omega
    Mode {
        id: 20,
        name: "6czBeq",
        group: ModeGroup::ZAxis,
        description: "z-axis, alpha = betain = betaout = gamma",
        parameters: &[],
        condition: SampleCondition::BetaEqual,
        implemented: true,
    },
    Mode {
        id: 21,
        name: "6czBin",
        group: ModeGroup::ZAxis,
        description: "z-axis, fixed betain = alpha",
        parameters: &["betain"],
        condition: SampleCondition::BetaIn,
        implemented: true,
    },
    Mode {
        id: 22,
        name: "6czBout",
        group: ModeGroup::ZAxis,
        description: "z-axis, fixed betaout = gamma",
        parameters: &["betaout"],
        condition: SampleCondition::BetaOut,
        implemented: true,
    },
];

impl Mode {
    /// All modes, ordered by id
    pub fn all() -> &'static [Mode] {
        &MODES
    }

    pub fn from_id(id: u32) -> Option<&'static Mode> {
        MODES.iter().find(|mode| mode.id == id)
    }

    pub fn from_name(name: &str) -> Option<&'static Mode> {
        MODES.iter().find(|mode| mode.name.eq_ignore_ascii_case(name))
    }

    /// Look up by name, or by id when the text is a number
    pub fn lookup(name_or_id: &str) -> Option<&'static Mode> {
        match name_or_id.trim().parse::<u32>() {
            Ok(id) => Self::from_id(id),
            Err(_) => Self::from_name(name_or_id.trim()),
        }
    }
}
