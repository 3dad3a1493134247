use super::mode_table::Mode;
use crate::error::{DiffcalcError, Result};
use crate::geometry::DiffractometerGeometry;

/// Modes whose group the geometry supports, ordered by id
pub fn list_modes(geometry: &dyn DiffractometerGeometry) -> Vec<&'static Mode> {
    Mode::all()
        .iter()
        .filter(|mode| geometry.supports_mode_group(mode.group))
        .collect()
}

/// Parameter names a caller must supply: the mode's parameters minus hardware-fixed axes
pub fn required_parameters(mode: &Mode, geometry: &dyn DiffractometerGeometry) -> Vec<&'static str> {
    mode.parameters
        .iter()
        .copied()
        .filter(|name| {
            geometry
                .resolve_axis(name)
                .map_or(true, |axis| !geometry.is_fixed(axis))
        })
        .collect()
}

pub(crate) fn check_mode_usable(mode: &Mode, geometry: &dyn DiffractometerGeometry) -> Result<()> {
    if !geometry.supports_mode_group(mode.group) {
        return Err(DiffcalcError::UnsupportedMode {
            mode: mode.name.to_string(),
            geometry: geometry.name().to_string(),
            reason: format!("mode group '{}' not supported", mode.group),
        });
    }
    if !mode.implemented {
        return Err(DiffcalcError::UnsupportedMode {
            mode: mode.name.to_string(),
            geometry: geometry.name().to_string(),
            reason: "mode is not implemented".to_string(),
        });
    }
    Ok(())
}

/// Holds the currently selected mode of one session.
#[derive(Debug, Clone, Default)]
pub struct ModeSelector {
    current: Option<&'static Mode>,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&'static Mode> {
        self.current
    }

    pub fn select_by_name(
        &mut self,
        name: &str,
        geometry: &dyn DiffractometerGeometry,
    ) -> Result<&'static Mode> {
        let mode = Mode::from_name(name).ok_or_else(|| DiffcalcError::UnknownMode {
            mode: name.to_string(),
        })?;
        self.select(mode, geometry)
    }

    pub fn select_by_id(
        &mut self,
        id: u32,
        geometry: &dyn DiffractometerGeometry,
    ) -> Result<&'static Mode> {
        let mode = Mode::from_id(id).ok_or_else(|| DiffcalcError::UnknownMode {
            mode: id.to_string(),
        })?;
        self.select(mode, geometry)
    }

    /// Select a table entry after checking it against the geometry.
    /// The previous selection is kept on failure.
    pub fn select(
        &mut self,
        mode: &'static Mode,
        geometry: &dyn DiffractometerGeometry,
    ) -> Result<&'static Mode> {
        check_mode_usable(mode, geometry)?;
        self.current = Some(mode);
        Ok(mode)
    }

    /// Select by name, or by id if the text parses as a number
    pub fn select_by_name_or_id(
        &mut self,
        name_or_id: &str,
        geometry: &dyn DiffractometerGeometry,
    ) -> Result<&'static Mode> {
        let mode = Mode::lookup(name_or_id).ok_or_else(|| DiffcalcError::UnknownMode {
            mode: name_or_id.to_string(),
        })?;
        self.select(mode, geometry)
    }
}
