use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::physics::QuantumNumbers;

/// Linear RGB triplet in [0, 1]. Tints points, never affects density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    /// `0xRRGGBB` packed integer.
    pub fn from_u32(hex: u32) -> Self {
        Rgb {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parses `#RRGGBB` (leading `#` optional).
    pub fn from_hex(value: &str) -> Result<Self> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(value.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::from_u32)
            .map_err(|_| Error::InvalidColor(value.to_string()))
    }

    pub fn scaled(self, factor: f32) -> [f32; 3] {
        [self.r * factor, self.g * factor, self.b * factor]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Shell {
    K,
    L,
    M,
    N,
}

impl Shell {
    pub fn principal(self) -> u32 {
        match self {
            Shell::K => 1,
            Shell::L => 2,
            Shell::M => 3,
            Shell::N => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shell::K => "K",
            Shell::L => "L",
            Shell::M => "M",
            Shell::N => "N",
        }
    }
}

/// One selectable orbital of the iron atom.
#[derive(Debug, Clone, Serialize)]
pub struct OrbitalInfo {
    pub id: &'static str,
    #[serde(flatten)]
    pub qn: QuantumNumbers,
    pub label: &'static str,
    pub shell: Shell,
    pub color: Rgb,
    pub description: &'static str,
}

fn orbital(
    id: &'static str,
    (n, l, m_l): (u32, u32, i32),
    label: &'static str,
    shell: Shell,
    color: u32,
    description: &'static str,
) -> OrbitalInfo {
    OrbitalInfo {
        id,
        qn: QuantumNumbers::new_unchecked(n, l, m_l),
        label,
        shell,
        color: Rgb::from_u32(color),
        description,
    }
}

/// Iron (Z = 26) orbitals through the 4s shell, in display order.
static IRON_ORBITALS: Lazy<Vec<OrbitalInfo>> = Lazy::new(|| {
    vec![
        orbital("1s", (1, 0, 0), "1s", Shell::K, 0xFF3D3D, "core s orbital"),
        orbital("2s", (2, 0, 0), "2s", Shell::L, 0xFFD700, "2s orbital"),
        orbital("2px", (2, 1, 1), "2px", Shell::L, 0xFF8C00, "2p along x"),
        orbital("2py", (2, 1, -1), "2py", Shell::L, 0xFFA500, "2p along y"),
        orbital("2pz", (2, 1, 0), "2pz", Shell::L, 0xFF4500, "2p along z"),
        orbital("3s", (3, 0, 0), "3s", Shell::M, 0x00FFCC, "3s orbital"),
        orbital("3px", (3, 1, 1), "3px", Shell::M, 0x00BFFF, "3p along x"),
        orbital("3py", (3, 1, -1), "3py", Shell::M, 0x1E90FF, "3p along y"),
        orbital("3pz", (3, 1, 0), "3pz", Shell::M, 0x4169E1, "3p along z"),
        orbital("3dxy", (3, 2, -2), "3dxy", Shell::M, 0xCC00FF, "3d in the xy plane"),
        orbital("3dyz", (3, 2, -1), "3dyz", Shell::M, 0xFF00FF, "3d in the yz plane"),
        orbital("3dxz", (3, 2, 1), "3dxz", Shell::M, 0x8A2BE2, "3d in the xz plane"),
        orbital("3dx2-y2", (3, 2, 2), "3dx²-y²", Shell::M, 0xFF1493, "3d along the axes"),
        orbital("3dz2", (3, 2, 0), "3dz²", Shell::M, 0xFF69B4, "3d with equatorial ring"),
        orbital("4s", (4, 0, 0), "4s", Shell::N, 0x00FF7F, "outer s orbital"),
    ]
});

static ORBITAL_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    IRON_ORBITALS
        .iter()
        .enumerate()
        .map(|(i, orbital)| (orbital.id, i))
        .collect()
});

pub fn catalog() -> &'static [OrbitalInfo] {
    &IRON_ORBITALS
}

pub fn find_orbital(id: &str) -> Result<&'static OrbitalInfo> {
    ORBITAL_INDEX
        .get(id)
        .map(|&i| &IRON_ORBITALS[i])
        .ok_or_else(|| Error::UnknownOrbital(id.to_string()))
}

pub fn orbitals_in_shell(shell: Shell) -> impl Iterator<Item = &'static OrbitalInfo> {
    IRON_ORBITALS.iter().filter(move |o| o.shell == shell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_valid() {
        for orbital in catalog() {
            let qn = orbital.qn;
            assert!(
                QuantumNumbers::new(qn.n, qn.l, qn.m_l).is_some(),
                "{} has invalid quantum numbers",
                orbital.id
            );
            assert_eq!(orbital.shell.principal(), qn.n, "{} in wrong shell", orbital.id);
        }
    }

    #[test]
    fn test_find_orbital() {
        let pz = find_orbital("2pz").unwrap();
        assert_eq!(pz.qn, QuantumNumbers::new(2, 1, 0).unwrap());
        assert_eq!(find_orbital("3dxy").unwrap().qn.m_l, -2);
        assert_eq!(find_orbital("5g").unwrap_err(), Error::UnknownOrbital("5g".into()));
    }

    #[test]
    fn test_shell_grouping() {
        assert_eq!(orbitals_in_shell(Shell::K).count(), 1);
        assert_eq!(orbitals_in_shell(Shell::L).count(), 4);
        assert_eq!(orbitals_in_shell(Shell::M).count(), 9);
        assert_eq!(orbitals_in_shell(Shell::N).count(), 1);
    }

    #[test]
    fn test_hex_colors() {
        let c = Rgb::from_hex("#FF8000").unwrap();
        assert_eq!(c, Rgb::new(1.0, 128.0 / 255.0, 0.0));
        assert_eq!(Rgb::from_hex("00ff00").unwrap(), Rgb::new(0.0, 1.0, 0.0));
        assert!(Rgb::from_hex("#FFF").is_err());
        assert!(Rgb::from_hex("#GG0000").is_err());
        assert!(Rgb::from_hex("+FFFFF").is_err());
        assert_eq!(find_orbital("1s").unwrap().color, Rgb::from_hex("#FF3D3D").unwrap());
    }
}
