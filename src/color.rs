//! Fixed colours for every categorical value that can be drawn.

use crate::error::{Error, Result};
use std::str::FromStr;

pub type Rgb = (u8, u8, u8);

/// Default coverage fill.
pub const WIG_ORANGE: Rgb = (0xDB, 0x64, 0x00);

/// Every label with an assigned colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    // Cytoband stain classes
    Acen,
    Gneg,
    Gpos100,
    Gpos25,
    Gpos50,
    Gpos75,
    Gvar,
    Stalk,
    // UPD / ROH site classes
    AntiUpd,
    PbHeterozygous,
    PbHomozygous,
    Uninformative,
    UpdMaternalOrigin,
    UpdPaternalOrigin,
    // Region origins
    Maternal,
    Paternal,
    // Disomy type modifiers
    HeterodisomyDeletion,
    HomodisomyDeletion,
    MaternalLight,
    PaternalLight,
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let label = match s {
            "acen" => Label::Acen,
            "gneg" => Label::Gneg,
            "gpos100" => Label::Gpos100,
            "gpos25" => Label::Gpos25,
            "gpos50" => Label::Gpos50,
            "gpos75" => Label::Gpos75,
            "gvar" => Label::Gvar,
            "stalk" => Label::Stalk,
            "ANTI_UPD" => Label::AntiUpd,
            "PB_HETEROZYGOUS" => Label::PbHeterozygous,
            "PB_HOMOZYGOUS" => Label::PbHomozygous,
            "UNINFORMATIVE" => Label::Uninformative,
            "UPD_MATERNAL_ORIGIN" => Label::UpdMaternalOrigin,
            "UPD_PATERNAL_ORIGIN" => Label::UpdPaternalOrigin,
            "MATERNAL" => Label::Maternal,
            "PATERNAL" => Label::Paternal,
            "HETERODISOMY/DELETION" => Label::HeterodisomyDeletion,
            "HOMODISOMY/DELETION" => Label::HomodisomyDeletion,
            "MATERNAL_LIGHT" => Label::MaternalLight,
            "PATERNAL_LIGHT" => Label::PaternalLight,
            other => return Err(Error::UnknownLabel(other.to_string())),
        };
        Ok(label)
    }
}

impl Label {
    pub fn color(self) -> Rgb {
        match self {
            Label::Acen => (0xb5, 0x66, 0x66),
            Label::Gneg => (0xf7, 0xf7, 0xf7),
            Label::Gpos100 => (0x12, 0x12, 0x12),
            Label::Gpos25 => (0x66, 0x66, 0x66),
            Label::Gpos50 => (0x60, 0x60, 0x60),
            Label::Gpos75 => (0x2e, 0x2e, 0x2e),
            Label::Gvar => (0x77, 0x77, 0x77),
            Label::Stalk => (0x44, 0x44, 0x44),
            Label::AntiUpd => (0x50, 0x91, 0x88),        // medium green
            Label::PbHeterozygous => (0x35, 0x60, 0x5A), // dark slate
            Label::PbHomozygous => (0x6B, 0x81, 0x8C),   // slate gray
            Label::Uninformative => (0xFF, 0xFF, 0xFF),
            Label::UpdMaternalOrigin | Label::Maternal => (0xaa, 0x22, 0x00),
            Label::UpdPaternalOrigin | Label::Paternal => (0x00, 0x44, 0xff),
            Label::HeterodisomyDeletion => (0xBD, 0xB7, 0x6B), // dark khaki
            Label::HomodisomyDeletion => (0xFF, 0xE4, 0xB5),   // moccasin
            Label::MaternalLight => (0xF4, 0x8C, 0x95),
            Label::PaternalLight => (0x6C, 0x88, 0xFF),
        }
    }
}

/// Colour of a label string; unknown labels are an error.
pub fn lookup(label: &str) -> Result<Rgb> {
    label.parse::<Label>().map(Label::color)
}

/// Parental origin of a disomy region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Maternal,
    Paternal,
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MATERNAL" => Ok(Origin::Maternal),
            "PATERNAL" => Ok(Origin::Paternal),
            other => Err(Error::UnknownLabel(other.to_string())),
        }
    }
}

impl Origin {
    pub fn color(self) -> Rgb {
        self.base().color()
    }

    fn base(self) -> Label {
        match self {
            Origin::Maternal => Label::Maternal,
            Origin::Paternal => Label::Paternal,
        }
    }

    fn light(self) -> Label {
        match self {
            Origin::Maternal => Label::MaternalLight,
            Origin::Paternal => Label::PaternalLight,
        }
    }
}

/// Disomy type of a region, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisomyType {
    Isodisomy,
    Homodisomy,
    Heterodisomy,
    IsodisomyDeletion,
    HomodisomyDeletion,
    HeterodisomyDeletion,
}

impl FromStr for DisomyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "isodisomy" => Ok(DisomyType::Isodisomy),
            "homodisomy" => Ok(DisomyType::Homodisomy),
            "heterodisomy" => Ok(DisomyType::Heterodisomy),
            "isodisomy/deletion" => Ok(DisomyType::IsodisomyDeletion),
            "homodisomy/deletion" => Ok(DisomyType::HomodisomyDeletion),
            "heterodisomy/deletion" => Ok(DisomyType::HeterodisomyDeletion),
            _ => Err(Error::UnknownLabel(s.to_string())),
        }
    }
}

/// Upper-band colour of a disomy region: a lighter origin colour for
/// heterodisomy, a deletion colour for the deletion variants, and the
/// plain origin colour otherwise.
pub fn tint(disomy_type: DisomyType, origin: Origin) -> Rgb {
    match disomy_type {
        DisomyType::Heterodisomy => origin.light().color(),
        DisomyType::HomodisomyDeletion | DisomyType::IsodisomyDeletion => {
            Label::HomodisomyDeletion.color()
        }
        DisomyType::HeterodisomyDeletion => Label::HeterodisomyDeletion.color(),
        DisomyType::Isodisomy | DisomyType::Homodisomy => origin.color(),
    }
}

/// Parse `#RRGGBB` or `RRGGBB`.
pub fn parse_hex(s: &str) -> Result<Rgb> {
    let hex = s.trim().trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .ok_or_else(|| Error::format("rgb", format!("{:?} is not an RRGGBB colour", s)))
    };
    if hex.len() != 6 {
        return Err(Error::format("rgb", format!("{:?} is not an RRGGBB colour", s)));
    }
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tint() {
        assert_eq!(
            tint(DisomyType::Heterodisomy, Origin::Maternal),
            Label::MaternalLight.color()
        );
        assert_eq!(tint(DisomyType::Isodisomy, Origin::Paternal), Label::Paternal.color());
        for origin in [Origin::Maternal, Origin::Paternal] {
            assert_eq!(tint(DisomyType::HomodisomyDeletion, origin), (0xFF, 0xE4, 0xB5));
            assert_eq!(tint(DisomyType::IsodisomyDeletion, origin), (0xFF, 0xE4, 0xB5));
            assert_eq!(tint(DisomyType::HeterodisomyDeletion, origin), (0xBD, 0xB7, 0x6B));
        }
    }

    #[test]
    fn test_disomy_type_case() {
        assert_eq!("HETERODISOMY".parse::<DisomyType>().unwrap(), DisomyType::Heterodisomy);
        assert_eq!(
            "Homodisomy/Deletion".parse::<DisomyType>().unwrap(),
            DisomyType::HomodisomyDeletion
        );
        assert!("trisomy".parse::<DisomyType>().is_err());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("gpos100").unwrap(), (0x12, 0x12, 0x12));
        assert_eq!(lookup("UPD_PATERNAL_ORIGIN").unwrap(), lookup("PATERNAL").unwrap());
        assert!(matches!(lookup("gpos33"), Err(Error::UnknownLabel(l)) if l == "gpos33"));
        assert!("maternal".parse::<Origin>().is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#DB6400").unwrap(), WIG_ORANGE);
        assert_eq!(parse_hex("db6400").unwrap(), WIG_ORANGE);
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("zz0000").is_err());
    }
}
