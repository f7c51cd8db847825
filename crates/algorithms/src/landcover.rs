//! Land-cover class codes and class masks
//!
//! Codes follow the Dynamic World label convention:
//!
//! | code | class    |
//! |------|----------|
//! | 0    | water    |
//! | 1    | trees    |
//! | 2    | crops    |
//! | 3    | wetlands |
//! | 4    | bare     |
//! | 5    | snow     |
//! | 6    | built    |

use crate::maybe_rayon::*;
use climstress_core::raster::Raster;
use climstress_core::region::{INSIDE, OUTSIDE};
use climstress_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LandCoverClass {
    Water = 0,
    Trees = 1,
    Crops = 2,
    Wetlands = 3,
    Bare = 4,
    Snow = 5,
    Built = 6,
}

impl LandCoverClass {
    pub const ALL: [LandCoverClass; 7] = [
        LandCoverClass::Water,
        LandCoverClass::Trees,
        LandCoverClass::Crops,
        LandCoverClass::Wetlands,
        LandCoverClass::Bare,
        LandCoverClass::Snow,
        LandCoverClass::Built,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            LandCoverClass::Water => "water",
            LandCoverClass::Trees => "trees",
            LandCoverClass::Crops => "crops",
            LandCoverClass::Wetlands => "wetlands",
            LandCoverClass::Bare => "bare",
            LandCoverClass::Snow => "snow",
            LandCoverClass::Built => "built",
        }
    }
}

impl fmt::Display for LandCoverClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LandCoverClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_param("land_cover_class", s, "unknown land-cover class"))
    }
}

/// Boolean grid of the pixels labelled with one class
#[derive(Debug, Clone)]
pub struct CategoryMask {
    class: LandCoverClass,
    mask: Raster<u8>,
}

impl CategoryMask {
    /// `INSIDE` where `labels == class`, `OUTSIDE` elsewhere, no-data included
    pub fn from_labels(labels: &Raster<u8>, class: LandCoverClass) -> Result<Self> {
        let (rows, cols) = labels.shape();
        let code = class.code();

        let data: Vec<u8> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![OUTSIDE; cols];
                for col in 0..cols {
                    let val = unsafe { labels.get_unchecked(row, col) };
                    if val == code && !labels.is_nodata(val) {
                        row_data[col] = INSIDE;
                    }
                }
                row_data
            })
            .collect();

        Ok(Self {
            class,
            mask: labels.with_data(data, None)?,
        })
    }

    pub fn class(&self) -> LandCoverClass {
        self.class
    }

    pub fn mask(&self) -> &Raster<u8> {
        &self.mask
    }

    /// Number of pixels in the class
    pub fn coverage(&self) -> usize {
        self.mask.data().iter().filter(|&&v| v == INSIDE).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for class in LandCoverClass::ALL {
            assert_eq!(LandCoverClass::from_code(class.code()), Some(class));
            assert_eq!(class.name().parse::<LandCoverClass>().unwrap(), class);
        }
        assert_eq!(LandCoverClass::Built.code(), 6);
        assert_eq!(LandCoverClass::from_code(7), None);
        assert!("urban".parse::<LandCoverClass>().is_err());
    }

    #[test]
    fn test_mask_from_labels() {
        let labels = Raster::from_vec(vec![6u8, 0, 6, u8::MAX], 2, 2)
            .unwrap()
            .with_nodata(u8::MAX);
        let built = CategoryMask::from_labels(&labels, LandCoverClass::Built).unwrap();
        assert_eq!(built.class(), LandCoverClass::Built);
        assert_eq!(built.coverage(), 2);
        assert_eq!(built.mask().get(0, 1).unwrap(), OUTSIDE);
        assert_eq!(built.mask().get(1, 1).unwrap(), OUTSIDE);

        let water = CategoryMask::from_labels(&labels, LandCoverClass::Water).unwrap();
        assert_eq!(water.coverage(), 1);
    }

    #[test]
    fn test_serde_names() {
        #[derive(Deserialize)]
        struct Holder {
            class: LandCoverClass,
        }
        let h: Holder = toml::from_str("class = \"built\"").unwrap();
        assert_eq!(h.class, LandCoverClass::Built);
    }
}
