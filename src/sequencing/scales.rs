use serde::{Deserialize, Serialize};

/// Entries per chaos scale table
pub const SCALE_LENGTH: usize = 10;

const MAJOR: [i32; SCALE_LENGTH] = [0, 2, 4, 5, 7, 9, 11, 12, 14, 16];
const MINOR: [i32; SCALE_LENGTH] = [0, 2, 3, 5, 7, 8, 10, 12, 14, 15];
const PENTATONIC: [i32; SCALE_LENGTH] = [0, 2, 4, 7, 9, 12, 14, 16, 19, 21];
const PHRYGIAN: [i32; SCALE_LENGTH] = [0, 1, 3, 5, 7, 8, 10, 12, 13, 15];

/// Scales the chaos generator can quantize to, in selector order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Major,
    Minor,
    Pentatonic,
    Phrygian,
}

impl Scale {
    pub const ALL: [Scale; 4] = [Scale::Major, Scale::Minor, Scale::Pentatonic, Scale::Phrygian];

    /// Selector index from the control surface; wraps rather than failing
    pub fn from_index(index: usize) -> Self {
        Self::ALL[super::wrap_index(index, Self::ALL.len())]
    }

    pub fn index(self) -> usize {
        match self {
            Scale::Major => 0,
            Scale::Minor => 1,
            Scale::Pentatonic => 2,
            Scale::Phrygian => 3,
        }
    }

    /// Semitone offsets, ascending
    pub fn degrees(self) -> &'static [i32; SCALE_LENGTH] {
        match self {
            Scale::Major => &MAJOR,
            Scale::Minor => &MINOR,
            Scale::Pentatonic => &PENTATONIC,
            Scale::Phrygian => &PHRYGIAN,
        }
    }

    /// Degree lookup with the index wrapped into the table
    pub fn degree(self, index: usize) -> i32 {
        self.degrees()[super::wrap_index(index, SCALE_LENGTH)]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "major" | "maj" => Some(Scale::Major),
            "minor" | "min" => Some(Scale::Minor),
            "pentatonic" | "pent" => Some(Scale::Pentatonic),
            "phrygian" | "phry" => Some(Scale::Phrygian),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_ascend_from_root() {
        for scale in Scale::ALL {
            let degrees = scale.degrees();
            assert_eq!(degrees[0], 0, "{:?} should start on the root", scale);
            assert!(
                degrees.windows(2).all(|pair| pair[0] < pair[1]),
                "{:?} should ascend",
                scale
            );
        }
    }

    #[test]
    fn test_selector_wraps() {
        assert_eq!(Scale::from_index(0), Scale::Major);
        assert_eq!(Scale::from_index(3), Scale::Phrygian);
        assert_eq!(Scale::from_index(5), Scale::Minor);
        for scale in Scale::ALL {
            assert_eq!(Scale::from_index(scale.index()), scale);
        }
    }

    #[test]
    fn test_degree_wraps() {
        assert_eq!(Scale::Major.degree(7), 12);
        assert_eq!(Scale::Major.degree(SCALE_LENGTH + 2), 4);
    }

    #[test]
    fn test_names() {
        assert_eq!(Scale::from_name("Pent"), Some(Scale::Pentatonic));
        assert_eq!(Scale::from_name("phrygian"), Some(Scale::Phrygian));
        assert_eq!(Scale::from_name("lydian"), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Scale::Pentatonic).unwrap();
        assert_eq!(json, "\"pentatonic\"");
        let parsed: Scale = serde_json::from_str("\"minor\"").unwrap();
        assert_eq!(parsed, Scale::Minor);
    }
}
