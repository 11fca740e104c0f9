use nalgebra::Point3;

/// A single atom record of a parsed structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the source file.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "CB", "OG1").
    pub name: String,
    /// Element symbol, upper-cased. Empty when the source file omits it.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Index of the parent residue inside its [`Structure`](super::structure::Structure).
    pub residue_index: usize,
}

impl Atom {
    pub fn new(serial: usize, name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.to_string(),
            element: element.trim().to_ascii_uppercase(),
            position,
            residue_index: 0,
        }
    }

    /// Whether the atom is a hydrogen (or deuterium).
    ///
    /// The element column wins when present; otherwise the first alphabetic character of
    /// the atom name decides, which covers names such as `1HB` or `HG21`.
    pub fn is_hydrogen(&self) -> bool {
        if !self.element.is_empty() {
            return self.element == "H" || self.element == "D";
        }
        self.name
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .is_some_and(|c| c.eq_ignore_ascii_case(&'H') || c.eq_ignore_ascii_case(&'D'))
    }
}
