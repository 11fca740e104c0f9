use phf::phf_map;
use std::fmt;

static ONE_LETTER_CODES: phf::Map<&'static str, char> = phf_map! {
    // --- Aliphatic, Nonpolar ---
    "ALA" => 'A',
    "GLY" => 'G',
    "ILE" => 'I',
    "LEU" => 'L',
    "PRO" => 'P',
    "VAL" => 'V',
    // --- Aromatic ---
    "PHE" => 'F',
    "TRP" => 'W',
    "TYR" => 'Y',
    // --- Polar, Uncharged ---
    "ASN" => 'N',
    "CYS" => 'C',
    "GLN" => 'Q',
    "SER" => 'S',
    "THR" => 'T',
    "MET" => 'M',
    // --- Charged ---
    "ARG" => 'R',
    "LYS" => 'K',
    "ASP" => 'D',
    "GLU" => 'E',
    "HIS" => 'H',
    // --- Common variants ---
    "HSE" => 'H',
    "HSD" => 'H',
    "HSP" => 'H',
    "HID" => 'H',
    "HIE" => 'H',
    "HIP" => 'H',
    "CYX" => 'C',
    "MSE" => 'M',
    "SEC" => 'U',
    "PYL" => 'O',
};

/// A residue of a parsed structure.
///
/// Identity is the triple (chain, sequence number, insertion code); the residue name is
/// carried along for labelling. Residues are immutable once the parser has finished with
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,                  // Residue sequence number from source file
    pub insertion_code: Option<char>,   // PDB insertion code, if any
    pub name: String,                   // Three-letter residue name (e.g., "ALA")
    pub chain_id: Option<char>,         // Chain identifier, `None` when the column is blank
    pub(crate) atoms: Vec<usize>,       // Indices of atoms belonging to this residue
}

impl Residue {
    pub(crate) fn new(
        number: isize,
        insertion_code: Option<char>,
        name: &str,
        chain_id: Option<char>,
    ) -> Self {
        Self {
            number,
            insertion_code,
            name: name.trim().to_ascii_uppercase(),
            chain_id,
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[usize] {
        &self.atoms
    }

    /// One-letter amino-acid code, `None` for non-standard residue names.
    pub fn one_letter_code(&self) -> Option<char> {
        ONE_LETTER_CODES.get(self.name.as_str()).copied()
    }

    pub fn is_glycine(&self) -> bool {
        self.name == "GLY"
    }

    /// The identifier used in every per-residue output mapping, e.g. `ALA12A`.
    pub fn identifier(&self) -> String {
        self.to_string()
    }

    /// Chain-qualified selection (`A/12/`) handed to the visualization collaborator.
    ///
    /// `fallback_chain` substitutes a blank chain; without one, a chain-less residue has
    /// no valid selection.
    pub fn selection(&self, fallback_chain: Option<char>) -> Option<String> {
        let chain = self.chain_id.or(fallback_chain)?;
        let icode = self.insertion_code.map(String::from).unwrap_or_default();
        Some(format!("{}/{}{}/", chain, self.number, icode))
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.number)?;
        if let Some(icode) = self.insertion_code {
            write!(f, "{}", icode)?;
        }
        if let Some(chain) = self.chain_id {
            write!(f, "{}", chain)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let residue = Residue::new(10, None, "gly", Some('A'));
        assert_eq!(residue.number, 10);
        assert_eq!(residue.name, "GLY");
        assert_eq!(residue.chain_id, Some('A'));
        assert!(residue.atoms().is_empty());
        assert!(residue.is_glycine());
    }

    #[test]
    fn identifier_includes_chain_and_insertion_code() {
        assert_eq!(Residue::new(12, None, "ALA", Some('A')).identifier(), "ALA12A");
        assert_eq!(Residue::new(52, Some('B'), "SER", Some('H')).identifier(), "SER52BH");
        assert_eq!(Residue::new(3, None, "LYS", None).identifier(), "LYS3");
    }

    #[test]
    fn one_letter_code_maps_standard_and_variant_names() {
        assert_eq!(Residue::new(1, None, "TRP", None).one_letter_code(), Some('W'));
        assert_eq!(Residue::new(1, None, "HSE", None).one_letter_code(), Some('H'));
        assert_eq!(Residue::new(1, None, "HOH", None).one_letter_code(), None);
    }

    #[test]
    fn selection_requires_a_chain() {
        let chained = Residue::new(7, None, "VAL", Some('B'));
        let chainless = Residue::new(7, None, "VAL", None);
        assert_eq!(chained.selection(None).as_deref(), Some("B/7/"));
        assert_eq!(chainless.selection(None), None);
        assert_eq!(chainless.selection(Some('A')).as_deref(), Some("A/7/"));
    }
}
