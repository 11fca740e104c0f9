use super::atom::Atom;
use super::residue::Residue;
use std::collections::HashMap;

type ResidueKey = (Option<char>, isize, Option<char>);

/// An ordered collection of residues and their atoms.
///
/// Residues keep the order in which they first appear in the source file; this order is
/// the node order of every contact network built from the structure.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Primary storage for atoms, in file order.
    atoms: Vec<Atom>,
    /// Primary storage for residues, in order of first appearance.
    residues: Vec<Residue>,
    /// Lookup map from (chain, number, insertion code) to residue index.
    residue_index: HashMap<ResidueKey, usize>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn residue(&self, index: usize) -> Option<&Residue> {
        self.residues.get(index)
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Iterates over the atoms of one residue.
    pub fn residue_atoms<'a>(&'a self, residue: &'a Residue) -> impl Iterator<Item = &'a Atom> {
        residue.atoms.iter().filter_map(|&idx| self.atoms.get(idx))
    }

    /// Finds the named atom of a residue.
    pub fn residue_atom<'a>(&'a self, residue: &'a Residue, name: &str) -> Option<&'a Atom> {
        self.residue_atoms(residue).find(|atom| atom.name == name)
    }

    pub fn find_residue(
        &self,
        chain_id: Option<char>,
        number: isize,
        insertion_code: Option<char>,
    ) -> Option<usize> {
        self.residue_index
            .get(&(chain_id, number, insertion_code))
            .copied()
    }

    /// Adds a residue or returns the index of the existing one with the same key.
    pub fn add_residue(
        &mut self,
        chain_id: Option<char>,
        number: isize,
        insertion_code: Option<char>,
        name: &str,
    ) -> usize {
        let residues = &mut self.residues;
        *self
            .residue_index
            .entry((chain_id, number, insertion_code))
            .or_insert_with(|| {
                residues.push(Residue::new(number, insertion_code, name, chain_id));
                residues.len() - 1
            })
    }

    /// Adds an atom to an existing residue, returning its index.
    ///
    /// Returns `None` if `residue_index` is out of range.
    pub fn add_atom_to_residue(&mut self, residue_index: usize, mut atom: Atom) -> Option<usize> {
        let residue = self.residues.get_mut(residue_index)?;
        atom.residue_index = residue_index;
        let atom_index = self.atoms.len();
        self.atoms.push(atom);
        residue.atoms.push(atom_index);
        Some(atom_index)
    }

    /// Whether every residue carries a chain identifier.
    ///
    /// Chain-qualified selections for the visualization hand-off are impossible otherwise.
    pub fn has_chain_annotations(&self) -> bool {
        !self.residues.is_empty() && self.residues.iter().all(|r| r.chain_id.is_some())
    }

    /// Distinct chain identifiers in order of first appearance.
    pub fn chain_ids(&self) -> Vec<char> {
        let mut chains = Vec::new();
        for chain in self.residues.iter().filter_map(|r| r.chain_id) {
            if !chains.contains(&chain) {
                chains.push(chain);
            }
        }
        chains
    }
}
