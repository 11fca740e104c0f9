use super::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

/// Coordinates end at column 54; anything shorter cannot be an atom record.
const MIN_ATOM_RECORD_LEN: usize = 54;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: &'static str, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: &'static str, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: &'static str },
    #[error("Line is too short for an ATOM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> Option<char> {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

/// Reader for the fixed-column PDB format.
///
/// Only `ATOM` records of the first model are read. `HETATM` records (ligands, waters)
/// never become network nodes, and alternate locations other than blank or `A` are
/// dropped so every atom appears once.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut structure = Structure::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ENDMDL" => break,
                "ATOM" => {}
                _ => continue,
            }

            if line.len() < MIN_ATOM_RECORD_LEN {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            if let Some(alt_loc) = column_char(&line, 16) {
                if alt_loc != 'A' {
                    continue;
                }
            }

            let name = slice_and_trim(&line, 12, 16);
            if name.is_empty() {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::MissingRequiredField { columns: "13-16" },
                });
            }
            let res_name = slice_and_trim(&line, 17, 20);
            if res_name.is_empty() {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::MissingRequiredField { columns: "18-20" },
                });
            }

            let res_num_str = slice_and_trim(&line, 22, 26);
            let res_num: isize = res_num_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26",
                    value: res_num_str.to_string(),
                },
            })?;

            let parse_coord = |start: usize, end: usize, columns: &'static str| {
                let value = slice_and_trim(&line, start, end);
                value.parse::<f64>().map_err(|_| PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::InvalidFloat {
                        columns,
                        value: value.to_string(),
                    },
                })
            };
            let x = parse_coord(30, 38, "31-38")?;
            let y = parse_coord(38, 46, "39-46")?;
            let z = parse_coord(46, 54, "47-54")?;

            // Hybrid-36 and overflowed serials are not needed for network construction.
            let serial = slice_and_trim(&line, 6, 11)
                .parse::<usize>()
                .unwrap_or(structure.atoms().len() + 1);
            let element = slice_and_trim(&line, 76, 78);

            let chain_id = column_char(&line, 21);
            let insertion_code = column_char(&line, 26);

            let residue_index = structure.add_residue(chain_id, res_num, insertion_code, res_name);
            let atom = Atom::new(serial, name, element, Point3::new(x, y, z));
            structure.add_atom_to_residue(residue_index, atom);
        }

        Ok(structure)
    }
}
