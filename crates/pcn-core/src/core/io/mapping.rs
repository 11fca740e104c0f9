use crate::core::models::network::ContactNetwork;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes a residue-identifier → value mapping as a single-line JSON object.
///
/// Keys keep the order of `ids`, which is the node order of the network. The output is
/// also a valid Python dict literal.
pub fn write_mapping<V: Serialize>(
    writer: &mut impl Write,
    ids: &[String],
    values: &[V],
) -> io::Result<()> {
    if ids.len() != values.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} identifiers but {} values", ids.len(), values.len()),
        ));
    }
    write!(writer, "{{")?;
    for (i, (id, value)) in ids.iter().zip(values).enumerate() {
        if i > 0 {
            write!(writer, ", ")?;
        }
        write!(
            writer,
            "{}: {}",
            serde_json::to_string(id)?,
            serde_json::to_string(value)?
        )?;
    }
    writeln!(writer, "}}")
}

pub fn write_mapping_path<V: Serialize, P: AsRef<Path>>(
    path: P,
    ids: &[String],
    values: &[V],
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_mapping(&mut writer, ids, values)?;
    writer.flush()
}

/// Groups residue identifiers by label, one line per cluster: `<label>: <ids...>`.
pub fn write_cluster_dump(
    writer: &mut impl Write,
    ids: &[String],
    labels: &[usize],
) -> io::Result<()> {
    let mut clusters: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (id, &label) in ids.iter().zip(labels) {
        clusters.entry(label).or_default().push(id);
    }
    for (label, members) in clusters {
        writeln!(writer, "{}: {}", label, members.join(" "))?;
    }
    Ok(())
}

pub fn write_cluster_dump_path<P: AsRef<Path>>(
    path: P,
    ids: &[String],
    labels: &[usize],
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_cluster_dump(&mut writer, ids, labels)?;
    writer.flush()
}

/// One row of a cluster summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    /// Contacts with both endpoints in the cluster.
    pub internal_contacts: usize,
    /// Contacts with exactly one endpoint in the cluster.
    pub external_contacts: usize,
}

pub fn summarize_clusters(network: &ContactNetwork, labels: &[usize]) -> Vec<ClusterSummary> {
    let count = labels.iter().max().map_or(0, |&m| m + 1);
    let mut rows: Vec<ClusterSummary> = (0..count)
        .map(|cluster| ClusterSummary {
            cluster,
            size: 0,
            internal_contacts: 0,
            external_contacts: 0,
        })
        .collect();

    for (i, &label) in labels.iter().enumerate() {
        rows[label].size += 1;
        for &(j, _) in network.neighbors(i) {
            if j <= i {
                continue;
            }
            if labels[j] == label {
                rows[label].internal_contacts += 1;
            } else {
                rows[label].external_contacts += 1;
                rows[labels[j]].external_contacts += 1;
            }
        }
    }
    rows.retain(|r| r.size > 0);
    rows
}

pub fn write_cluster_summary_path<P: AsRef<Path>>(
    path: P,
    rows: &[ClusterSummary],
) -> io::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()
}

/// One residue of a session descriptor: its chain-qualified selection and value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEntry<V> {
    pub residue: String,
    pub selection: String,
    pub value: V,
}

/// Everything the visualization collaborator needs to reload a structure and color it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDescriptor<V> {
    pub structure: String,
    pub protein: String,
    pub algorithm: String,
    pub k: Option<usize>,
    pub representative: String,
    pub entries: Vec<SessionEntry<V>>,
}

pub fn write_session_path<V: Serialize, P: AsRef<Path>>(
    path: P,
    session: &SessionDescriptor<V>,
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, session)?;
    writeln!(writer)?;
    writer.flush()
}

/// Records `file_name → ids` in the JSON index of built matrices, keeping other entries.
pub fn update_network_index<P: AsRef<Path>>(
    index_path: P,
    file_name: &str,
    ids: &[String],
) -> io::Result<()> {
    let index_path = index_path.as_ref();
    let mut index: BTreeMap<String, Vec<String>> = match fs::read_to_string(index_path) {
        Ok(text) if !text.trim().is_empty() => serde_json::from_str(&text)?,
        Ok(_) => BTreeMap::new(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => return Err(e),
    };
    index.insert(file_name.to_string(), ids.to_vec());
    let mut writer = BufWriter::new(File::create(index_path)?);
    serde_json::to_writer_pretty(&mut writer, &index)?;
    writer.flush()
}
