use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, XorError};
use crate::graph::graph::GraphDef;

/// Leading bytes of a binary graph artifact.
pub const GRAPH_MAGIC: &[u8; 4] = b"XGPB";
/// Binary layout version written after the magic.
pub const GRAPH_VERSION: u32 = 1;

/// Writes `graph` to `dir/name` and returns the path written.
///
/// Binary output is `GRAPH_MAGIC`, the little-endian `GRAPH_VERSION`, then the
/// bincode body; text output is pretty JSON. `dir` is never created: writing
/// into a missing directory fails with the underlying I/O error.
pub fn write_graph(graph: &GraphDef, dir: impl AsRef<Path>, name: &str, as_text: bool) -> Result<PathBuf> {
    let path = dir.as_ref().join(name);
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    if as_text {
        serde_json::to_writer_pretty(&mut writer, graph)?;
    } else {
        writer.write_all(GRAPH_MAGIC)?;
        writer.write_all(&GRAPH_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, graph)?;
    }
    writer.flush()?;
    log::info!("wrote {} nodes to {}", graph.nodes.len(), path.display());
    Ok(path)
}

/// Reads a graph written by `write_graph`, in either format.
pub fn read_graph(path: impl AsRef<Path>) -> Result<GraphDef> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path.as_ref())?).read_to_end(&mut bytes)?;
    decode_graph(&bytes)
}

pub fn decode_graph(bytes: &[u8]) -> Result<GraphDef> {
    match bytes.strip_prefix(GRAPH_MAGIC.as_slice()) {
        Some(rest) => {
            if rest.len() < 4 {
                return Err(XorError::InvalidArtifact("truncated header".to_string()));
            }
            let (version, body) = rest.split_at(4);
            let version = u32::from_le_bytes([version[0], version[1], version[2], version[3]]);
            if version != GRAPH_VERSION {
                return Err(XorError::InvalidArtifact(format!("unsupported version {version}")));
            }
            bincode::deserialize(body)
                .map_err(|e| XorError::InvalidArtifact(format!("undecodable graph body: {e}")))
        }
        None => serde_json::from_slice(bytes)
            .map_err(|_| XorError::InvalidArtifact("neither a binary nor a text graph".to_string())),
    }
}
