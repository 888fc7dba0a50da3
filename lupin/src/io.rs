use crate::common::NodeId;
use flate2::read::GzDecoder;
use fnv::{FnvHashMap, FnvHashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

///
/// Open a file for reading, and return a buffered reader
/// * `input_file` - file name--either gzipped or not
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let ext = Path::new(input_file).extension().and_then(|x| x.to_str());
    let file = File::open(input_file)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {}", input_file, e))?;
    match ext {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

///
/// Open a file for writing, and return a buffered writer
/// * `output_file` - file name--either gzipped or not; `stdout` also works
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn Write>> {
    if output_file.eq_ignore_ascii_case("stdout") {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    }

    let ext = Path::new(output_file).extension().and_then(|x| x.to_str());
    let file = File::create(output_file)
        .map_err(|e| anyhow::anyhow!("failed to create {}: {}", output_file, e))?;
    match ext {
        Some("gz") => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

///
/// Create the parent directory of `file` if needed
///
pub fn mkdir_parent(file: &str) -> anyhow::Result<()> {
    if let Some(dir) = Path::new(file).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('%')
}

fn split_words(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect()
}

/// Interaction records with their multiplicity summed per unordered pair.
pub struct Interactions {
    /// Every node named in the file, in first-seen order
    pub nodes: Vec<NodeId>,
    /// `(a, b, count)` with `a <= b`, sorted
    pub pairs: Vec<(NodeId, NodeId, usize)>,
    /// Number of data lines read
    pub num_records: usize,
}

///
/// Read `node_a node_b [count]` lines
///
/// * `input_file` - whitespace, tab or comma separated; `#`/`%` lines skipped
///
pub fn read_interactions(input_file: &str) -> anyhow::Result<Interactions> {
    let buf = open_buf_reader(input_file)?;

    let mut nodes = vec![];
    let mut seen: FnvHashSet<NodeId> = FnvHashSet::default();
    let mut counts: FnvHashMap<(NodeId, NodeId), usize> = FnvHashMap::default();
    let mut num_records = 0;

    for (line_no, line) in buf.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }

        let words = split_words(line);
        if words.len() < 2 || words.len() > 3 {
            return Err(anyhow::anyhow!(
                "{}:{}: expected `node_a node_b [count]`, found {} fields",
                input_file,
                line_no + 1,
                words.len()
            ));
        }

        let count = match words.get(2) {
            Some(w) => w.parse::<usize>().map_err(|e| {
                anyhow::anyhow!("{}:{}: bad count '{}': {}", input_file, line_no + 1, w, e)
            })?,
            None => 1,
        };

        let a: NodeId = words[0].into();
        let b: NodeId = words[1].into();
        for x in [&a, &b] {
            if seen.insert(x.clone()) {
                nodes.push(x.clone());
            }
        }

        let key = if a <= b { (a, b) } else { (b, a) };
        *counts.entry(key).or_default() += count;
        num_records += 1;
    }

    let mut pairs: Vec<(NodeId, NodeId, usize)> =
        counts.into_iter().map(|((a, b), c)| (a, b, c)).collect();
    pairs.sort();

    Ok(Interactions {
        nodes,
        pairs,
        num_records,
    })
}

///
/// Read `node label` lines into a lookup table
///
pub fn read_node_labels(input_file: &str) -> anyhow::Result<FnvHashMap<NodeId, usize>> {
    let buf = open_buf_reader(input_file)?;
    let mut out = FnvHashMap::default();

    for (line_no, line) in buf.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        let words = split_words(line);
        if words.len() != 2 {
            return Err(anyhow::anyhow!(
                "{}:{}: expected `node label`",
                input_file,
                line_no + 1
            ));
        }
        let label = words[1].parse::<usize>().map_err(|e| {
            anyhow::anyhow!("{}:{}: bad label '{}': {}", input_file, line_no + 1, words[1], e)
        })?;
        if out.insert(NodeId::from(words[0]), label).is_some() {
            return Err(anyhow::anyhow!(
                "{}: node {} labelled twice",
                input_file,
                words[0]
            ));
        }
    }
    Ok(out)
}

///
/// Write `node<TAB>label` lines
///
pub fn write_node_labels(
    nodes: &[NodeId],
    labels: &[usize],
    output_file: &str,
) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(output_file)?;
    for (node, label) in nodes.iter().zip(labels) {
        writeln!(buf, "{}\t{}", node, label)?;
    }
    buf.flush()?;
    Ok(())
}

/// Label trace as stored on disk: node names, then one row per iteration.
pub struct LabelTraceFile {
    /// Column names
    pub nodes: Vec<NodeId>,
    /// Iteration x node labels
    pub labels: Vec<Vec<usize>>,
}

///
/// Write a label trace as tab-separated rows under a node-name header
///
pub fn write_label_trace(
    nodes: &[NodeId],
    labels: &[Vec<usize>],
    output_file: &str,
) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(output_file)?;

    let header: Vec<&str> = nodes.iter().map(|x| x.as_ref()).collect();
    writeln!(buf, "{}", header.join("\t"))?;

    for row in labels {
        let row: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        writeln!(buf, "{}", row.join("\t"))?;
    }
    buf.flush()?;
    Ok(())
}

///
/// Read a label trace written by [`write_label_trace`]
///
pub fn read_label_trace(input_file: &str) -> anyhow::Result<LabelTraceFile> {
    let buf = open_buf_reader(input_file)?;
    let mut lines = buf.lines();

    let header = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("{}: empty trace file", input_file))??;
    let nodes: Vec<NodeId> = header.split('\t').map(NodeId::from).collect();

    let mut labels = vec![];
    for (line_no, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split('\t')
            .map(|w| w.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("{}:{}: {}", input_file, line_no + 2, e))?;
        if row.len() != nodes.len() {
            return Err(anyhow::anyhow!(
                "{}:{}: {} labels for {} nodes",
                input_file,
                line_no + 2,
                row.len(),
                nodes.len()
            ));
        }
        labels.push(row);
    }

    Ok(LabelTraceFile { nodes, labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_text(path: &str, text: &str) {
        let mut buf = open_buf_writer(path).unwrap();
        buf.write_all(text.as_bytes()).unwrap();
        buf.flush().unwrap();
    }

    #[test]
    fn test_read_interactions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edges.txt.gz");
        let path = path.to_str().unwrap();

        write_text(
            path,
            "# header\n\
             a b\n\
             b,a,3\n\
             % note\n\
             c\td 0\n\
             \n\
             a c 2\n",
        );

        let x = read_interactions(path).unwrap();
        assert_eq!(x.num_records, 4);
        let nodes: Vec<&str> = x.nodes.iter().map(|n| n.as_ref()).collect();
        assert_eq!(nodes, vec!["a", "b", "c", "d"]);

        let pairs: Vec<(&str, &str, usize)> = x
            .pairs
            .iter()
            .map(|(a, b, c)| (a.as_ref(), b.as_ref(), *c))
            .collect();
        assert_eq!(pairs, vec![("a", "b", 4), ("a", "c", 2), ("c", "d", 0)]);
    }

    #[test]
    fn test_bad_interaction_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edges.txt");
        let path = path.to_str().unwrap();

        write_text(path, "a b 1 extra\n");
        assert!(read_interactions(path).is_err());

        write_text(path, "a b many\n");
        assert!(read_interactions(path).is_err());
    }

    #[test]
    fn test_label_trace_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.trace.tsv.gz");
        let path = path.to_str().unwrap();

        let nodes: Vec<NodeId> = vec!["n1".into(), "n2".into(), "n3".into()];
        let labels = vec![vec![0, 1, 2], vec![0, 0, 2]];
        write_label_trace(&nodes, &labels, path).unwrap();

        let back = read_label_trace(path).unwrap();
        assert_eq!(back.nodes, nodes);
        assert_eq!(back.labels, labels);
    }

    #[test]
    fn test_node_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("start.tsv");
        let path = path.to_str().unwrap();

        let nodes: Vec<NodeId> = vec!["x".into(), "y".into()];
        write_node_labels(&nodes, &[4, 7], path).unwrap();
        let table = read_node_labels(path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["x"], 4);
        assert_eq!(table["y"], 7);

        write_text(path, "x 1\nx 2\n");
        assert!(read_node_labels(path).is_err());
    }
}
