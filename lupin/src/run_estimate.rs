use crate::common::*;
use ppblock::estimate_partition;
use serde_json::json;
use std::io::Write;

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// label trace written by `detect` (`{out}.trace.tsv.gz`)
    #[arg(required = true)]
    trace: Box<str>,

    /// iterations discarded before estimating the partition
    #[arg(short, long, default_value_t = 0)]
    burnin: usize,

    /// also write the co-clustering matrix
    #[arg(long, default_value_t = false)]
    coclustering: bool,

    /// output header
    #[arg(short, long, required = true)]
    out: Box<str>,
}

/// Pick a representative partition from a stored label trace
pub fn run_estimate(args: &EstimateArgs) -> anyhow::Result<()> {
    let trace = io::read_label_trace(&args.trace)?;
    info!(
        "read {} iterations over {} nodes from {}",
        trace.labels.len(),
        trace.nodes.len(),
        args.trace
    );

    let estimate = estimate_partition(&trace.labels, args.burnin)?;
    info!(
        "chose iteration {} ({} communities, score {:.3})",
        estimate.index,
        estimate.num_communities(),
        estimate.score
    );

    let out = args.out.as_ref();
    io::mkdir_parent(out)?;

    let partition_file = format!("{}.partition.tsv", out);
    io::write_node_labels(&trace.nodes, &estimate.labels, &partition_file)?;

    if args.coclustering {
        let cocluster_file = format!("{}.coclustering.tsv.gz", out);
        let mut buf = io::open_buf_writer(&cocluster_file)?;
        let header: Vec<&str> = trace.nodes.iter().map(|x| x.as_ref()).collect();
        writeln!(buf, "\t{}", header.join("\t"))?;
        for (i, row) in estimate.coclustering.row_iter().enumerate() {
            let row: Vec<String> = row.iter().map(|p| format!("{:.4}", p)).collect();
            writeln!(buf, "{}\t{}", trace.nodes[i], row.join("\t"))?;
        }
        buf.flush()?;
    }

    let summary = json!({
        "nodes": trace.nodes.len(),
        "samples": trace.labels.len(),
        "burnin": args.burnin,
        "chosen_iteration": estimate.index,
        "score": estimate.score,
        "num_communities": estimate.num_communities(),
    });
    let summary_file = format!("{}.estimate.json", out);
    std::fs::write(&summary_file, serde_json::to_string_pretty(&summary)?)?;

    Ok(())
}
