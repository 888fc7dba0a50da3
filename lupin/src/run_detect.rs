use crate::common::*;
use mcmc_util::ScalarChain;
use ppblock::GibbsTrace;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::json;
use std::io::Write;

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// interaction list: `node_a node_b [count]` per line (`.gz` ok)
    #[arg(required = true)]
    edges: Box<str>,

    /// number of Gibbs sweeps
    #[arg(short = 't', long, default_value_t = 100)]
    iterations: usize,

    /// iterations discarded before estimating the partition
    #[arg(short, long, default_value_t = 0)]
    burnin: usize,

    /// initial within-community edge probability
    #[arg(long, default_value_t = 0.8)]
    p_in: f64,

    /// initial between-community edge probability
    #[arg(long, default_value_t = 0.2)]
    p_out: f64,

    /// initial concentration
    #[arg(long, default_value_t = 10.0)]
    alpha: f64,

    /// Beta prior on p_in (edges)
    #[arg(long, default_value_t = 2.0)]
    a_in: f64,

    /// Beta prior on p_in (non-edges)
    #[arg(long, default_value_t = 1.0)]
    b_in: f64,

    /// Beta prior on p_out (edges)
    #[arg(long, default_value_t = 1.0)]
    a_out: f64,

    /// Beta prior on p_out (non-edges)
    #[arg(long, default_value_t = 2.0)]
    b_out: f64,

    /// Gamma prior shape on alpha
    #[arg(long, default_value_t = 1.0)]
    gamma_a: f64,

    /// Gamma prior rate on alpha
    #[arg(long, default_value_t = 1.0)]
    gamma_b: f64,

    /// pairs with fewer recorded interactions are not edges
    #[arg(short, long, default_value_t = 1)]
    min_interactions: usize,

    /// starting labels: `node label` per line, covering every node
    #[arg(long)]
    start_labels: Option<Box<str>>,

    /// random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// output header
    #[arg(short, long, required = true)]
    out: Box<str>,

    /// show a progress bar over sweeps
    #[arg(long, default_value_t = false)]
    progress: bool,
}

impl DetectArgs {
    fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            a_in: self.a_in,
            b_in: self.b_in,
            a_out: self.a_out,
            b_out: self.b_out,
            gamma_a: self.gamma_a,
            gamma_b: self.gamma_b,
            p_in: self.p_in,
            p_out: self.p_out,
            alpha: self.alpha,
            show_progress: self.progress,
        }
    }
}

/// Run the sampler on an interaction list and write traces and the partition
pub fn run_detect(args: &DetectArgs) -> anyhow::Result<()> {
    if args.p_in >= 1.0 || args.p_out >= 1.0 {
        return Err(anyhow::anyhow!(
            "p_in and p_out must be below 1 (got {} and {})",
            args.p_in,
            args.p_out
        ));
    }

    if args.burnin > args.iterations {
        return Err(anyhow::anyhow!(
            "burn-in {} exceeds {} iterations",
            args.burnin,
            args.iterations
        ));
    }

    let detector = CommunityDetector::new(args.detector_options())?;

    let interactions = io::read_interactions(&args.edges)?;
    info!(
        "read {} records over {} nodes from {}",
        interactions.num_records,
        interactions.nodes.len(),
        args.edges
    );

    let min_count = args.min_interactions;
    let mut dropped = 0;
    let records: Vec<(NodeId, NodeId, usize)> = interactions
        .pairs
        .into_iter()
        .map(|(a, b, count)| {
            if count < min_count {
                if count > 0 {
                    dropped += 1;
                }
                (a, b, 0)
            } else {
                (a, b, count)
            }
        })
        .collect();

    if dropped > 0 {
        info!(
            "dropped {} pairs with fewer than {} interactions",
            dropped, min_count
        );
    }

    let mut graph = CommunityGraph::from_counted_interactions(interactions.nodes, records)?;

    info!(
        "graph: {} nodes, {} edges, {} interactions",
        graph.number_of_nodes(),
        graph.number_of_edges(),
        graph.number_of_interactions()
    );

    let start_labels = match args.start_labels.as_deref() {
        Some(file) => Some(start_labels_for(&graph, file)?),
        None => None,
    };

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let trace = detector.run(
        &mut graph,
        start_labels.as_deref(),
        args.iterations,
        &mut rng,
    )?;

    let estimate = trace.estimate_partition(args.burnin)?;
    info!(
        "chose iteration {} ({} communities, score {:.3})",
        estimate.index,
        estimate.num_communities(),
        estimate.score
    );

    let out = args.out.as_ref();
    io::mkdir_parent(out)?;

    let trace_file = format!("{}.trace.tsv.gz", out);
    io::write_label_trace(graph.node_ids(), &trace.labels, &trace_file)?;

    let chain_file = format!("{}.chain.tsv.gz", out);
    write_chain(&trace, &chain_file)?;

    let partition_file = format!("{}.partition.tsv", out);
    io::write_node_labels(graph.node_ids(), &estimate.labels, &partition_file)?;

    let summary = json!({
        "nodes": graph.number_of_nodes(),
        "edges": graph.number_of_edges(),
        "iterations": trace.num_iterations(),
        "burnin": args.burnin,
        "seed": args.seed,
        "priors": detector.to_string(),
        "chosen_iteration": estimate.index,
        "score": estimate.score,
        "num_communities": estimate.num_communities(),
        "p_in": chain_summary(&trace.p_in_chain(args.burnin)),
        "p_out": chain_summary(&trace.p_out_chain(args.burnin)),
        "alpha": chain_summary(&trace.alpha_chain(args.burnin)),
    });

    let summary_file = format!("{}.summary.json", out);
    std::fs::write(&summary_file, serde_json::to_string_pretty(&summary)?)?;

    info!(
        "wrote {}, {}, {}, {}",
        trace_file, chain_file, partition_file, summary_file
    );
    Ok(())
}

/// Match a `node label` table to the graph's node order
fn start_labels_for(graph: &CommunityGraph<NodeId>, file: &str) -> anyhow::Result<Vec<usize>> {
    let table = io::read_node_labels(file)?;

    let unknown: Vec<&NodeId> = table
        .keys()
        .filter(|x| graph.index_of(x).is_none())
        .collect();
    if !unknown.is_empty() {
        warn!(
            "{} labelled nodes are not in the graph, e.g. {}",
            unknown.len(),
            unknown[0]
        );
    }

    graph
        .node_ids()
        .iter()
        .map(|x| {
            table
                .get(x)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("{}: no starting label for node {}", file, x))
        })
        .collect()
}

fn write_chain(trace: &GibbsTrace, output_file: &str) -> anyhow::Result<()> {
    let mut buf = io::open_buf_writer(output_file)?;
    writeln!(
        buf,
        "iteration\tp_in\tp_out\talpha\tnum_communities\tedges_in\tedges_out"
    )?;
    for t in 0..=trace.num_iterations() {
        let stats = &trace.edge_stats[t];
        writeln!(
            buf,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            t,
            trace.p_in[t],
            trace.p_out[t],
            trace.alpha[t],
            stats.num_communities(),
            stats.edges_in,
            stats.edges_out
        )?;
    }
    buf.flush()?;
    Ok(())
}

fn chain_summary(chain: &ScalarChain) -> serde_json::Value {
    let first = |v: Vec<f64>| v.first().copied();
    json!({
        "mean": first(chain.posterior_mean()),
        "sd": first(chain.posterior_variance()).map(f64::sqrt),
        "q025": first(chain.quantile(0.025)),
        "q975": first(chain.quantile(0.975)),
        "ess": first(chain.effective_sample_size()),
    })
}
