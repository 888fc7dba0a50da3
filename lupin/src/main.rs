mod common;
mod io;
mod run_detect;
mod run_estimate;

use crate::common::*;
use run_detect::*;
use run_estimate::*;

/// LUPIN
#[derive(Parser, Debug)]
#[command(
    version,
    about = "LUPIN",
    long_about = "Latent commUnity Partitions In interaction Networks\n\n\
                  Bayesian community detection on an undirected interaction graph.\n\
                  A planted-partition block model (within-community edge probability\n\
                  p_in, between-community p_out <= p_in) is fit by Gibbs sampling, and\n\
                  a representative partition is chosen from the label trace by least\n\
                  squares on pairwise co-clustering frequencies.",
    term_width = 80
)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Gibbs sampling of community labels",
        long_about = "Fit the planted-partition model to an interaction list.\n\n\
                      Pipeline stages:\n\
                      1. Read `node_a node_b [count]` records; sum counts per pair\n\
                      2. Drop pairs below --min-interactions (their nodes stay)\n\
                      3. Start from one community per node, or --start-labels\n\
                      4. Per sweep: update p_in, p_out; resample each label; update alpha\n\
                      5. Pick the least-squares partition after --burnin\n\n\
                      Outputs:\n\
                      - {out}.trace.tsv.gz: node header + labels per iteration\n\
                      - {out}.chain.tsv.gz: p_in, p_out, alpha, counts per iteration\n\
                      - {out}.partition.tsv: node and label of the chosen partition\n\
                      - {out}.summary.json: chosen iteration + posterior summaries"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Partition estimate from a stored trace",
        long_about = "Re-run the least-squares partition estimate on a label trace\n\
                      written by `detect`, e.g. with a different burn-in.\n\n\
                      Outputs:\n\
                      - {out}.partition.tsv: node and label of the chosen partition\n\
                      - {out}.coclustering.tsv.gz: pairwise frequencies (--coclustering)\n\
                      - {out}.estimate.json: chosen iteration and score"
    )]
    Estimate(EstimateArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.commands {
        Commands::Detect(args) => {
            run_detect(args)?;
        }
        Commands::Estimate(args) => {
            run_estimate(args)?;
        }
    }

    Ok(())
}
