use std::{ fs, io::BufWriter, path::PathBuf };
use anyhow::Context;
use clap::Parser;
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::info;
use tracing_subscriber::EnvFilter;
use dnls::{
    ground::GroundState,
    output::write_state,
    rhs::{ Chain, ChainParams, Evaluator, SpinChain, SpinChainParams },
    timedep::Rka,
    utils,
    DEF_EPSILON,
    DEF_MAXSTEPS,
};

/// Relax a one-dimensional ring to its ground state, then optionally evolve it
/// in real time and report how well the particle number is held.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of sites.
    #[arg(short, long, default_value_t = 64)]
    sites: usize,

    /// Use the two-component ring with spin-orbit coupling.
    #[arg(long)]
    spin: bool,

    /// Particles per site.
    #[arg(short, long, default_value_t = 1.0)]
    density: f64,

    /// Initial chemical potential.
    #[arg(long, default_value_t = 1.0)]
    mu: f64,

    /// Hopping amplitude.
    #[arg(short, long, default_value_t = 1.0)]
    j: f64,

    /// On-site interaction strength.
    #[arg(short, long, default_value_t = 0.0)]
    u: f64,

    /// Spin-orbit coupling strength (two-component ring only).
    #[arg(long, default_value_t = 0.0)]
    tso: f64,

    /// Zeeman splitting (two-component ring only).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    mz: f64,

    /// Initial integrator step size.
    #[arg(long, default_value_t = 1e-4)]
    dt: f64,

    /// Integrator error bound.
    #[arg(short, long, default_value_t = DEF_EPSILON)]
    epsilon: f64,

    /// Cap on accumulated integrator trial steps.
    #[arg(long, default_value_t = DEF_MAXSTEPS)]
    maxsteps: usize,

    /// Duration of real-time evolution after relaxation.
    #[arg(short, long, default_value_t = 0.0)]
    time: f64,

    /// Number of reports printed during real-time evolution.
    #[arg(long, default_value_t = 10)]
    reports: usize,

    /// Write the relaxed state to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// slightly bumpy start so that relaxation has something to do
fn initial_state(len: usize) -> nd::Array1<C64> {
    (0..len)
        .map(|k| {
            let x = k as f64;
            C64::new(1.0 + 0.1 * (0.7 * x).sin(), 0.05 * (1.3 * x).cos())
        })
        .collect()
}

fn run<E>(args: &Args, sites: usize, eval: E) -> anyhow::Result<()>
where E: Evaluator
{
    let ncomp = eval.components();
    let q0 = initial_state(eval.len());
    let rka = Rka::new(args.dt, args.epsilon, &q0, eval)?;
    let target = args.density * sites as f64;
    let mut gs = GroundState::new(rka, target)?.with_maxsteps(args.maxsteps)?;

    let outcome = gs.relax();
    let rho = utils::momentum_density_1d(gs.state(), ncomp);
    info!(
        mu = gs.mu(),
        converged = outcome.is_converged(),
        iters = outcome.iters(),
        substeps = outcome.substeps(),
        diff = outcome.diff(),
        norms = ?gs.component_norms(),
        peak_k = ?utils::peak_momenta(&rho),
        "relaxed",
    );

    if let Some(path) = &args.output {
        let file = fs::File::create(path)
            .with_context(|| format!("couldn't create {}", path.display()))?;
        write_state(BufWriter::new(file), gs.mu(), gs.state())
            .with_context(|| format!("couldn't write {}", path.display()))?;
        println!("{}", path.display());
    }

    if args.time > 0.0 && args.reports > 0 {
        let mut rka = gs.into_inner();
        let chunk = args.time / args.reports as f64;
        println!("{:>12} {:>12} | component norms", "t", "|1 - N/N0|");
        for _ in 0..args.reports {
            rka.advance(chunk, C64::from(1.0))?;
            let drift = (1.0 - rka.norm() / target).abs();
            let norms = utils::component_norms(rka.state(), ncomp);
            println!("{:12.6} {:12.3e} | {:?}", rka.time(), drift, norms);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.sites > 0, "number of sites must be positive");
    anyhow::ensure!(
        args.density > 0.0 && args.density.is_finite(),
        "density must be positive and finite; got {}", args.density,
    );
    anyhow::ensure!(
        args.time >= 0.0 && args.time.is_finite(),
        "evolution time must be finite and non-negative; got {}", args.time,
    );

    if args.spin {
        let params = SpinChainParams {
            mu: args.mu,
            j: args.j,
            u: args.u,
            tso: args.tso,
            mz: args.mz,
        };
        run(&args, args.sites, SpinChain::new(args.sites, params))
    } else {
        let params = ChainParams { mu: args.mu, j: args.j, u: args.u };
        run(&args, args.sites, Chain::new(args.sites, params))
    }
}
