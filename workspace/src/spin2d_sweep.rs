use std::{
    fs,
    io::BufWriter,
    path::PathBuf,
};
use anyhow::Context;
use clap::Parser;
use ndarray as nd;
use num_complex::Complex64 as C64;
use rayon::prelude::*;
use tracing::{ info, warn };
use tracing_subscriber::EnvFilter;
use dnls::{
    ground::{ GroundState, Relaxation },
    output::{ state_file_name, write_state },
    rhs::{ SpinLattice, SpinLatticeParams },
    timedep::Rka,
    utils,
    DEF_EPSILON,
    DEF_MAXSTEPS,
};

/// Relax the two-component square lattice to its ground state for a sweep of
/// Zeeman fields, writing one state file per field value.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Side length of the lattice.
    #[arg(short = 'l', long, default_value_t = 60)]
    side: usize,

    /// Particles per site.
    #[arg(short, long, default_value_t = 1.0)]
    density: f64,

    /// Initial chemical potential.
    #[arg(long, default_value_t = 1.0)]
    mu: f64,

    /// Hopping along x.
    #[arg(short, long, default_value_t = 1.0)]
    j: f64,

    /// Hopping along y.
    #[arg(long, default_value_t = 0.1)]
    tz: f64,

    /// On-site interaction strength.
    #[arg(short, long, default_value_t = 0.0)]
    u: f64,

    /// Spin-orbit coupling strength.
    #[arg(long, default_value_t = 0.1)]
    tso: f64,

    /// Zeeman field values to sweep over.
    #[arg(
        long,
        num_args = 1..,
        allow_negative_numbers = true,
        default_values_t = [-0.5, -0.3],
    )]
    mz: Vec<f64>,

    /// Initial integrator step size.
    #[arg(long, default_value_t = 1e-4)]
    dt: f64,

    /// Integrator error bound.
    #[arg(short, long, default_value_t = DEF_EPSILON)]
    epsilon: f64,

    /// Cap on accumulated integrator trial steps per sweep point.
    #[arg(long, default_value_t = DEF_MAXSTEPS)]
    maxsteps: usize,

    /// Directory to write state files to.
    #[arg(short, long, default_value = "output")]
    outdir: PathBuf,

    /// Number of worker threads (0 uses all available cores).
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

#[derive(Clone, Debug)]
struct Point {
    mz: f64,
    mu: f64,
    outcome: Relaxation,
    norms: Vec<f64>,
    peak: Vec<(usize, usize)>,
    path: PathBuf,
}

fn relax_point(args: &Args, mz: f64) -> anyhow::Result<Point> {
    let l = args.side;
    let params = SpinLatticeParams {
        mu: args.mu,
        j: args.j,
        tz: args.tz,
        u: args.u,
        tso: args.tso,
        mz,
    };
    let q0: nd::Array1<C64> = nd::Array1::from_elem(2 * l * l, C64::from(1.0));
    let lattice = SpinLattice::new(l, params);
    let rka = Rka::new(args.dt, args.epsilon, &q0, lattice)?;
    let target = args.density * (l * l) as f64;
    let mut gs = GroundState::new(rka, target)?.with_maxsteps(args.maxsteps)?;

    let outcome = gs.relax();
    if !outcome.is_converged() {
        warn!(mz, diff = outcome.diff(), "writing non-converged state");
    }

    let rho = utils::momentum_density_2d(gs.state(), l, 2);
    let peak: Vec<(usize, usize)>
        = rho.outer_iter()
        .map(|comp| {
            comp.indexed_iter()
                .fold(((0, 0), f64::NEG_INFINITY), |(best, max), ((ky, kx), r)| {
                    if *r > max { ((kx, ky), *r) } else { (best, max) }
                })
                .0
        })
        .collect();

    let path = args.outdir.join(state_file_name(args.density, &params));
    let file = fs::File::create(&path)
        .with_context(|| format!("couldn't create {}", path.display()))?;
    write_state(BufWriter::new(file), gs.mu(), gs.state())
        .with_context(|| format!("couldn't write {}", path.display()))?;

    Ok(Point {
        mz,
        mu: gs.mu(),
        outcome,
        norms: gs.component_norms(),
        peak,
        path,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.side > 0, "lattice side length must be positive");
    anyhow::ensure!(
        args.density > 0.0 && args.density.is_finite(),
        "density must be positive and finite; got {}", args.density,
    );
    fs::create_dir_all(&args.outdir)
        .with_context(|| format!("couldn't create {}", args.outdir.display()))?;
    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()?;
    }

    info!(
        side = args.side,
        density = args.density,
        points = args.mz.len(),
        "starting sweep",
    );
    let points: Vec<Point>
        = args.mz.par_iter()
        .map(|&mz| relax_point(&args, mz))
        .collect::<anyhow::Result<_>>()?;

    for point in points.iter() {
        info!(
            mz = point.mz,
            mu = point.mu,
            converged = point.outcome.is_converged(),
            iters = point.outcome.iters(),
            substeps = point.outcome.substeps(),
            diff = point.outcome.diff(),
            n_up = point.norms[0],
            n_dn = point.norms[1],
            k_up = ?point.peak[0],
            k_dn = ?point.peak[1],
            "relaxed",
        );
        println!("{}", point.path.display());
    }
    Ok(())
}
