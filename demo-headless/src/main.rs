use canopy_rt_core::solver::SpectralWindow;
use canopy_rt_core::spectral::{edges_from_centers, smear_irradiance};
use canopy_rt_core::{
    CanopyLayerProfile, LeafAngleDistribution, OutputKey, ProjectionFunction, RebinMethod,
    SchemeInputs, SchemeOutput, SchemeRegistry, SolverConfig, SpectralOptics,
    TopOfCanopyIrradiance,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Canopy radiative transfer demo on an idealized clear-sky case
#[derive(Parser, Debug)]
#[command(name = "canopy-rt-demo")]
#[command(about = "1-D canopy radiative transfer demo", long_about = None)]
struct Args {
    /// Scheme id (see --list-schemes)
    #[arg(short, long, default_value = "gd")]
    scheme: String,

    /// Total leaf area index
    #[arg(short, long, default_value_t = 4.0)]
    lai: f64,

    /// Number of levels from ground to canopy top
    #[arg(short = 'n', long, default_value_t = 21)]
    levels: usize,

    /// Solar zenith angle in degrees
    #[arg(short = 'z', long, default_value_t = 20.0)]
    sza: f64,

    /// Mean leaf inclination angle in degrees (ellipsoidal, Campbell inversion)
    #[arg(short, long, default_value_t = 57.0)]
    mla: f64,

    /// Rebin onto this many uniform bands over 0.30-2.60 μm (omit to keep the native grid)
    #[arg(short, long)]
    bands: Option<usize>,

    /// Rebinning method: `tuv`/`overlap` or `trapz_interp`/`spline`
    #[arg(short, long, default_value = "tuv")]
    rebin: RebinMethod,

    /// Number of points in the native spectrum
    #[arg(long, default_value_t = 200)]
    native_points: usize,

    /// Run band solves on a single thread
    #[arg(long)]
    sequential: bool,

    /// Compare every registered scheme on the same case
    #[arg(short, long)]
    compare: bool,

    /// List registered schemes and exit
    #[arg(long)]
    list_schemes: bool,
}

const WL_MIN: f64 = 0.30;
const WL_MAX: f64 = 2.60;

/// Clear-sky-like spectral irradiance (W m⁻² μm⁻¹) at wavelength `wl` (μm)
fn idealized_direct(wl: f64) -> f64 {
    let visible = 1450.0 * (-(wl - 0.55).powi(2) / 0.06).exp();
    let near_ir = 600.0 * (-(wl - 1.05).powi(2) / 0.25).exp();
    let water_band = 1.0 - 0.8 * (-((wl - 1.4) / 0.05).powi(2)).exp();
    (visible + near_ir) * water_band + 5.0
}

/// Diffuse share falls off with wavelength, as Rayleigh scattering does
fn idealized_diffuse(wl: f64) -> f64 {
    idealized_direct(wl) * 0.35 * (0.4 / wl).powi(2).min(1.0)
}

/// Leaf and soil optics with the red edge at 0.7 μm
fn idealized_optics(wavelengths: &[f64]) -> canopy_rt_core::Result<SpectralOptics> {
    let leaf_r = wavelengths
        .iter()
        .map(|&wl| if wl < 0.7 { 0.08 } else { 0.45 })
        .collect();
    let leaf_t = wavelengths
        .iter()
        .map(|&wl| if wl < 0.7 { 0.05 } else { 0.40 })
        .collect();
    let soil_r = wavelengths
        .iter()
        .map(|&wl| if wl <= 0.7 { 0.11 } else { 0.225 })
        .collect();
    SpectralOptics::new(leaf_r, leaf_t, soil_r, 1.0)
}

fn build_irradiance(args: &Args, psi: f64) -> canopy_rt_core::Result<TopOfCanopyIrradiance> {
    let n = args.native_points.max(2);
    let wl: Vec<f64> = (0..n)
        .map(|i| WL_MIN + (WL_MAX - WL_MIN) * i as f64 / (n - 1) as f64)
        .collect();
    let si_dr: Vec<f64> = wl.iter().map(|&w| idealized_direct(w)).collect();
    let si_df: Vec<f64> = wl.iter().map(|&w| idealized_diffuse(w)).collect();

    match args.bands {
        Some(n_bands) => {
            let n_bands = n_bands.max(1);
            let edges: Vec<f64> = (0..=n_bands)
                .map(|i| WL_MIN + (WL_MAX - WL_MIN) * i as f64 / n_bands as f64)
                .collect();
            info!("Rebinning {n} native points onto {n_bands} bands ({})", args.rebin);
            smear_irradiance(&wl, &si_dr, &si_df, &edges, psi, args.rebin)
        }
        None => {
            let edges = edges_from_centers(&wl)?;
            let width: Vec<f64> = edges.windows(2).map(|e| e[1] - e[0]).collect();
            let direct: Vec<f64> = si_dr.iter().zip(&width).map(|(v, w)| v * w).collect();
            let diffuse: Vec<f64> = si_df.iter().zip(&width).map(|(v, w)| v * w).collect();
            TopOfCanopyIrradiance::from_arrays(&wl, &width, &direct, &diffuse, psi)
        }
    }
}

fn print_profiles(output: &SchemeOutput, profile: &CanopyLayerProfile) {
    let solar = |key| output.window_sum(key, SpectralWindow::SOLAR);
    let (Some(direct), Some(down), Some(up), Some(scalar)) = (
        solar(OutputKey::Direct),
        solar(OutputKey::DiffuseDown),
        solar(OutputKey::DiffuseUp),
        solar(OutputKey::Scalar),
    ) else {
        return;
    };
    let absorbed = solar(OutputKey::Absorbed);

    println!("  LAI  |   I_dr  |  I_df_d |  I_df_u |    F    |   aI");
    println!("-------|---------|---------|---------|---------|---------");
    for i in (0..output.n_levels()).rev() {
        let a = absorbed
            .as_ref()
            .map_or_else(|| "      -".to_string(), |a| format!("{:7.2}", a[i]));
        println!(
            "{:6.2} | {:7.2} | {:7.2} | {:7.2} | {:7.2} | {}",
            profile.as_slice()[i],
            direct[i],
            down[i],
            up[i],
            scalar[i],
            a
        );
    }
}

fn print_summary(output: &SchemeOutput) {
    let Some(summary) = output.absorption_summary() else {
        println!("\n(no absorption outputs from this scheme)");
        return;
    };
    let top = output.n_levels() - 1;
    println!("\nAbsorbed at canopy top (W/m² per unit LAI):");
    println!(
        "  PAR:   {:.2} (sunlit {:.2}, shaded {:.2})",
        summary.par[top], summary.par_sunlit[top], summary.par_shaded[top]
    );
    println!("  UV:    {:.2}", summary.uv[top]);
    println!("  Solar: {:.2}", summary.solar[top]);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let registry = SchemeRegistry::with_builtin_schemes();

    if args.list_schemes {
        for id in registry.ids() {
            if let Ok(scheme) = registry.get(id) {
                println!("{id:>4}  {} ({})", scheme.long_name(), scheme.short_name());
            }
        }
        return;
    }

    if let Err(e) = run(&args, &registry) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args, registry: &SchemeRegistry) -> canopy_rt_core::Result<()> {
    println!("=== Canopy Radiative Transfer Demo ===\n");

    let psi = args.sza.to_radians();
    let distribution = LeafAngleDistribution::from_mean_leaf_angle(args.mla)?;
    let profile = CanopyLayerProfile::uniform(args.lai, args.levels)?;
    let toc = build_irradiance(args, psi)?;
    let optics = idealized_optics(&toc.wavelengths())?;

    println!("Solar zenith: {:.1}°, K_b = {:.3}", args.sza, distribution.k_b(psi));
    println!(
        "Leaf angles: mean {:.1}° -> {} (x = {:.3})",
        args.mla,
        distribution.family(),
        distribution.shape_parameter().unwrap_or(f64::NAN)
    );
    println!("Canopy: LAI {:.2} over {} levels", profile.lai_total(), profile.len());
    println!("Top of canopy: {} bands, {:.1} W/m² total\n", toc.n_bands(), toc.total());

    let config = if args.sequential {
        SolverConfig::sequential()
    } else {
        SolverConfig::default()
    };
    let inputs = SchemeInputs::new(&toc, &profile, &optics, &distribution)?.with_config(config);

    let ids: Vec<String> = if args.compare {
        registry.ids().into_iter().map(str::to_string).collect()
    } else {
        vec![args.scheme.clone()]
    };

    for id in &ids {
        let scheme = registry.get(id)?;
        println!("--- {} ({id}) ---", scheme.long_name());
        let output = registry.solve(id, &inputs)?;
        print_profiles(&output, &profile);
        print_summary(&output);

        let worst = (0..output.n_bands())
            .filter_map(|j| output.band_profile(j))
            .map(|p| p.scalar_flux_residual(psi))
            .fold(0.0, f64::max);
        if output.output(OutputKey::Absorbed).is_some() && worst > 1e-6 {
            warn!("scalar flux identity residual {worst:.3e} exceeds tolerance");
        }
        println!();
    }

    println!("=== Done ===");
    Ok(())
}
